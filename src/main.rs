use kurosabi_router::{
    DefaultContext, Method, Resolution, RouteCache, RouteDescription, RouteResolver, RouteTrie,
    RouterConfig,
};
use log::{error, info, warn};

fn main() {
    env_logger::builder().filter_level(log::LevelFilter::Info).init();

    let mut cache: RouteCache<DefaultContext> = RouteCache::new();

    cache
        .module("home")
        .get("/")
        .get("/hello")
        .get("/hello/{name?world}");

    cache
        .module("users")
        .get("/users")
        .post("/users")
        .get("/users/{id:int}")
        .get("/users/admin")
        .route(
            RouteDescription::new(Method::DELETE, "/users/{id:int}")
                .named("delete-user")
                .when(|ctx: &DefaultContext| ctx.header("X-Admin") == Some("1")),
        );

    cache
        .module("files")
        .get("/files/{path*}")
        .get("/img/{name}.{ext:alpha}")
        .get(r"/archive/(?<year>\d{4})/(?<month>\d{2})");

    let trie = match RouteTrie::build(&cache, RouterConfig::default()) {
        Ok(trie) => trie,
        Err(e) => {
            error!("failed to build routes: {}", e);
            std::process::exit(1);
        }
    };

    let admin = DefaultContext::new().with_header("X-Admin", "1");
    let anonymous = DefaultContext::new();

    let requests = [
        ("GET", "/", &anonymous),
        ("GET", "/hello", &anonymous),
        ("GET", "/hello/kurosabi", &anonymous),
        ("HEAD", "/users/42", &anonymous),
        ("GET", "/Users/Admin", &anonymous),
        ("GET", "/users/abc", &anonymous),
        ("DELETE", "/users/42", &anonymous),
        ("DELETE", "/users/42", &admin),
        ("OPTIONS", "/users", &anonymous),
        ("GET", "/files/a/b/c.txt?download=1", &anonymous),
        ("GET", "/img/logo.png", &anonymous),
        ("GET", "/archive/2024/05", &anonymous),
        ("PATCH", "/users", &anonymous),
        ("GET", "/nowhere", &anonymous),
    ];

    for (method, path, ctx) in requests {
        let method = Method::parse(method);
        match trie.resolve(&method, path, ctx) {
            Ok(Resolution::Matched(m)) => {
                let json = serde_json::to_string(&m).unwrap_or_default();
                info!("{} {} - \x1b[32mmatched\x1b[0m {}", method, path, json);
            }
            Ok(Resolution::Options { allow }) => {
                info!("{} {} - \x1b[34mallow\x1b[0m {:?}", method, path, allow);
            }
            Err(e) => {
                warn!("{} {} - \x1b[33m{}\x1b[0m {}", method, path, e.status_code(), e);
            }
        }
    }
}
