// 解決・OPTIONS・差し替えの確認

use kurosabi_router::{
    DefaultContext, HttpError, Method, ParamValue, Resolution, RouteCache, RouteDescription,
    RouteResolver, RouteTrie, RouterConfig, SharedRouteTrie,
};
use pretty_assertions::assert_eq;

fn init_logger() {
    env_logger::try_init_from_env(env_logger::Env::default().default_filter_or("debug"))
        .unwrap_or_else(|_| ());
}

fn widgets() -> RouteCache<DefaultContext> {
    let mut cache = RouteCache::new();
    cache
        .module("widgets")
        .get("/widgets")
        .post("/widgets")
        .get("/widgets/{id:int}")
        .route(
            RouteDescription::new(Method::DELETE, "/widgets/{id:int}")
                .when(|ctx: &DefaultContext| ctx.header("X-Admin").is_some()),
        );
    cache
}

#[test]
fn options_lists_matching_methods() {
    init_logger();
    let trie = RouteTrie::build(&widgets(), RouterConfig::default()).unwrap();
    let ctx = DefaultContext::new();

    assert_eq!(trie.get_options("/widgets", &ctx), vec![Method::GET, Method::POST]);
    assert_eq!(trie.get_options("/widgets/7", &ctx), vec![Method::GET]);

    let admin = DefaultContext::new().with_header("X-Admin", "yes");
    assert_eq!(
        trie.get_options("/widgets/7", &admin),
        vec![Method::DELETE, Method::GET]
    );
    assert!(trie.get_options("/gadgets", &ctx).is_empty());
    assert!(trie.get_options("", &ctx).is_empty());
}

#[test]
fn resolve_picks_the_best_candidate() {
    init_logger();
    let mut cache = widgets();
    cache.module("featured").get("/widgets/featured");
    let trie = RouteTrie::build(&cache, RouterConfig::default()).unwrap();
    let ctx = DefaultContext::new();

    match trie.resolve(&Method::GET, "/widgets/featured", &ctx) {
        Ok(Resolution::Matched(m)) => {
            assert_eq!(m.module_key(), "featured");
            assert!(m.parameters.is_empty());
        }
        other => panic!("unexpected resolution: {:?}", other),
    }

    match trie.resolve(&Method::GET, "/widgets/12", &ctx) {
        Ok(Resolution::Matched(m)) => assert_eq!(m.param("id"), Some(&ParamValue::Int(12))),
        other => panic!("unexpected resolution: {:?}", other),
    }
}

#[test]
fn resolve_reports_not_found_and_method_not_allowed() {
    init_logger();
    let trie = RouteTrie::build(&widgets(), RouterConfig::default()).unwrap();
    let ctx = DefaultContext::new();

    let err = trie.resolve(&Method::GET, "/gadgets", &ctx).unwrap_err();
    assert_eq!(err, HttpError::NotFound);
    assert_eq!(err.status_code(), 404);
    assert_eq!(err.allow_header(), None);

    let err = trie.resolve(&Method::PATCH, "/widgets", &ctx).unwrap_err();
    assert_eq!(
        err,
        HttpError::MethodNotAllowed {
            allow: vec![Method::GET, Method::POST]
        }
    );
    assert_eq!(err.status_code(), 405);
    assert_eq!(err.allow_header().as_deref(), Some("GET, POST"));

    // condition false: the DELETE route does not count
    let err = trie.resolve(&Method::DELETE, "/widgets/3", &ctx).unwrap_err();
    assert_eq!(err, HttpError::MethodNotAllowed { allow: vec![Method::GET] });
}

#[test]
fn head_fallback_is_not_advertised() {
    init_logger();
    let trie = RouteTrie::build(&widgets(), RouterConfig::default()).unwrap();
    let ctx = DefaultContext::new();

    // HEAD は GET のツリーで解決されるが、一覧には載らない
    match trie.resolve(&Method::HEAD, "/widgets", &ctx) {
        Ok(Resolution::Matched(m)) => assert_eq!(m.method(), &Method::GET),
        other => panic!("unexpected resolution: {:?}", other),
    }
    assert_eq!(trie.get_options("/widgets", &ctx), vec![Method::GET, Method::POST]);
    assert_eq!(
        trie.resolve(&Method::PUT, "/widgets", &ctx).unwrap_err().allow_header().as_deref(),
        Some("GET, POST")
    );
}

#[test]
fn options_request_without_route_gets_allow_list() {
    init_logger();
    let trie = RouteTrie::build(&widgets(), RouterConfig::default()).unwrap();
    let ctx = DefaultContext::new();

    assert_eq!(
        trie.resolve(&Method::OPTIONS, "/widgets", &ctx),
        Ok(Resolution::Options {
            allow: vec![Method::GET, Method::POST]
        })
    );
    assert_eq!(
        trie.resolve(&Method::OPTIONS, "/gadgets", &ctx),
        Err(HttpError::NotFound)
    );
}

#[test]
fn explicit_options_route_wins() {
    init_logger();
    let mut cache = widgets();
    cache.module("cors").options("/widgets");
    let trie = RouteTrie::build(&cache, RouterConfig::default()).unwrap();

    match trie.resolve(&Method::OPTIONS, "/widgets", &DefaultContext::new()) {
        Ok(Resolution::Matched(m)) => assert_eq!(m.module_key(), "cors"),
        other => panic!("unexpected resolution: {:?}", other),
    }
}

#[test]
fn shared_trie_swaps_atomically() {
    init_logger();
    let shared = SharedRouteTrie::build(&widgets(), RouterConfig::default()).unwrap();
    let ctx = DefaultContext::new();

    let before = shared.snapshot();
    assert!(shared.get_matches(&Method::GET, "/gadgets", &ctx).is_empty());

    let mut next = widgets();
    next.module("gadgets").get("/gadgets");
    shared.rebuild(&next).unwrap();

    assert_eq!(shared.get_matches(&Method::GET, "/gadgets", &ctx).len(), 1);
    // an old snapshot keeps answering with the old routes
    assert!(before.get_matches(&Method::GET, "/gadgets", &ctx).is_empty());
}

#[test]
fn failed_rebuild_keeps_live_trie() {
    init_logger();
    let shared = SharedRouteTrie::build(&widgets(), RouterConfig::default()).unwrap();
    let ctx = DefaultContext::new();

    let mut broken = widgets();
    broken.module("bad").get("/bad/{id");
    assert!(shared.rebuild(&broken).is_err());

    assert_eq!(shared.get_matches(&Method::GET, "/widgets", &ctx).len(), 1);
    assert!(shared.get_matches(&Method::GET, "/bad/{id", &ctx).is_empty());
}

#[test]
fn rebuild_with_new_config() {
    init_logger();
    let shared = SharedRouteTrie::build(&widgets(), RouterConfig::default()).unwrap();
    let ctx = DefaultContext::new();
    assert_eq!(shared.get_matches(&Method::GET, "/WIDGETS", &ctx).len(), 1);

    shared
        .rebuild_with(&widgets(), RouterConfig::new().case_sensitive(true))
        .unwrap();
    assert!(shared.get_matches(&Method::GET, "/WIDGETS", &ctx).is_empty());
    assert!(shared.snapshot().config().case_sensitive);
}

#[test]
fn config_from_json() {
    let config = RouterConfig::from_json_str(r#"{ "case_sensitive": true }"#).unwrap();
    assert_eq!(
        config,
        RouterConfig {
            case_sensitive: true,
            head_falls_back_to_get: true,
        }
    );

    let config = RouterConfig::from_json_str("{}").unwrap();
    assert_eq!(config, RouterConfig::default());
    assert!(!config.case_sensitive);

    assert!(RouterConfig::from_json_str("{ case_sensitive: }").is_err());
}

#[test]
fn config_load_missing_file_is_io_error() {
    let err = RouterConfig::load("/definitely/not/here/router.json").unwrap_err();
    assert!(matches!(err, kurosabi_router::ConfigError::Io(_)));
}

#[test]
fn methods_parse_case_insensitively() {
    assert_eq!(Method::parse("get"), Method::GET);
    assert_eq!(Method::parse(" Options "), Method::OPTIONS);
    assert_eq!(Method::parse("purge"), Method::UNKNOWN("PURGE".to_string()));
    assert_eq!(Method::parse("purge").as_str(), "PURGE");

    let json = serde_json::to_string(&vec![Method::GET, Method::UNKNOWN("PURGE".into())]).unwrap();
    assert_eq!(json, r#"["GET","PURGE"]"#);
    let back: Vec<Method> = serde_json::from_str(r#"["delete","Patch"]"#).unwrap();
    assert_eq!(back, vec![Method::DELETE, Method::PATCH]);
}

#[test]
fn match_result_serializes_for_logging() {
    let mut cache: RouteCache<DefaultContext> = RouteCache::new();
    cache.module("users").get("/users/{id:int}");
    let trie = RouteTrie::build(&cache, RouterConfig::default()).unwrap();

    let m = trie
        .get_matches(&Method::GET, "/users/5", &DefaultContext::new())
        .pop()
        .unwrap();
    let value = serde_json::to_value(&m).unwrap();
    assert_eq!(value["route"]["module_key"], "users");
    assert_eq!(value["route"]["method"], "GET");
    assert_eq!(value["route"]["score"], 500);
    assert_eq!(value["parameters"]["id"], 5);
}
