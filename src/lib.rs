pub mod config;
pub mod context;
pub mod error;
pub mod router;
pub mod utils;

pub use crate::config::RouterConfig;
pub use crate::context::DefaultContext;
pub use crate::error::{ConfigError, HttpError, RouteError};
pub use crate::router::{
    Resolution, RouteResolver, RouteTrie,
    cache::{Condition, ModuleRoutes, RouteCache, RouteDescription},
    result::{MatchResult, ParamValue, Parameters, RouteInfo, best_match, rank_matches},
    shared::SharedRouteTrie,
};
pub use crate::utils::method::Method;
