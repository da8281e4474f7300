use thiserror::Error;

use crate::utils::method::Method;

/// Errors raised while building route tries.
///
/// These are developer mistakes in route registration, so they surface at
/// startup and never at request time.
///
/// ルート登録時のエラー。起動時に検出される。
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("malformed segment `{segment}` in route `{pattern}`: {reason}")]
    MalformedSegment {
        pattern: String,
        segment: String,
        reason: &'static str,
    },

    #[error("unknown constraint `{constraint}` in route `{pattern}`")]
    UnknownConstraint { pattern: String, constraint: String },

    #[error("invalid regex segment `{segment}` in route `{pattern}`: {source}")]
    InvalidRegex {
        pattern: String,
        segment: String,
        #[source]
        source: regex::Error,
    },

    #[error("greedy segment `{segment}` must be the last segment of route `{pattern}`")]
    GreedyNotLast { pattern: String, segment: String },
}

/// 設定読み込みのエラー
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Resolution failures handed to the dispatch layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HttpError {
    #[error("Not Found")]
    NotFound,

    #[error("Method Not Allowed (allow: {})", join_methods(.allow))]
    MethodNotAllowed { allow: Vec<Method> },
}

impl HttpError {
    pub fn status_code(&self) -> u16 {
        match self {
            HttpError::NotFound => 404,
            HttpError::MethodNotAllowed { .. } => 405,
        }
    }

    /// `Allow` ヘッダに入れる値
    pub fn allow_header(&self) -> Option<String> {
        match self {
            HttpError::NotFound => None,
            HttpError::MethodNotAllowed { allow } => Some(join_methods(allow)),
        }
    }
}

pub(crate) fn join_methods(methods: &[Method]) -> String {
    methods
        .iter()
        .map(Method::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
