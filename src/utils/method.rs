use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// HTTPメソッドのenum
/// ルートツリーはメソッドごとに1本ずつ持つ
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Method {
    GET,
    POST,
    HEAD,
    PUT,
    DELETE,
    OPTIONS,
    TRACE,
    CONNECT,
    PATCH,

    /// カスタム (大文字に正規化済み)
    UNKNOWN(String),
}

impl Method {
    /// 文字列からMethodを取得する
    /// 大文字小文字は区別しない
    #[inline]
    pub fn parse(method: &str) -> Method {
        let trimmed = method.trim();
        if trimmed.bytes().all(|b| !b.is_ascii_lowercase()) {
            return Self::from_upper(trimmed);
        }
        Self::from_upper(&trimmed.to_ascii_uppercase())
    }

    #[inline]
    fn from_upper(method: &str) -> Method {
        match method {
            "GET" => Method::GET,
            "POST" => Method::POST,
            "HEAD" => Method::HEAD,
            "PUT" => Method::PUT,
            "DELETE" => Method::DELETE,
            "OPTIONS" => Method::OPTIONS,
            "TRACE" => Method::TRACE,
            "CONNECT" => Method::CONNECT,
            "PATCH" => Method::PATCH,
            method => Method::UNKNOWN(method.to_string()),
        }
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::HEAD => "HEAD",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
            Method::OPTIONS => "OPTIONS",
            Method::TRACE => "TRACE",
            Method::CONNECT => "CONNECT",
            Method::PATCH => "PATCH",
            Method::UNKNOWN(method) => method,
        }
    }
}

impl From<&str> for Method {
    fn from(method: &str) -> Self {
        Method::parse(method)
    }
}

impl std::fmt::Display for Method {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Method {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Method {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Method::parse(&raw))
    }
}
