//! Router configuration.
//!
//! ルーターの設定。ビルド時に明示的に渡される。

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Literal, regex and multi-parameter literal text are compared
    /// case-sensitively when set.
    pub case_sensitive: bool,
    /// `HEAD` requests use the `GET` tree when no `HEAD` route exists.
    pub head_falls_back_to_get: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        RouterConfig {
            case_sensitive: false,
            head_falls_back_to_get: true,
        }
    }
}

impl RouterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn head_falls_back_to_get(mut self, enabled: bool) -> Self {
        self.head_falls_back_to_get = enabled;
        self
    }

    /// JSON文字列から読み込む。欠けている項目はデフォルト値になる
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }
}
