/// Request context handed to route conditions.
///
/// The trie never looks inside it; it only passes it to the condition
/// predicates attached to routes. Any `C` works, this is just the default.
///
/// ルート条件に渡されるリクエストコンテキスト
#[derive(Clone, Debug, Default)]
pub struct DefaultContext {
    /// ヘッダのキーと値のペア
    /// リニアサーチの方が早い
    headers: Vec<(String, String)>,
}

impl DefaultContext {
    pub fn new() -> DefaultContext {
        DefaultContext {
            headers: Vec::new(),
        }
    }

    pub fn with_header(mut self, key: &str, value: &str) -> DefaultContext {
        self.set_header(key, value);
        self
    }

    pub fn set_header(&mut self, key: &str, value: &str) {
        self.headers.push((key.to_string(), value.to_string()));
    }

    /// ヘッダを取得する (キーは大文字小文字を区別しない)
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }
}
