//! Match results and their ranking.
//!
//! マッチ結果とその順位付け

use std::{cmp::Ordering, sync::Arc};

use serde::Serialize;
use smallvec::SmallVec;

use crate::utils::method::Method;

/// A captured path parameter.
///
/// Constrained captures bind typed values, everything else binds text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Text(String),
    Int(i64),
    Decimal(f64),
    Bool(bool),
}

impl ParamValue {
    /// 文字列として取得する (型付きの値は `None`)
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ParamValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Decimal(v) => Some(*v),
            ParamValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl std::fmt::Display for ParamValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamValue::Text(s) => f.write_str(s),
            ParamValue::Int(v) => write!(f, "{}", v),
            ParamValue::Decimal(v) => write!(f, "{}", v),
            ParamValue::Bool(v) => write!(f, "{}", v),
        }
    }
}

/// Captured parameters in capture order.
///
/// 4個までならヒープを使わない
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters {
    entries: SmallVec<[(Box<str>, ParamValue); 4]>,
}

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// 同名のパラメータがあれば上書きする
    pub fn insert(&mut self, name: &str, value: impl Into<ParamValue>) {
        let value = value.into();
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| &**k == name) {
            slot.1 = value;
        } else {
            self.entries.push((name.into(), value));
        }
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.entries
            .iter()
            .find(|(k, _)| &**k == name)
            .map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (&**k, v))
    }

    pub(crate) fn extend(&mut self, other: Parameters) {
        for (name, value) in other.entries {
            self.insert(&name, value);
        }
    }
}

impl Serialize for Parameters {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(&**k, v)?;
        }
        map.end()
    }
}

/// Outcome of testing one segment (or the path remainder) against a node.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentMatch {
    pub matched: bool,
    pub captures: Parameters,
}

impl SegmentMatch {
    #[inline]
    pub fn no_match() -> Self {
        SegmentMatch {
            matched: false,
            captures: Parameters::new(),
        }
    }

    #[inline]
    pub fn matched(captures: Parameters) -> Self {
        SegmentMatch {
            matched: true,
            captures,
        }
    }
}

/// Metadata of one registered route, attached to a trie terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteInfo {
    pub module_key: Arc<str>,
    pub method: Method,
    pub path: Arc<str>,
    pub name: Option<Arc<str>>,
    /// Ordinal of the route inside its module.
    pub route_index: usize,
    /// Number of segments in the registered pattern.
    pub route_length: usize,
    /// Sum of segment costs from the root. Lower is more literal.
    pub score: u32,
}

/// A candidate produced by matching a request path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub route: Arc<RouteInfo>,
    pub parameters: Parameters,
}

impl MatchResult {
    pub fn module_key(&self) -> &str {
        &self.route.module_key
    }

    pub fn method(&self) -> &Method {
        &self.route.method
    }

    pub fn route_index(&self) -> usize {
        self.route.route_index
    }

    pub fn param(&self, name: &str) -> Option<&ParamValue> {
        self.parameters.get(name)
    }

    /// Ranking order; `Less` means `self` is the better candidate.
    ///
    /// 1. fewer pattern segments
    /// 2. lower score
    /// 3. same module: lower route index
    ///
    /// Anything else compares equal so a stable sort keeps candidate order.
    pub fn rank(&self, other: &MatchResult) -> Ordering {
        let (a, b) = (&self.route, &other.route);
        a.route_length
            .cmp(&b.route_length)
            .then(a.score.cmp(&b.score))
            .then_with(|| {
                if a.module_key == b.module_key {
                    a.route_index.cmp(&b.route_index)
                } else {
                    Ordering::Equal
                }
            })
    }
}

/// 候補を順位順に並べ替える (安定ソート)
pub fn rank_matches(matches: &mut [MatchResult]) {
    matches.sort_by(MatchResult::rank);
}

/// 最良の候補を取り出す
pub fn best_match(mut matches: Vec<MatchResult>) -> Option<MatchResult> {
    rank_matches(&mut matches);
    matches.into_iter().next()
}
