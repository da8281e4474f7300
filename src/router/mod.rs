//! Route resolution trie (AHash + SmallVec, one tree per method)
//!
//! ルート解決用のトライ木（メソッドごとに1本）

pub mod cache;
pub mod constraint;
pub mod node;
pub mod result;
pub mod segment;
pub mod shared;

use ahash::AHashMap as Map;
use log::{debug, info, trace};

use crate::{
    config::RouterConfig,
    error::{HttpError, RouteError},
    utils::{
        method::Method,
        path::{split_segments, strip_query},
    },
};

use self::{
    cache::RouteCache,
    node::{PendingRoute, TrieNode},
    result::{MatchResult, Parameters, best_match},
    segment::split_pattern,
};

/// Outcome of resolving a request for the dispatch layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Best-ranked route for the request.
    Matched(MatchResult),
    /// `OPTIONS` request with no explicit route; these methods match.
    Options { allow: Vec<Method> },
}

/// Trait for anything that can answer route queries.
///
/// This trait defines the interface for listing candidate matches,
/// listing the methods valid for a path and resolving a request.
///
/// ルート問い合わせに答えるためのトレイト。
/// 候補の列挙、パスに対して有効なメソッドの列挙、リクエストの解決のインターフェースを定義します。
pub trait RouteResolver<C>: Send + Sync {
    /// Every route matching `method` and `path`, unranked. Empty when
    /// nothing matches.
    ///
    /// メソッドとパスにマッチするすべてのルートを返します（順位付けなし）。
    fn get_matches(&self, method: &Method, path: &str, ctx: &C) -> Vec<MatchResult>;

    /// Methods with at least one route matching `path`.
    ///
    /// パスにマッチするルートを持つメソッドの一覧を返します。
    fn get_options(&self, path: &str, ctx: &C) -> Vec<Method>;

    /// Ranks the candidates and picks the best one; falls back to
    /// `OPTIONS`/405/404 semantics when the method has no match.
    ///
    /// 候補を順位付けして最良のものを選びます。
    fn resolve(&self, method: &Method, path: &str, ctx: &C) -> Result<Resolution, HttpError> {
        if let Some(best) = best_match(self.get_matches(method, path, ctx)) {
            return Ok(Resolution::Matched(best));
        }
        let allow = self.get_options(path, ctx);
        if allow.is_empty() {
            return Err(HttpError::NotFound);
        }
        if *method == Method::OPTIONS {
            return Ok(Resolution::Options { allow });
        }
        Err(HttpError::MethodNotAllowed { allow })
    }
}

/// Per-method route tries, immutable once built.
pub struct RouteTrie<C> {
    trees: Map<Method, TrieNode<C>>,
    config: RouterConfig,
}

impl<C> RouteTrie<C> {
    /// Builds one tree per method from the whole route cache.
    ///
    /// Fails on the first malformed pattern; nothing is partially built.
    pub fn build(cache: &RouteCache<C>, config: RouterConfig) -> Result<Self, RouteError> {
        let mut trees: Map<Method, TrieNode<C>> = Map::default();

        for module in cache.modules() {
            for (route_index, description) in module.routes() {
                let segments = split_pattern(description.path());
                let pending = PendingRoute {
                    module_key: module.key(),
                    route_index: *route_index,
                    description,
                    route_length: segments.len(),
                };
                trees
                    .entry(description.method().clone())
                    .or_insert_with(TrieNode::root)
                    .add(&segments, &pending, 0, &config)?;
            }
        }

        for (method, root) in &trees {
            debug!("route tree {}: {} routes", method, root.terminal_count());
        }
        info!(
            "built route trie: {} routes, {} methods",
            cache.route_count(),
            trees.len()
        );

        Ok(RouteTrie { trees, config })
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Methods that have a tree, sorted by name.
    pub fn methods(&self) -> Vec<Method> {
        let mut methods: Vec<Method> = self.trees.keys().cloned().collect();
        methods.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        methods
    }

    pub fn route_count(&self) -> usize {
        self.trees.values().map(TrieNode::terminal_count).sum()
    }

    pub fn tree(&self, method: &Method) -> Option<&TrieNode<C>> {
        self.trees.get(method)
    }

    /// `HEAD` は `GET` のツリーで代用できる
    fn tree_for(&self, method: &Method) -> Option<&TrieNode<C>> {
        match self.trees.get(method) {
            Some(root) => Some(root),
            None if *method == Method::HEAD && self.config.head_falls_back_to_get => {
                self.trees.get(&Method::GET)
            }
            None => None,
        }
    }

    fn matches_in(&self, root: &TrieNode<C>, path: &str, ctx: &C) -> Vec<MatchResult> {
        let segments = split_segments(strip_query(path));
        let mut out = Vec::new();
        root.collect(&segments, &Parameters::new(), ctx, &self.config, &mut out);
        out
    }
}

impl<C> RouteResolver<C> for RouteTrie<C> {
    fn get_matches(&self, method: &Method, path: &str, ctx: &C) -> Vec<MatchResult> {
        if path.is_empty() {
            return Vec::new();
        }
        let Some(root) = self.tree_for(method) else {
            trace!("no route tree for {}", method);
            return Vec::new();
        };
        let matches = self.matches_in(root, path, ctx);
        trace!("{} {} -> {} candidates", method, path, matches.len());
        matches
    }

    fn get_options(&self, path: &str, ctx: &C) -> Vec<Method> {
        if path.is_empty() {
            return Vec::new();
        }
        let mut allow: Vec<Method> = self
            .trees
            .iter()
            .filter(|(_, root)| !self.matches_in(root, path, ctx).is_empty())
            .map(|(method, _)| method.clone())
            .collect();
        allow.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        allow
    }
}

impl<C> std::fmt::Debug for RouteTrie<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteTrie")
            .field("methods", &self.methods())
            .field("routes", &self.route_count())
            .field("config", &self.config)
            .finish()
    }
}
