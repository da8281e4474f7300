//! Hot-swappable route trie.
//!
//! A rebuilt trie replaces the live one in a single atomic store; readers
//! keep whatever trie they loaded until they finish.
//!
//! ルートの再構築時はツリーを丸ごと差し替える

use std::sync::Arc;

use arc_swap::ArcSwap;
use log::{info, warn};

use crate::{
    config::RouterConfig,
    error::{HttpError, RouteError},
    utils::method::Method,
};

use super::{Resolution, RouteResolver, RouteTrie, cache::RouteCache, result::MatchResult};

pub struct SharedRouteTrie<C> {
    current: ArcSwap<RouteTrie<C>>,
}

impl<C> SharedRouteTrie<C> {
    pub fn new(trie: RouteTrie<C>) -> Self {
        SharedRouteTrie {
            current: ArcSwap::from_pointee(trie),
        }
    }

    pub fn build(cache: &RouteCache<C>, config: RouterConfig) -> Result<Self, RouteError> {
        Ok(Self::new(RouteTrie::build(cache, config)?))
    }

    /// 現在のツリーを取得する
    pub fn snapshot(&self) -> Arc<RouteTrie<C>> {
        self.current.load_full()
    }

    /// Builds a fresh trie with the live config and swaps it in.
    /// On error the live trie stays in place.
    pub fn rebuild(&self, cache: &RouteCache<C>) -> Result<(), RouteError> {
        let config = self.current.load().config().clone();
        self.rebuild_with(cache, config)
    }

    pub fn rebuild_with(&self, cache: &RouteCache<C>, config: RouterConfig) -> Result<(), RouteError> {
        match RouteTrie::build(cache, config) {
            Ok(trie) => {
                self.current.store(Arc::new(trie));
                info!("route trie swapped");
                Ok(())
            }
            Err(e) => {
                warn!("route rebuild failed, keeping current trie: {}", e);
                Err(e)
            }
        }
    }
}

impl<C> RouteResolver<C> for SharedRouteTrie<C> {
    fn get_matches(&self, method: &Method, path: &str, ctx: &C) -> Vec<MatchResult> {
        self.current.load().get_matches(method, path, ctx)
    }

    fn get_options(&self, path: &str, ctx: &C) -> Vec<Method> {
        self.current.load().get_options(path, ctx)
    }

    /// Resolves against one snapshot so a concurrent swap cannot mix
    /// candidates from two tries.
    fn resolve(&self, method: &Method, path: &str, ctx: &C) -> Result<Resolution, HttpError> {
        self.current.load().resolve(method, path, ctx)
    }
}
