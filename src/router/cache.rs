//! Route cache: the registered routes of every module, in declaration order.
//!
//! モジュールごとのルート登録

use std::sync::Arc;

use crate::utils::method::Method;

/// Predicate over the request context gating a route.
pub type Condition<C> = Arc<dyn Fn(&C) -> bool + Send + Sync>;

/// One registered route.
pub struct RouteDescription<C> {
    method: Method,
    path: String,
    name: Option<String>,
    condition: Option<Condition<C>>,
}

impl<C> RouteDescription<C> {
    pub fn new(method: impl Into<Method>, path: &str) -> Self {
        RouteDescription {
            method: method.into(),
            path: path.to_string(),
            name: None,
            condition: None,
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// 条件を付ける。`false` を返すとこのルートはマッチしない
    pub fn when<F>(mut self, condition: F) -> Self
    where
        F: Fn(&C) -> bool + Send + Sync + 'static,
    {
        self.condition = Some(Arc::new(condition));
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn condition(&self) -> Option<&Condition<C>> {
        self.condition.as_ref()
    }
}

impl<C> Clone for RouteDescription<C> {
    fn clone(&self) -> Self {
        RouteDescription {
            method: self.method.clone(),
            path: self.path.clone(),
            name: self.name.clone(),
            condition: self.condition.clone(),
        }
    }
}

impl<C> std::fmt::Debug for RouteDescription<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteDescription")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("name", &self.name)
            .field("condition", &self.condition.is_some())
            .finish()
    }
}

/// Routes of one module. Indices follow declaration order from 0.
pub struct ModuleRoutes<C> {
    key: Arc<str>,
    routes: Vec<(usize, RouteDescription<C>)>,
}

impl<C> ModuleRoutes<C> {
    fn new(key: &str) -> Self {
        ModuleRoutes {
            key: key.into(),
            routes: Vec::new(),
        }
    }

    pub fn key(&self) -> &Arc<str> {
        &self.key
    }

    pub fn routes(&self) -> &[(usize, RouteDescription<C>)] {
        &self.routes
    }

    pub fn route(&mut self, description: RouteDescription<C>) -> &mut Self {
        let index = self.routes.len();
        self.routes.push((index, description));
        self
    }

    pub fn get(&mut self, path: &str) -> &mut Self {
        self.route(RouteDescription::new(Method::GET, path))
    }

    pub fn post(&mut self, path: &str) -> &mut Self {
        self.route(RouteDescription::new(Method::POST, path))
    }

    pub fn put(&mut self, path: &str) -> &mut Self {
        self.route(RouteDescription::new(Method::PUT, path))
    }

    pub fn delete(&mut self, path: &str) -> &mut Self {
        self.route(RouteDescription::new(Method::DELETE, path))
    }

    pub fn patch(&mut self, path: &str) -> &mut Self {
        self.route(RouteDescription::new(Method::PATCH, path))
    }

    pub fn head(&mut self, path: &str) -> &mut Self {
        self.route(RouteDescription::new(Method::HEAD, path))
    }

    pub fn options(&mut self, path: &str) -> &mut Self {
        self.route(RouteDescription::new(Method::OPTIONS, path))
    }
}

/// Every module's routes, in module registration order.
pub struct RouteCache<C> {
    modules: Vec<ModuleRoutes<C>>,
}

impl<C> Default for RouteCache<C> {
    fn default() -> Self {
        RouteCache {
            modules: Vec::new(),
        }
    }
}

impl<C> RouteCache<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// モジュールを取得する。なければ作る
    pub fn module(&mut self, key: &str) -> &mut ModuleRoutes<C> {
        let idx = match self.modules.iter().position(|m| &*m.key == key) {
            Some(idx) => idx,
            None => {
                self.modules.push(ModuleRoutes::new(key));
                self.modules.len() - 1
            }
        };
        &mut self.modules[idx]
    }

    pub fn modules(&self) -> &[ModuleRoutes<C>] {
        &self.modules
    }

    pub fn is_empty(&self) -> bool {
        self.modules.iter().all(|m| m.routes.is_empty())
    }

    pub fn route_count(&self) -> usize {
        self.modules.iter().map(|m| m.routes.len()).sum()
    }
}
