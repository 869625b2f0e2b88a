use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::core::{Method, Request, Response};
use crate::error::WebError;

/// Terminal request handler.
#[async_trait]
pub trait Handler: Send + Sync + 'static {
    async fn handle(&self, req: Request) -> Result<Response, WebError>;
}

/// Adapts a synchronous closure into a [`Handler`].
pub struct FnHandler<F>(F);

impl<F> FnHandler<F> {
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait]
impl<F> Handler for FnHandler<F>
where
    F: Fn(Request) -> Result<Response, WebError> + Send + Sync + 'static,
{
    async fn handle(&self, req: Request) -> Result<Response, WebError> {
        (self.0)(req)
    }
}

pub type Params = HashMap<String, String>;

/// Method-keyed radix routers.
#[derive(Default)]
pub struct Router {
    by_method: HashMap<Method, matchit::Router<Arc<dyn Handler>>>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `method` and `path`.
    ///
    /// # Panics
    /// When `path` is not a valid pattern or conflicts with an existing route.
    pub fn add<S: Into<String>>(&mut self, method: Method, path: S, handler: Arc<dyn Handler>) {
        let path = path.into();
        self.by_method
            .entry(method)
            .or_default()
            .insert(path.clone(), handler)
            .unwrap_or_else(|e| panic!("invalid route {path}: {e}"));
    }

    pub fn add_fn<S, F>(&mut self, method: Method, path: S, f: F)
    where
        S: Into<String>,
        F: Fn(Request) -> Result<Response, WebError> + Send + Sync + 'static,
    {
        self.add(method, path, Arc::new(FnHandler(f)))
    }

    pub fn get<S: Into<String>>(&mut self, path: S, handler: Arc<dyn Handler>) {
        self.add(Method::GET, path, handler)
    }

    pub fn post<S: Into<String>>(&mut self, path: S, handler: Arc<dyn Handler>) {
        self.add(Method::POST, path, handler)
    }

    pub fn put<S: Into<String>>(&mut self, path: S, handler: Arc<dyn Handler>) {
        self.add(Method::PUT, path, handler)
    }

    pub fn delete<S: Into<String>>(&mut self, path: S, handler: Arc<dyn Handler>) {
        self.add(Method::DELETE, path, handler)
    }

    pub fn patch<S: Into<String>>(&mut self, path: S, handler: Arc<dyn Handler>) {
        self.add(Method::PATCH, path, handler)
    }

    pub fn head<S: Into<String>>(&mut self, path: S, handler: Arc<dyn Handler>) {
        self.add(Method::HEAD, path, handler)
    }

    pub fn options<S: Into<String>>(&mut self, path: S, handler: Arc<dyn Handler>) {
        self.add(Method::OPTIONS, path, handler)
    }

    pub fn get_fn<S, F>(&mut self, path: S, f: F)
    where
        S: Into<String>,
        F: Fn(Request) -> Result<Response, WebError> + Send + Sync + 'static,
    {
        self.add_fn(Method::GET, path, f)
    }

    pub fn post_fn<S, F>(&mut self, path: S, f: F)
    where
        S: Into<String>,
        F: Fn(Request) -> Result<Response, WebError> + Send + Sync + 'static,
    {
        self.add_fn(Method::POST, path, f)
    }

    /// Look up a handler. HEAD falls back to the GET route when no explicit
    /// HEAD route exists.
    pub fn find(&self, method: &Method, path: &str) -> Option<(Arc<dyn Handler>, Params)> {
        self.lookup(method, path).or_else(|| {
            if *method == Method::HEAD {
                self.lookup(&Method::GET, path)
            } else {
                None
            }
        })
    }

    fn lookup(&self, method: &Method, path: &str) -> Option<(Arc<dyn Handler>, Params)> {
        let matched = self.by_method.get(method)?.at(path).ok()?;
        let params = matched
            .params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Some((Arc::clone(matched.value), params))
    }

    /// Methods with a route matching `path`, sorted, for `Allow` headers.
    pub fn allowed_methods(&self, path: &str) -> Vec<String> {
        let mut methods: Vec<String> = self
            .by_method
            .iter()
            .filter(|(_, r)| r.at(path).is_ok())
            .map(|(m, _)| m.as_str().to_string())
            .collect();
        methods.sort();
        methods
    }
}
