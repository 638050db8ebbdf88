//! A router that is only built when the first request reaches it.

use std::{
    convert::Infallible,
    sync::{Arc, OnceLock},
    task::{Context, Poll},
};

use axum::{Router, extract::Request, response::Response};
use tower::{Service, ServiceExt, util::Oneshot};

use crate::AppState;

/// Builds the router of a feature module from the application state.
pub type Loader = fn(AppState) -> Router;

/// A feature module whose router is built by its [Loader] on first use.
///
/// Clones share the built router, so the loader runs at most once no matter
/// how many clones serve requests.
#[derive(Debug, Clone)]
pub struct LazyModule {
    name: &'static str,
    state: AppState,
    loader: Loader,
    router: Arc<OnceLock<Router>>,
}

impl LazyModule {
    /// Create a module named `name` that is not loaded yet.
    ///
    /// `loader` is called with `state` when the first request arrives.
    pub fn new(name: &'static str, state: AppState, loader: Loader) -> Self {
        Self {
            name,
            state,
            loader,
            router: Arc::default(),
        }
    }

    /// The name used when logging that the module loaded.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether a request has reached this module yet.
    pub fn is_loaded(&self) -> bool {
        self.router.get().is_some()
    }

    fn router(&self) -> Router {
        self.router
            .get_or_init(|| {
                tracing::info!("Loading the {} module", self.name);
                (self.loader)(self.state.clone())
            })
            .clone()
    }
}

impl Service<Request> for LazyModule {
    type Response = Response;
    type Error = Infallible;
    type Future = Oneshot<Router, Request>;

    // Loading waits for the first call so that a rejected request never
    // builds the module.
    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request) -> Self::Future {
        self.router().oneshot(request)
    }
}
