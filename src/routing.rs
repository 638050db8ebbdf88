//! The top level route table: the storefront bundle, the CMS bundle behind
//! the admin guard, and static files.

use axum::{Router, middleware};
use tower::ServiceBuilder;
use tower_http::services::ServeDir;

use crate::{
    AppState, auth::admin_guard, cms::load_cms, endpoints, lazy_module::LazyModule,
    website::load_website,
};

/// The lazily loaded bundles the application is made of.
///
/// Keep a clone around to check which bundles have been loaded.
#[derive(Debug, Clone)]
pub struct RouteTable {
    /// Everything outside `/cms`, including the not-found page.
    pub website: LazyModule,
    /// The catalogue management pages under `/cms`.
    pub cms: LazyModule,
}

impl RouteTable {
    /// Create the route table with neither bundle loaded.
    pub fn new(state: AppState) -> Self {
        Self {
            website: LazyModule::new("website", state.clone(), load_website),
            cms: LazyModule::new("cms", state, load_cms),
        }
    }

    /// Return a router that dispatches requests to the bundles.
    ///
    /// Requests for `/cms` pass through [admin_guard] before they reach the
    /// CMS bundle, so a rejected request never loads it. Paths that neither
    /// bundle knows get the 404 page from the storefront.
    pub fn into_router(self, state: AppState) -> Router {
        let guarded_cms = ServiceBuilder::new()
            .layer(middleware::from_fn_with_state(state, admin_guard))
            .service(self.cms);

        Router::new()
            .nest_service(endpoints::CMS, guarded_cms)
            .nest_service(endpoints::STATIC, ServeDir::new("static/"))
            .fallback_service(self.website)
    }
}

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    RouteTable::new(state.clone()).into_router(state)
}
