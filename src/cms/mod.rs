//! The administrative bundle for managing the catalogue.
//!
//! The router is mounted under [endpoints::CMS], so its routes are relative
//! to that prefix. Access control is left to whoever mounts it.

mod dashboard;

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::{
    AppState,
    category::{
        create_category_endpoint, delete_category_endpoint, get_categories_page,
        get_new_category_page,
    },
    endpoints,
    not_found::get_404_not_found,
    product::{
        create_product_endpoint, delete_product_endpoint, get_new_product_page, get_products_page,
    },
};

pub use dashboard::get_dashboard_page;

/// The route of `endpoint` inside the CMS router.
fn relative(endpoint: &'static str) -> &'static str {
    match endpoint.strip_prefix(endpoints::CMS) {
        Some("") | None => "/",
        Some(path) => path,
    }
}

/// Build the CMS router: the dashboard, category and product management
/// pages plus their HTMX endpoints.
pub fn load_cms(state: AppState) -> Router {
    Router::new()
        .route(relative(endpoints::CMS), get(get_dashboard_page))
        .route(relative(endpoints::CMS_CATEGORIES), get(get_categories_page))
        .route(
            relative(endpoints::CMS_NEW_CATEGORY),
            get(get_new_category_page),
        )
        .route(relative(endpoints::CMS_PRODUCTS), get(get_products_page))
        .route(
            relative(endpoints::CMS_NEW_PRODUCT),
            get(get_new_product_page),
        )
        .route(
            relative(endpoints::CMS_POST_CATEGORY),
            post(create_category_endpoint),
        )
        .route(
            relative(endpoints::CMS_DELETE_CATEGORY),
            delete(delete_category_endpoint),
        )
        .route(
            relative(endpoints::CMS_POST_PRODUCT),
            post(create_product_endpoint),
        )
        .route(
            relative(endpoints::CMS_DELETE_PRODUCT),
            delete(delete_product_endpoint),
        )
        .fallback(get_404_not_found)
        .with_state(state)
}
