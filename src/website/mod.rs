//! The public storefront bundle.

mod home;
mod profile;

use axum::{
    Router, middleware,
    routing::{delete, get, post},
};

use crate::{
    AppState,
    auth::{auth_guard, get_log_in_page, get_log_out, get_register_page, post_log_in, register_user},
    cart::{add_to_cart_endpoint, get_cart_page, remove_from_cart_endpoint},
    category::get_category_page,
    endpoints,
    internal_server_error::get_internal_server_error_page,
    navigation::{get_cart_counter_stream, get_nav_menu},
    not_found::get_404_not_found,
    product::get_product_page,
};

pub use home::{get_home_page, get_index_page};
pub use profile::get_profile_page;

/// Build the storefront router: catalogue, cart and account pages plus the
/// HTMX endpoints they call.
pub fn load_website(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route(endpoints::PROFILE_VIEW, get(get_profile_page))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::HOME_VIEW, get(get_home_page))
        .route(endpoints::CATEGORY_VIEW, get(get_category_page))
        .route(endpoints::PRODUCT_VIEW, get(get_product_page))
        .route(endpoints::CART_VIEW, get(get_cart_page))
        .route(endpoints::LOG_IN_VIEW, get(get_log_in_page))
        .route(endpoints::REGISTER_VIEW, get(get_register_page))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        )
        .route(endpoints::LOG_IN_API, post(post_log_in))
        .route(endpoints::LOG_OUT, get(get_log_out))
        .route(endpoints::USERS, post(register_user))
        .route(endpoints::CART_ITEMS, post(add_to_cart_endpoint))
        .route(endpoints::CART_ITEM, delete(remove_from_cart_endpoint))
        .route(endpoints::NAV_MENU, get(get_nav_menu))
        .route(endpoints::NAV_CART_COUNTER, get(get_cart_counter_stream))
        .merge(protected_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}
