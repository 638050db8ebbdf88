//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/product/{product_id}', use [format_endpoint].

/// The root route which redirects to the home page.
pub const ROOT: &str = "/";
/// The storefront landing page listing the product catalogue.
pub const HOME_VIEW: &str = "/home";
/// The page listing the products in a single category.
pub const CATEGORY_VIEW: &str = "/category/{category_id}";
/// The page for a single product.
pub const PRODUCT_VIEW: &str = "/product/{product_id}";
/// The page showing the visitor's cart.
pub const CART_VIEW: &str = "/cart";
/// The route for getting the log in page.
pub const LOG_IN_VIEW: &str = "/log_in";
/// The route for getting the registration page.
pub const REGISTER_VIEW: &str = "/register";
/// The page showing the logged in user's profile.
pub const PROFILE_VIEW: &str = "/profile";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route for logging in a user.
pub const LOG_IN_API: &str = "/api/log_in";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/api/log_out";
/// The route to register users.
pub const USERS: &str = "/api/users";
/// The route for adding products to the cart.
pub const CART_ITEMS: &str = "/api/cart/items";
/// The route for removing a product from the cart.
pub const CART_ITEM: &str = "/api/cart/items/{product_id}";
/// The route that renders the navigation bar with the menu toggled.
pub const NAV_MENU: &str = "/api/nav/menu";
/// The event stream that pushes the cart counter to the navigation bar.
pub const NAV_CART_COUNTER: &str = "/api/nav/cart_counter";

/// The prefix of the administrative CMS bundle.
pub const CMS: &str = "/cms";
/// The CMS page listing all categories.
pub const CMS_CATEGORIES: &str = "/cms/categories";
/// The CMS page for creating a category.
pub const CMS_NEW_CATEGORY: &str = "/cms/categories/new";
/// The CMS page listing all products.
pub const CMS_PRODUCTS: &str = "/cms/products";
/// The CMS page for creating a product.
pub const CMS_NEW_PRODUCT: &str = "/cms/products/new";
/// The route to create a category.
pub const CMS_POST_CATEGORY: &str = "/cms/api/categories";
/// The route to delete a category.
pub const CMS_DELETE_CATEGORY: &str = "/cms/api/categories/{category_id}";
/// The route to create a product.
pub const CMS_POST_PRODUCT: &str = "/cms/api/products";
/// The route to delete a product.
pub const CMS_DELETE_PRODUCT: &str = "/cms/api/products/{product_id}";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/product/{product_id}', '{product_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_string();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|offset| param_start + offset + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}

/// Whether `path` is an endpoint called by HTMX rather than a page.
pub fn is_api_path(path: &str) -> bool {
    path.starts_with("/api/") || path.starts_with("/cms/api/")
}

// These tests are here so that we know when we call `Uri::from_shared` it will not panic.
#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    use super::{format_endpoint, is_api_path};

    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok(), "{uri} is not a valid URI");
    }

    #[test]
    fn endpoints_are_valid_uris() {
        for endpoint in [
            endpoints::ROOT,
            endpoints::HOME_VIEW,
            endpoints::CATEGORY_VIEW,
            endpoints::PRODUCT_VIEW,
            endpoints::CART_VIEW,
            endpoints::LOG_IN_VIEW,
            endpoints::REGISTER_VIEW,
            endpoints::PROFILE_VIEW,
            endpoints::INTERNAL_ERROR_VIEW,
            endpoints::STATIC,
            endpoints::LOG_IN_API,
            endpoints::LOG_OUT,
            endpoints::USERS,
            endpoints::CART_ITEMS,
            endpoints::CART_ITEM,
            endpoints::NAV_MENU,
            endpoints::NAV_CART_COUNTER,
            endpoints::CMS,
            endpoints::CMS_CATEGORIES,
            endpoints::CMS_NEW_CATEGORY,
            endpoints::CMS_PRODUCTS,
            endpoints::CMS_NEW_PRODUCT,
            endpoints::CMS_POST_CATEGORY,
            endpoints::CMS_DELETE_CATEGORY,
            endpoints::CMS_POST_PRODUCT,
            endpoints::CMS_DELETE_PRODUCT,
        ] {
            assert_endpoint_is_valid_uri(endpoint);
        }
    }

    #[test]
    fn produces_valid_uri() {
        let formatted_path = format_endpoint("/hello/{world_id}", 1);

        assert_eq!(formatted_path, "/hello/1");
        assert!(formatted_path.parse::<Uri>().is_ok());

        // Parameter with single word should also work.
        let formatted_path = format_endpoint("/hello/{world}", 1);

        assert_eq!(formatted_path, "/hello/1");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn returns_original_path_with_no_parameter() {
        let formatted_path = format_endpoint("/hello/world", 1);

        assert_eq!(formatted_path, "/hello/world");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn parameter_in_middle() {
        let formatted_path = format_endpoint("/hello/{world}/bye", 1);

        assert_eq!(formatted_path, "/hello/1/bye");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn api_paths_are_detected() {
        assert!(is_api_path(endpoints::CART_ITEMS));
        assert!(is_api_path(endpoints::CMS_POST_PRODUCT));
        assert!(!is_api_path(endpoints::CMS_PRODUCTS));
        assert!(!is_api_path(endpoints::HOME_VIEW));
    }
}
