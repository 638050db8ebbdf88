//! Endpoints for adding products to and removing products from the cart.

use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::PrivateCookieJar;
use serde::Deserialize;

use crate::{
    Error,
    alert::Alert,
    cart::{CartStore, get_cart_id, get_or_create_cart_id, page::cart_section},
    product::ProductId,
};

#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: ProductId,
}

/// Add one of the product to the visitor's cart, creating the cart if needed.
///
/// Responds with an alert fragment. Subscribers to the cart, such as the
/// navigation bar's counter, are sent the new contents.
pub async fn add_to_cart_endpoint(
    State(cart_store): State<CartStore>,
    jar: PrivateCookieJar,
    Form(form): Form<AddToCartForm>,
) -> Response {
    let (jar, cart_id) = get_or_create_cart_id(jar);

    match cart_store.add_product(cart_id, form.product_id) {
        Ok(items) => {
            let title = items
                .iter()
                .find(|item| item.product.id == form.product_id)
                .map(|item| item.product.title.clone())
                .unwrap_or_default();
            tracing::debug!("Added product {} to cart {cart_id}", form.product_id);

            (
                jar,
                Alert::success("Added to cart:", &title).into_response_with_status(StatusCode::OK),
            )
                .into_response()
        }
        Err(Error::NotFound) => Error::NotFound.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "Could not add product {} to cart {cart_id}: {error}",
                form.product_id
            );
            error.into_alert_response()
        }
    }
}

/// Remove a product from the visitor's cart and render the updated cart.
pub async fn remove_from_cart_endpoint(
    Path(product_id): Path<ProductId>,
    State(cart_store): State<CartStore>,
    jar: PrivateCookieJar,
) -> Response {
    let Some(cart_id) = get_cart_id(&jar) else {
        return Error::RemoveMissingCartItem.into_alert_response();
    };

    match cart_store.remove_product(cart_id, product_id) {
        Ok(items) => cart_section(&items).into_response(),
        Err(error) => error.into_alert_response(),
    }
}

#[cfg(test)]
mod add_to_cart_tests {
    use axum::{Router, http::StatusCode, routing::post};
    use axum_test::TestServer;
    use scraper::{Html, Selector};

    use crate::{
        AppState,
        cart::{COOKIE_CART, CartId, add_to_cart_endpoint},
        endpoints,
        test_utils::{cart_cookie, get_test_state, seed_catalog},
    };

    fn get_test_server(state: AppState) -> TestServer {
        let app = Router::new()
            .route(endpoints::CART_ITEMS, post(add_to_cart_endpoint))
            .with_state(state);

        TestServer::try_new(app).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn adds_to_existing_cart() {
        let state = get_test_state();
        let (_, products) = seed_catalog(&state);
        let cart_id = CartId::new();
        let server = get_test_server(state.clone());

        let response = server
            .post(endpoints::CART_ITEMS)
            .add_cookie(cart_cookie(&state, cart_id))
            .form(&[("product_id", products[1].id)])
            .await;

        response.assert_status_ok();
        let html = Html::parse_fragment(&response.text());
        let alert = html
            .select(&Selector::parse("div[role=alert]").unwrap())
            .next()
            .expect("No alert found")
            .text()
            .collect::<String>();
        assert!(alert.contains("Earl Grey"), "got {alert:?}");
        let items = state.cart_store.items(cart_id).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product.id, products[1].id);
    }

    #[tokio::test]
    async fn new_visitor_keeps_cart_across_requests() {
        let state = get_test_state();
        let (_, products) = seed_catalog(&state);
        let server = get_test_server(state.clone());

        let first_response = server
            .post(endpoints::CART_ITEMS)
            .form(&[("product_id", products[0].id)])
            .await;
        first_response.assert_status_ok();
        let cookie = first_response.cookie(COOKIE_CART);

        server
            .post(endpoints::CART_ITEMS)
            .add_cookie(cookie)
            .form(&[("product_id", products[0].id)])
            .await
            .assert_status_ok();

        let connection = state.db_connection.lock().unwrap();
        let rows = connection
            .prepare("SELECT cart_id, quantity FROM cart_item")
            .unwrap()
            .query_map((), |row| Ok((row.get::<_, String>(0)?, row.get::<_, u32>(1)?)))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(rows.len(), 1, "Both requests should use the same cart");
        assert_eq!(rows[0].1, 2);
    }

    #[tokio::test]
    async fn unknown_product_returns_not_found_alert() {
        let state = get_test_state();
        let server = get_test_server(state);

        let response = server
            .post(endpoints::CART_ITEMS)
            .form(&[("product_id", 999)])
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
        assert!(response.text().contains("Not found"));
    }
}
