//! Product deletion endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::Response,
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    alert::Alert,
    cart::CartStore,
    product::{ProductId, delete_product},
};

/// The state needed for deleting a product.
#[derive(Debug, Clone)]
pub struct DeleteProductState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// Told about the cart entries removed with the product.
    pub cart_store: CartStore,
}

impl FromRef<AppState> for DeleteProductState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            cart_store: state.cart_store.clone(),
        }
    }
}

/// Handle product deletion. Returns success alert or error.
pub async fn delete_product_endpoint(
    Path(product_id): Path<ProductId>,
    State(state): State<DeleteProductState>,
) -> Response {
    let result = match state.db_connection.lock() {
        Ok(connection) => delete_product(product_id, &connection),
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match result {
        Ok(()) => {
            tracing::info!("Deleted product {product_id}");
            if let Err(error) = state.cart_store.refresh_subscribers() {
                tracing::error!("Could not refresh carts after deleting a product: {error}");
            }
            Alert::success("Product deleted successfully", "")
                .into_response_with_status(StatusCode::OK)
        }
        Err(Error::DeleteMissingProduct) => Error::DeleteMissingProduct.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while deleting product {product_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod delete_product_endpoint_tests {
    use axum::{
        extract::{FromRef, Path, State},
        http::StatusCode,
    };

    use crate::{
        product::{count_products, delete_product_endpoint},
        test_utils::{
            assert_valid_html, get_header, get_test_state, parse_html_fragment, seed_catalog,
        },
    };

    use super::DeleteProductState;

    #[tokio::test]
    async fn delete_product_endpoint_succeeds() {
        let app_state = get_test_state();
        let (_, products) = seed_catalog(&app_state);
        let state = DeleteProductState::from_ref(&app_state);

        let response = delete_product_endpoint(Path(products[0].id), State(state)).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            count_products(&app_state.db_connection.lock().unwrap()),
            Ok(products.len() as i64 - 1)
        );
    }

    #[tokio::test]
    async fn delete_missing_product_returns_error_html() {
        let app_state = get_test_state();
        let state = DeleteProductState::from_ref(&app_state);

        let response = delete_product_endpoint(Path(999), State(state)).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            get_header(&response, "content-type"),
            "text/html; charset=utf-8"
        );
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        assert!(html.html().contains("Could not delete product"));
    }
}
