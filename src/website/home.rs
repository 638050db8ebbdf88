//! The storefront landing page with the whole product catalogue.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Redirect, Response},
};
use maud::html;
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints,
    html::{PAGE_CONTAINER_STYLE, base},
    navigation::NavBar,
    product::{get_all_products, product_cards},
};

/// The state needed for the home page.
#[derive(Debug, Clone)]
pub struct HomePageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for HomePageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The root path '/' redirects to the home page.
pub async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::HOME_VIEW)
}

/// Render every product in the catalogue, oldest first.
pub async fn get_home_page(
    State(state): State<HomePageState>,
    nav_bar: NavBar,
) -> Result<Response, Error> {
    let products = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_all_products(&connection)
            .inspect_err(|error| tracing::error!("Failed to retrieve products: {error}"))?
    };

    let content = html!(
        (nav_bar.into_html())

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full max-w-screen-xl space-y-4"
            {
                h1 class="text-2xl font-bold" { "All products" }

                (product_cards(&products))
            }
        }
    );

    Ok(base("Home", &[], &content).into_response())
}

#[cfg(test)]
mod home_page_tests {
    use axum::{Router, response::IntoResponse, routing::get};
    use axum_test::TestServer;
    use scraper::{Html, Selector};

    use crate::{
        endpoints,
        test_utils::{assert_redirect, assert_valid_html, get_test_state, seed_catalog},
    };

    use super::{get_home_page, get_index_page};

    #[tokio::test]
    async fn root_redirects_to_home() {
        let response = get_index_page().await.into_response();

        assert_redirect(&response, endpoints::HOME_VIEW);
    }

    #[tokio::test]
    async fn lists_all_products_oldest_first() {
        let state = get_test_state();
        seed_catalog(&state);
        let app = Router::new()
            .route(endpoints::HOME_VIEW, get(get_home_page))
            .with_state(state);
        let server = TestServer::try_new(app).expect("Could not create test server.");

        let response = server.get(endpoints::HOME_VIEW).await;

        response.assert_status_ok();
        let html = Html::parse_document(&response.text());
        assert_valid_html(&html);
        let titles = html
            .select(&Selector::parse("[data-product-id] h2").unwrap())
            .map(|title| title.text().collect::<String>().trim().to_owned())
            .collect::<Vec<_>>();
        assert_eq!(titles, ["Sencha", "Earl Grey", "Espresso Roast", "Decaf"]);
    }

    #[tokio::test]
    async fn empty_catalogue_shows_placeholder() {
        let app = Router::new()
            .route(endpoints::HOME_VIEW, get(get_home_page))
            .with_state(get_test_state());
        let server = TestServer::try_new(app).expect("Could not create test server.");

        let response = server.get(endpoints::HOME_VIEW).await;

        response.assert_status_ok();
        assert!(response.text().contains("No products yet."));
    }
}
