//! The storefront page listing the products in one category.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::html;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    category::{CategoryId, get_category},
    html::{PAGE_CONTAINER_STYLE, base},
    navigation::NavBar,
    product::{get_products_by_category, product_cards},
};

/// The state needed for the category page.
#[derive(Debug, Clone)]
pub struct CategoryPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CategoryPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the products in a category ordered by title.
///
/// Unknown category IDs get the 404 page.
pub async fn get_category_page(
    Path(category_id): Path<CategoryId>,
    State(state): State<CategoryPageState>,
    nav_bar: NavBar,
) -> Result<Response, Error> {
    let (category, products) = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        let category = get_category(category_id, &connection)?;
        let products = get_products_by_category(category_id, &connection)?;

        (category, products)
    };

    let content = html!(
        (nav_bar.into_html())

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full max-w-screen-xl space-y-4"
            {
                h1 class="text-2xl font-bold" { (category.name) }

                (product_cards(&products))
            }
        }
    );

    Ok(base(category.name.as_ref(), &[], &content).into_response())
}
