//! The CMS landing page.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::html;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    category::count_categories,
    endpoints,
    html::{LINK_STYLE, PAGE_CONTAINER_STYLE, base},
    navigation::NavBar,
    product::count_products,
};

/// The state needed for the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render how many categories and products the store has, with links to
/// manage each.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    nav_bar: NavBar,
) -> Result<Response, Error> {
    let (category_count, product_count) = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        (count_categories(&connection)?, count_products(&connection)?)
    };

    let summary_card = |title: &str, count: i64, url: &str, data_name: &str| {
        html!(
            a
                href=(url)
                class="block p-6 bg-white border border-gray-200 rounded-lg shadow
                hover:bg-gray-100 dark:bg-gray-800 dark:border-gray-700 dark:hover:bg-gray-700"
            {
                h2 class="text-lg font-semibold" { (title) }
                p class="text-3xl font-bold" data-count=(data_name) { (count) }
            }
        )
    };

    let content = html!(
        (nav_bar.into_html())

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full max-w-2xl space-y-4"
            {
                h1 class="text-xl font-bold" { "Dashboard" }

                div class="grid gap-4 sm:grid-cols-2"
                {
                    (summary_card("Categories", category_count, endpoints::CMS_CATEGORIES, "categories"))
                    (summary_card("Products", product_count, endpoints::CMS_PRODUCTS, "products"))
                }

                div class="flex gap-4"
                {
                    a href=(endpoints::CMS_NEW_CATEGORY) class=(LINK_STYLE) { "New category" }
                    a href=(endpoints::CMS_NEW_PRODUCT) class=(LINK_STYLE) { "New product" }
                }
            }
        }
    );

    Ok(base("Dashboard", &[], &content).into_response())
}
