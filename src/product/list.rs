//! The CMS page listing every product.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints,
    category::{CategoryId, CategoryName, get_all_categories},
    html::{
        CATEGORY_BADGE_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, delete_button, format_currency,
    },
    navigation::NavBar,
    product::{Product, get_all_products},
};

/// The state needed for the products listing page.
#[derive(Debug, Clone)]
pub struct ProductsPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ProductsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the table of products with their categories.
pub async fn get_products_page(
    State(state): State<ProductsPageState>,
    nav_bar: NavBar,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let products = get_all_products(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve products: {error}"))?;
    let category_names = get_all_categories(&connection)?
        .into_iter()
        .map(|category| (category.id, category.name))
        .collect::<HashMap<_, _>>();

    Ok(products_view(nav_bar, &products, &category_names).into_response())
}

fn products_view(
    nav_bar: NavBar,
    products: &[Product],
    category_names: &HashMap<CategoryId, CategoryName>,
) -> Markup {
    let table_row = |product: &Product| {
        let delete_url = endpoints::format_endpoint(endpoints::CMS_DELETE_PRODUCT, product.id);
        let confirm_message = format!(
            "Are you sure you want to delete '{}'? It will be removed from every cart.",
            product.title
        );

        html!(
            tr class=(TABLE_ROW_STYLE)
            {
                td class=(TABLE_CELL_STYLE) { (product.title) }

                td class=(TABLE_CELL_STYLE)
                {
                    @if let Some(name) = category_names.get(&product.category_id) {
                        span class=(CATEGORY_BADGE_STYLE) { (name) }
                    }
                }

                td class=(TABLE_CELL_STYLE) { (format_currency(product.price)) }

                td class=(TABLE_CELL_STYLE)
                {
                    (delete_button(&delete_url, &confirm_message, "closest tr"))
                }
            }
        )
    };

    let content = html!(
        (nav_bar.into_html())

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full max-w-4xl"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Products" }

                    a href=(endpoints::CMS_NEW_PRODUCT) class=(LINK_STYLE)
                    {
                        "Create Product"
                    }
                }

                div class="relative overflow-x-auto shadow-md rounded"
                {
                    table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Title" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Price" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for product in products {
                                (table_row(product))
                            }

                            @if products.is_empty() {
                                tr
                                {
                                    td colspan="4" class="px-6 py-4 text-center"
                                    {
                                        "No products yet."
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    );

    base("Products", &[], &content)
}
