//! The storefront page for a single product, and the product cards shared by
//! the catalogue pages.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    category::get_category,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, CATEGORY_BADGE_STYLE, PAGE_CONTAINER_STYLE, base, format_currency,
        link,
    },
    navigation::NavBar,
    product::{Product, ProductId, get_product},
};

/// The state needed for the product page.
#[derive(Debug, Clone)]
pub struct ProductPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ProductPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render a product with its price, category and an "Add to cart" button.
///
/// Unknown product IDs get the 404 page.
pub async fn get_product_page(
    Path(product_id): Path<ProductId>,
    State(state): State<ProductPageState>,
    nav_bar: NavBar,
) -> Result<Response, Error> {
    let (product, category) = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        let product = get_product(product_id, &connection)?;
        let category = get_category(product.category_id, &connection)?;

        (product, category)
    };

    let category_url = endpoints::format_endpoint(endpoints::CATEGORY_VIEW, category.id);

    let content = html!(
        (nav_bar.into_html())

        main class=(PAGE_CONTAINER_STYLE)
        {
            article class="w-full max-w-2xl space-y-4"
            {
                a href=(category_url) class=(CATEGORY_BADGE_STYLE) { (category.name) }

                h1 class="text-3xl font-bold" { (product.title) }

                p class="text-2xl font-semibold" data-price { (format_currency(product.price)) }

                @if !product.description.is_empty() {
                    p class="text-gray-700 dark:text-gray-300" { (product.description) }
                }

                (add_to_cart_form(&product))
            }
        }
    );

    Ok(base(&product.title, &[], &content).into_response())
}

fn add_to_cart_form(product: &Product) -> Markup {
    html!(
        form
            hx-post=(endpoints::CART_ITEMS)
            hx-target="#alert-container"
            hx-target-error="#alert-container"
            class="max-w-xs"
        {
            input type="hidden" name="product_id" value=(product.id);

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add to cart" }
        }
    )
}

/// A grid of product cards, each linking to its product page.
pub fn product_cards(products: &[Product]) -> Markup {
    html!(
        @if products.is_empty() {
            p class="text-gray-500 dark:text-gray-400" { "No products yet." }
        } @else {
            ul class="grid gap-4 sm:grid-cols-2 lg:grid-cols-3 w-full"
            {
                @for product in products {
                    li
                        class="p-4 bg-white border border-gray-200 rounded-lg shadow
                        dark:bg-gray-800 dark:border-gray-700 space-y-2"
                        data-product-id=(product.id)
                    {
                        h2 class="text-lg font-semibold"
                        {
                            (link(
                                &endpoints::format_endpoint(endpoints::PRODUCT_VIEW, product.id),
                                &product.title,
                            ))
                        }

                        p { (format_currency(product.price)) }

                        (add_to_cart_form(product))
                    }
                }
            }
        }
    )
}

#[cfg(test)]
mod product_page_tests {
    use axum::{Router, http::StatusCode, routing::get};
    use axum_test::TestServer;
    use scraper::{Html, Selector};

    use crate::{
        AppState, endpoints,
        product::get_product_page,
        test_utils::{
            assert_form_input, assert_hx_endpoint, assert_valid_html, get_test_state,
            must_get_form, seed_catalog,
        },
    };

    fn get_test_server(state: AppState) -> TestServer {
        let app = Router::new()
            .route(endpoints::PRODUCT_VIEW, get(get_product_page))
            .with_state(state);

        TestServer::try_new(app).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn renders_product() {
        let state = get_test_state();
        let (categories, products) = seed_catalog(&state);
        let server = get_test_server(state);

        let response = server
            .get(&endpoints::format_endpoint(endpoints::PRODUCT_VIEW, products[3].id))
            .await;

        response.assert_status_ok();
        let html = Html::parse_document(&response.text());
        assert_valid_html(&html);
        let title = html
            .select(&Selector::parse("h1").unwrap())
            .next()
            .expect("No title found")
            .text()
            .collect::<String>();
        assert_eq!(title, "Decaf");
        let price = html
            .select(&Selector::parse("[data-price]").unwrap())
            .next()
            .unwrap()
            .text()
            .collect::<String>();
        assert_eq!(price, "$15.25");
        let badge = html
            .select(&Selector::parse("article > a").unwrap())
            .next()
            .unwrap();
        assert_eq!(
            badge.value().attr("href"),
            Some(endpoints::format_endpoint(endpoints::CATEGORY_VIEW, categories[1].id).as_str())
        );
        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::CART_ITEMS, "hx-post");
        assert_form_input(&form, "product_id", "hidden");
    }

    #[tokio::test]
    async fn unknown_product_is_not_found() {
        let server = get_test_server(get_test_state());

        let response = server
            .get(&endpoints::format_endpoint(endpoints::PRODUCT_VIEW, 42))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
    }
}
