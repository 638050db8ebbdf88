//! The cart page.

use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use axum_extra::extract::PrivateCookieJar;
use maud::{Markup, html};

use crate::{
    cart::{CartItem, CartStore, cart_total, get_cart_id},
    endpoints,
    html::{
        BUTTON_DELETE_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, format_currency, link,
    },
    navigation::NavBar,
};

pub(crate) const CART_SECTION_ID: &str = "cart";

/// Render the visitor's cart with line totals and the grand total.
pub async fn get_cart_page(
    State(cart_store): State<CartStore>,
    nav_bar: NavBar,
    jar: PrivateCookieJar,
) -> Response {
    let items = match get_cart_id(&jar) {
        Some(cart_id) => match cart_store.items(cart_id) {
            Ok(items) => items,
            Err(error) => {
                tracing::error!("Could not load cart {cart_id}: {error}");
                return error.into_response();
            }
        },
        None => Vec::new(),
    };

    let content = html!(
        (nav_bar.into_html())

        main class=(PAGE_CONTAINER_STYLE)
        {
            (cart_section(&items))
        }
    );

    base("Cart", &[], &content).into_response()
}

/// The cart table, swapped in place when an item is removed.
pub(crate) fn cart_section(items: &[CartItem]) -> Markup {
    let table_row = |item: &CartItem| {
        let product_url = endpoints::format_endpoint(endpoints::PRODUCT_VIEW, item.product.id);
        let remove_url = endpoints::format_endpoint(endpoints::CART_ITEM, item.product.id);

        html!(
            tr class=(TABLE_ROW_STYLE)
            {
                td class=(TABLE_CELL_STYLE) { (link(&product_url, &item.product.title)) }
                td class=(TABLE_CELL_STYLE) { (format_currency(item.product.price)) }
                td class=(TABLE_CELL_STYLE) data-quantity { (item.quantity) }
                td class=(TABLE_CELL_STYLE) data-line-total { (format_currency(item.line_total())) }
                td class=(TABLE_CELL_STYLE)
                {
                    button
                        type="button"
                        hx-delete=(remove_url)
                        hx-target={"#" (CART_SECTION_ID)}
                        hx-target-error="#alert-container"
                        hx-swap="outerHTML"
                        class=(BUTTON_DELETE_STYLE)
                    {
                        "Remove"
                    }
                }
            }
        )
    };

    html!(
        section id=(CART_SECTION_ID) class="w-full max-w-4xl space-y-4"
        {
            h1 class="text-xl font-bold" { "Your Cart" }

            @if items.is_empty() {
                p
                {
                    "Your cart is empty. "
                    a href=(endpoints::HOME_VIEW) class=(LINK_STYLE) { "Keep shopping" }
                }
            } @else {
                div class="relative overflow-x-auto shadow-md rounded"
                {
                    table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Product" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Price" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Quantity" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Total" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for item in items {
                                (table_row(item))
                            }
                        }

                        tfoot
                        {
                            tr class="font-semibold text-gray-900 dark:text-white"
                            {
                                th scope="row" colspan="3" class=(TABLE_CELL_STYLE) { "Total" }
                                td class=(TABLE_CELL_STYLE) data-cart-total
                                {
                                    (format_currency(cart_total(items)))
                                }
                                td {}
                            }
                        }
                    }
                }
            }
        }
    )
}
