//! Product creation page and endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    category::{Category, get_all_categories},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        base, link,
    },
    navigation::NavBar,
    product::{NewProduct, ProductFormData, create_product},
};

/// The state needed for the product creation page and endpoint.
#[derive(Debug, Clone)]
pub struct CreateProductState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateProductState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the product creation page.
pub async fn get_new_product_page(
    State(state): State<CreateProductState>,
    nav_bar: NavBar,
) -> Result<Response, Error> {
    let categories = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_all_categories(&connection)?
    };

    let content = html! {
        (nav_bar.into_html())
        div class=(FORM_CONTAINER_STYLE) { (new_product_form_view(&categories, "")) }
    };

    Ok(base("Create Product", &[], &content).into_response())
}

/// Handle product creation form submission.
pub async fn create_product_endpoint(
    State(state): State<CreateProductState>,
    Form(form): Form<ProductFormData>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let new_product =
        match NewProduct::new(&form.title, &form.description, form.price, form.category_id) {
            Ok(new_product) => new_product,
            Err(error) => {
                let categories = get_all_categories(&connection).unwrap_or_default();
                return new_product_form_view(&categories, &format!("Error: {error}"))
                    .into_response();
            }
        };

    match create_product(new_product, &connection) {
        Ok(product) => {
            tracing::info!("Created product {} ({})", product.id, product.title);
            (
                HxRedirect(endpoints::CMS_PRODUCTS.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(Error::InvalidCategory) => Error::InvalidCategory.into_alert_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a product: {error}");
            error.into_alert_response()
        }
    }
}

fn new_product_form_view(categories: &[Category], error_message: &str) -> Markup {
    if categories.is_empty() {
        return html! {
            p
            {
                "Products need a category. "
                (link(endpoints::CMS_NEW_CATEGORY, "Create a category"))
                " first."
            }
        };
    }

    html! {
        form
            hx-post=(endpoints::CMS_POST_PRODUCT)
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            div
            {
                label for="title" class=(FORM_LABEL_STYLE) { "Title" }

                input
                    id="title"
                    type="text"
                    name="title"
                    placeholder="Product Title"
                    required
                    autofocus
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="description" class=(FORM_LABEL_STYLE) { "Description" }

                textarea
                    id="description"
                    name="description"
                    rows="3"
                    class=(FORM_TEXT_INPUT_STYLE)
                {}
            }

            div
            {
                label for="price" class=(FORM_LABEL_STYLE) { "Price" }

                input
                    id="price"
                    type="number"
                    name="price"
                    min="0"
                    step="0.01"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="category_id" class=(FORM_LABEL_STYLE) { "Category" }

                select id="category_id" name="category_id" required class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for category in categories {
                        option value=(category.id) { (category.name) }
                    }
                }
            }

            @if !error_message.is_empty() {
                p class="text-red-500 text-base"
                {
                    (error_message)
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Create Product" }
        }
    }
}
