//! A small e-commerce storefront.
//!
//! The storefront bundle serves the product catalogue, the cart and the
//! customer account pages. The CMS bundle under `/cms` lets administrators
//! manage categories and products. Both bundles are loaded lazily the first
//! time a request reaches them, and the CMS bundle sits behind an admin guard.
//!
//! This library provides a REST API that directly serves HTML pages.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod alert;
mod app_state;
mod auth;
mod cart;
mod category;
mod cms;
mod db;
mod endpoints;
mod forbidden;
mod html;
mod internal_server_error;
mod lazy_module;
mod logging;
mod navigation;
mod not_found;
mod product;
mod routing;
mod website;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use auth::{Email, PasswordHash, Role, User, UserID, ValidatedPassword, create_user};
pub use category::{CategoryName, create_category};
pub use db::initialize as initialize_db;
pub use lazy_module::{LazyModule, Loader};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use product::{NewProduct, create_product};
pub use routing::{RouteTable, build_router};

use crate::{
    alert::Alert, internal_server_error::InternalServerError,
    not_found::get_404_not_found_response,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("Could not install the Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::error!("Could not install the terminate signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The email and password combination did not match a registered user.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The auth token cookie is missing from the cookie jar in the request.
    #[error("no cookies in the cookie jar :(")]
    CookieMissing,

    /// Extending the auth cookie would overflow the expiry date time.
    #[error("the auth cookie expiry could not be extended")]
    CookieExpiryOverflow,

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// The two passwords entered during registration do not match.
    #[error("passwords do not match")]
    PasswordsDoNotMatch,

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The string is not a valid email address.
    #[error("\"{0}\" is not a valid email address")]
    InvalidEmail(String),

    /// The email address is already used by another account.
    #[error("the email address is already registered")]
    DuplicateEmail,

    /// A user's display name was empty.
    #[error("Name cannot be empty")]
    EmptyUserName,

    /// The role stored for a user is not a known role.
    #[error("\"{0}\" is not a valid role")]
    InvalidRole(String),

    /// An empty string was used to create a category name.
    #[error("Category name cannot be empty")]
    EmptyCategoryName,

    /// The category name is already used by another category.
    #[error("a category with that name already exists")]
    DuplicateCategoryName,

    /// The category ID used to create a product did not match a valid category.
    #[error("the category ID does not refer to a valid category")]
    InvalidCategory,

    /// An empty string was used as a product title.
    #[error("Product title cannot be empty")]
    EmptyProductTitle,

    /// A product price was negative or not a finite number.
    #[error("{0} is not a valid price")]
    InvalidPrice(f64),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// Could not acquire the lock guarding the cart subscriptions
    #[error("could not acquire the cart subscription lock")]
    SubscriptionLockError,

    /// The cart channel was closed while a subscriber was waiting on it.
    #[error("the cart channel has closed")]
    CartChannelClosed,

    /// Tried to delete a category that does not exist
    #[error("tried to delete a category that is not in the database")]
    DeleteMissingCategory,

    /// Tried to delete a product that does not exist
    #[error("tried to delete a product that is not in the database")]
    DeleteMissingProduct,

    /// Tried to remove a product that is not in the cart
    #[error("tried to remove a product that is not in the cart")]
    RemoveMissingCartItem,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("user.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("category.name") =>
            {
                Error::DuplicateCategoryName
            }
            // Code 787 occurs when a FOREIGN KEY constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(_))
                if sql_error.extended_code == 787 =>
            {
                Error::InvalidCategory
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::DatabaseLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    fn into_alert_response(self) -> Response {
        match self {
            Error::NotFound => Alert::error(
                "Not found",
                "The item could not be found. Try refreshing the page.",
            )
            .into_response_with_status(StatusCode::NOT_FOUND),
            Error::InvalidCategory => Alert::error(
                "Invalid category",
                "The selected category does not exist. Try refreshing the page.",
            )
            .into_response_with_status(StatusCode::BAD_REQUEST),
            Error::DuplicateCategoryName => Alert::error(
                "Duplicate category name",
                "A category with that name already exists. Choose a different name.",
            )
            .into_response_with_status(StatusCode::BAD_REQUEST),
            Error::DeleteMissingCategory => Alert::error(
                "Could not delete category",
                "The category could not be found. \
                Try refreshing the page to see if the category has already been deleted.",
            )
            .into_response_with_status(StatusCode::NOT_FOUND),
            Error::DeleteMissingProduct => Alert::error(
                "Could not delete product",
                "The product could not be found. \
                Try refreshing the page to see if the product has already been deleted.",
            )
            .into_response_with_status(StatusCode::NOT_FOUND),
            Error::RemoveMissingCartItem => Alert::error(
                "Could not remove item",
                "The product is no longer in your cart. Try refreshing the page.",
            )
            .into_response_with_status(StatusCode::NOT_FOUND),
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                Alert::error(
                    "Something went wrong",
                    "An unexpected error occurred, check the server logs for more details.",
                )
                .into_response_with_status(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}
