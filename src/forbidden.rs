//! The page to display when a logged in user may not access a page.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::html::error_view;

pub fn get_403_forbidden_response() -> Response {
    (
        StatusCode::FORBIDDEN,
        Html(
            error_view(
                "Forbidden",
                "403",
                "Access denied.",
                "This area is for store administrators only.",
            )
            .into_string(),
        ),
    )
        .into_response()
}
