//! Middleware for logging requests and responses.

use axum::{
    body::{Body, Bytes},
    extract::Request,
    http::{HeaderMap, header::CONTENT_TYPE},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::internal_server_error::InternalServerError;

/// Bodies longer than this many characters are truncated in the `info` log.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// The form fields whose values never appear in the logs.
const REDACTED_FIELDS: [&str; 3] = ["password", "confirm_password", "new_password"];

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If the body is longer than [LOG_BODY_LENGTH_LIMIT] characters, it is
/// truncated and the full body is logged at the `debug` level.
/// Password fields in submitted forms are redacted. Event streams are passed
/// through without reading their body since they do not end.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body_bytes = match read_body(body).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("Could not read the request body: {error}");
            return InternalServerError::default().into_response();
        }
    };
    let body_text = String::from_utf8_lossy(&body_bytes);

    if is_form(&parts.headers) {
        let display_text = REDACTED_FIELDS
            .iter()
            .fold(body_text.to_string(), |text, field| redact_password(&text, field));
        log_request(&parts, &display_text);
    } else {
        log_request(&parts, &body_text);
    }

    let request = Request::from_parts(parts, Body::from(body_bytes));
    let response = next.run(request).await;

    if is_event_stream(response.headers()) {
        tracing::info!("Sending event stream: {:#?}", response.headers());
        return response;
    }

    let (parts, body) = response.into_parts();
    let body_bytes = match read_body(body).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("Could not read the response body: {error}");
            return InternalServerError::default().into_response();
        }
    };
    log_response(&parts, &String::from_utf8_lossy(&body_bytes));

    Response::from_parts(parts, Body::from(body_bytes))
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"))
}

fn is_event_stream(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("text/event-stream"))
}

fn redact_password(form_text: &str, field_name: &str) -> String {
    form_text
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((key, _)) if key == field_name => format!("{field_name}=********"),
            _ => pair.to_owned(),
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Buffer the whole body. Only the logged copy is decoded as text, so binary
/// bodies reach the handler and the client unchanged.
async fn read_body(body: Body) -> Result<Bytes, axum::Error> {
    axum::body::to_bytes(body, usize::MAX).await
}

/// The first [LOG_BODY_LENGTH_LIMIT] characters of `body`, or `None` if it
/// is short enough to log in full.
fn truncate(body: &str) -> Option<&str> {
    body.char_indices()
        .nth(LOG_BODY_LENGTH_LIMIT)
        .map(|(end, _)| &body[..end])
}

fn log_request(parts: &axum::http::request::Parts, body: &str) {
    match truncate(body) {
        Some(truncated) => {
            tracing::info!("Received request: {parts:#?}\nbody: {truncated}...");
            tracing::debug!("Full request body: {body:?}");
        }
        None => tracing::info!("Received request: {parts:#?}\nbody: {body:?}"),
    }
}

fn log_response(parts: &axum::http::response::Parts, body: &str) {
    match truncate(body) {
        Some(truncated) => {
            tracing::info!("Sending response: {parts:#?}\nbody: {truncated}...");
            tracing::debug!("Full response body: {body:?}");
        }
        None => tracing::info!("Sending response: {parts:#?}\nbody: {body:?}"),
    }
}

#[cfg(test)]
mod logging_tests {
    use axum::{
        Router,
        body::Bytes,
        http::header::CONTENT_TYPE,
        middleware,
        response::sse::{Event, KeepAlive, Sse},
        routing::{get, post},
    };
    use axum_test::TestServer;
    use futures::{StreamExt, stream};

    use super::{LOG_BODY_LENGTH_LIMIT, logging_middleware, redact_password, truncate};

    #[test]
    fn redacts_only_the_named_field() {
        let form = "email=a%40b.com&password=hunter2&confirm_password=hunter2";

        let redacted = redact_password(form, "password");

        assert_eq!(
            redacted,
            "email=a%40b.com&password=********&confirm_password=hunter2"
        );
    }

    #[test]
    fn redacts_field_at_end_of_form() {
        assert_eq!(
            redact_password("remember_me=on&password=abc", "password"),
            "remember_me=on&password=********"
        );
    }

    #[test]
    fn leaves_forms_without_the_field_alone() {
        assert_eq!(redact_password("name=Tea", "password"), "name=Tea");
    }

    #[test]
    fn truncates_on_character_boundaries() {
        let short = "a".repeat(LOG_BODY_LENGTH_LIMIT);
        let long = "é".repeat(LOG_BODY_LENGTH_LIMIT + 1);

        assert_eq!(truncate(&short), None);
        assert_eq!(
            truncate(&long),
            Some("é".repeat(LOG_BODY_LENGTH_LIMIT).as_str())
        );
    }

    #[tokio::test]
    async fn passes_bodies_through_unchanged() {
        let app = Router::new()
            .route("/echo", post(|body: String| async move { body }))
            .layer(middleware::from_fn(logging_middleware));
        let server = TestServer::try_new(app).expect("Could not create test server.");

        let response = server
            .post("/echo")
            .form(&[("email", "a@b.com"), ("password", "hunter2")])
            .await;

        response.assert_status_ok();
        response.assert_text("email=a%40b.com&password=hunter2");
    }

    #[tokio::test]
    async fn binary_bodies_are_not_altered() {
        let png_header = vec![137u8, 80, 78, 71, 255, 254, 0, 128];
        let app = Router::new()
            .route(
                "/echo",
                post(|body: Bytes| async move { ([(CONTENT_TYPE, "image/png")], body) }),
            )
            .layer(middleware::from_fn(logging_middleware));
        let server = TestServer::try_new(app).expect("Could not create test server.");

        let response = server
            .post("/echo")
            .bytes(Bytes::from(png_header.clone()))
            .await;

        response.assert_status_ok();
        assert_eq!(response.as_bytes().to_vec(), png_header);
    }

    #[tokio::test]
    async fn does_not_buffer_event_streams() {
        let app = Router::new()
            .route(
                "/events",
                get(|| async {
                    let events = stream::iter([Ok::<_, std::convert::Infallible>(
                        Event::default().data("hello"),
                    )])
                    .chain(stream::pending());
                    Sse::new(events).keep_alive(KeepAlive::default())
                }),
            )
            .layer(middleware::from_fn(logging_middleware));

        let response = tower::ServiceExt::oneshot(
            app,
            axum::http::Request::get("/events")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

        assert_eq!(
            response.headers()["content-type"],
            "text/event-stream"
        );
    }
}
