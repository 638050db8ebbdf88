//! Guards that only let logged in users (or administrators) through, and keep
//! their session alive while they are active.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, OriginalUri, Request, State},
    http::{HeaderMap, StatusCode, Uri, header::SET_COOKIE},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use time::Duration;

use crate::{
    AppState,
    auth::{
        Profile,
        cookie::extend_auth_cookie_duration_if_needed,
        current_user::get_profile_from_cookies,
        redirect::{build_log_in_redirect_url, is_hx_request},
    },
    forbidden::get_403_forbidden_response,
};

/// The state needed for the auth middleware
#[derive(Debug, Clone)]
pub struct AuthState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// How far each request pushes out the session expiry.
    pub cookie_duration: Duration,
    /// Used to look up the role of the logged in user.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}

/// Send a guest to the log-in page, remembering where they were going.
fn redirect_to_log_in(original_uri: &Uri, headers: &HeaderMap) -> Response {
    let log_in_url = build_log_in_redirect_url(original_uri, headers);

    if is_hx_request(headers) {
        (HxRedirect(log_in_url), StatusCode::OK).into_response()
    } else {
        Redirect::to(&log_in_url).into_response()
    }
}

/// Runs `next` only for users that `is_allowed` accepts.
///
/// The user's [Profile] and [crate::UserID] are placed in the request
/// extensions, and the auth cookie in the response is extended.
async fn guard_internal(
    state: AuthState,
    request: Request,
    next: Next,
    is_allowed: impl Fn(&Profile) -> bool,
) -> Response {
    // Inside a nested router the request URI has the prefix stripped.
    let original_uri = request
        .extensions()
        .get::<OriginalUri>()
        .map(|uri| uri.0.clone())
        .unwrap_or_else(|| request.uri().clone());
    let jar = PrivateCookieJar::from_headers(request.headers(), state.cookie_key.clone());

    let profile = match get_profile_from_cookies(&jar, &state.db_connection) {
        Ok(profile) => profile,
        Err(error) => {
            tracing::debug!("Redirecting unauthenticated request for {original_uri}: {error}");
            return redirect_to_log_in(&original_uri, request.headers());
        }
    };

    if !is_allowed(&profile) {
        tracing::warn!(
            "User {} ({}) was denied access to {original_uri}",
            profile.id,
            profile.role
        );
        return get_403_forbidden_response();
    }

    let (mut parts, body) = request.into_parts();
    parts.extensions.insert(profile.id);
    parts.extensions.insert(profile);
    let response = next.run(Request::from_parts(parts, body)).await;

    let (mut parts, body) = response.into_parts();
    let jar = match extend_auth_cookie_duration_if_needed(jar.clone(), state.cookie_duration) {
        Ok(updated_jar) => updated_jar,
        Err(error) => {
            tracing::error!("Error extending cookie duration: {error}. Rolling back cookie jar.");
            jar
        }
    };
    for (key, value) in jar.into_response().headers().iter() {
        if key == SET_COOKIE {
            parts.headers.append(key, value.to_owned());
        }
    }

    Response::from_parts(parts, body)
}

/// Middleware that only lets logged in users through.
///
/// Guests are redirected to the log-in page, with an HTMX redirect for HTMX
/// requests. Handlers can extract `Extension<Profile>` or `Extension<UserID>`.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    guard_internal(state, request, next, |_| true).await
}

/// Middleware that only lets administrators through.
///
/// Guests are redirected to the log-in page like [auth_guard], while logged
/// in customers get a 403 page. Nothing behind this guard runs for a
/// rejected request.
pub async fn admin_guard(
    State(state): State<AuthState>,
    request: Request,
    next: Next,
) -> Response {
    guard_internal(state, request, next, Profile::is_admin).await
}

#[cfg(test)]
mod auth_guard_tests {
    use axum::{
        Extension, Router, http::StatusCode, middleware, response::Html, routing::get,
    };
    use axum_extra::extract::cookie::{Cookie, SameSite};
    use axum_test::TestServer;
    use time::{Duration, OffsetDateTime};

    use crate::{
        AppState, Role,
        auth::{AuthState, COOKIE_TOKEN, Profile, admin_guard, auth_guard},
        endpoints,
        test_utils::{get_test_state, insert_test_user, log_in_cookie, test_log_in_router},
    };

    async fn test_handler(Extension(profile): Extension<Profile>) -> Html<String> {
        Html(format!("<h1>Hello, {}!</h1>", profile.name))
    }

    const TEST_PROTECTED_ROUTE: &str = "/profile";
    const TEST_ADMIN_ROUTE: &str = "/cms/products";
    const TEST_API_ROUTE: &str = "/api/cart/items";

    /// `log_in_duration` sets the initial session length, the guard always
    /// extends sessions to five minutes.
    fn get_test_server(mut state: AppState, log_in_duration: Duration) -> TestServer {
        state.cookie_duration = log_in_duration;
        let auth_state = AuthState {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: Duration::minutes(5),
            db_connection: state.db_connection.clone(),
        };

        let protected = Router::new()
            .route(TEST_PROTECTED_ROUTE, get(test_handler))
            .route(TEST_API_ROUTE, get(test_handler))
            .route_layer(middleware::from_fn_with_state(auth_state.clone(), auth_guard));
        let admin = Router::new()
            .route(TEST_ADMIN_ROUTE, get(test_handler))
            .route_layer(middleware::from_fn_with_state(auth_state, admin_guard));

        let app = Router::new()
            .merge(protected)
            .merge(admin)
            .merge(test_log_in_router())
            .with_state(state);

        TestServer::try_new(app).expect("Could not create test server.")
    }

    fn log_in_location(target: &str) -> String {
        let query = serde_urlencoded::to_string([("redirect_url", target)]).unwrap();
        format!("{}?{}", endpoints::LOG_IN_VIEW, query)
    }

    #[track_caller]
    fn assert_date_time_close(left: OffsetDateTime, right: OffsetDateTime) {
        assert!(
            (left - right).abs() < Duration::seconds(1),
            "got date time {left:?}, want {right:?}"
        );
    }

    #[tokio::test]
    async fn logged_in_user_reaches_protected_route() {
        let state = get_test_state();
        insert_test_user(&state, "jane@example.com", "Jane", Role::Customer);
        let server = get_test_server(state, Duration::minutes(5));
        let cookie = log_in_cookie(&server, "jane@example.com").await;

        let response = server.get(TEST_PROTECTED_ROUTE).add_cookie(cookie).await;

        response.assert_status_ok();
        response.assert_text("<h1>Hello, Jane!</h1>");
    }

    #[tokio::test]
    async fn guard_extends_short_session() {
        let state = get_test_state();
        insert_test_user(&state, "jane@example.com", "Jane", Role::Customer);
        let server = get_test_server(state, Duration::seconds(5));
        let cookie = log_in_cookie(&server, "jane@example.com").await;
        let logged_in_at = OffsetDateTime::now_utc();
        assert_date_time_close(
            cookie.expires_datetime().unwrap(),
            logged_in_at + Duration::seconds(5),
        );

        let response = server.get(TEST_PROTECTED_ROUTE).add_cookie(cookie).await;

        let cookie = response.cookie(COOKIE_TOKEN);
        assert_date_time_close(
            cookie.expires_datetime().unwrap(),
            OffsetDateTime::now_utc() + Duration::minutes(5),
        );
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
    }

    #[tokio::test]
    async fn guest_is_redirected_to_log_in() {
        let server = get_test_server(get_test_state(), Duration::minutes(5));

        let response = server.get(TEST_PROTECTED_ROUTE).await;

        response.assert_status_see_other();
        assert_eq!(
            response.header("location"),
            log_in_location(TEST_PROTECTED_ROUTE)
        );
    }

    #[tokio::test]
    async fn invalid_cookie_is_redirected_to_log_in() {
        let server = get_test_server(get_test_state(), Duration::minutes(5));

        let response = server
            .get(TEST_PROTECTED_ROUTE)
            .add_cookie(Cookie::new(COOKIE_TOKEN, "FOOBAR"))
            .await;

        response.assert_status_see_other();
    }

    #[tokio::test]
    async fn htmx_guest_gets_hx_redirect_to_current_page() {
        let server = get_test_server(get_test_state(), Duration::minutes(5));

        let response = server
            .get(TEST_API_ROUTE)
            .add_header("HX-Request", "true")
            .add_header("HX-Current-URL", "http://localhost:3000/product/3")
            .await;

        response.assert_status_ok();
        assert_eq!(response.header("hx-redirect"), log_in_location("/product/3"));
    }

    #[tokio::test]
    async fn admin_guard_lets_admin_through() {
        let state = get_test_state();
        insert_test_user(&state, "admin@example.com", "Ada", Role::Admin);
        let server = get_test_server(state, Duration::minutes(5));
        let cookie = log_in_cookie(&server, "admin@example.com").await;

        server
            .get(TEST_ADMIN_ROUTE)
            .add_cookie(cookie)
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn admin_guard_forbids_customer() {
        let state = get_test_state();
        insert_test_user(&state, "jane@example.com", "Jane", Role::Customer);
        let server = get_test_server(state, Duration::minutes(5));
        let cookie = log_in_cookie(&server, "jane@example.com").await;

        server
            .get(TEST_ADMIN_ROUTE)
            .add_cookie(cookie)
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn admin_guard_redirects_guest() {
        let server = get_test_server(get_test_state(), Duration::minutes(5));

        let response = server.get(TEST_ADMIN_ROUTE).await;

        response.assert_status_see_other();
        assert_eq!(response.header("location"), log_in_location(TEST_ADMIN_ROUTE));
    }
}
