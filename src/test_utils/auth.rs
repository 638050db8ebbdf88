use axum::{
    Form, Router,
    extract::State,
    response::{IntoResponse, Response},
    routing::post,
};
use axum_extra::extract::{PrivateCookieJar, cookie::Cookie};
use axum_test::TestServer;
use serde::Deserialize;

use crate::{
    AppState, Email,
    auth::{COOKIE_TOKEN, get_user_by_email, set_auth_cookie},
};

const TEST_LOG_IN_ROUTE: &str = "/test/log_in";

#[derive(Deserialize)]
struct TestLogIn {
    email: String,
}

/// Logs in as any user without a password.
async fn stub_log_in(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Form(form): Form<TestLogIn>,
) -> Response {
    let user = get_user_by_email(
        &Email::new(&form.email).unwrap(),
        &state.db_connection.lock().unwrap(),
    )
    .expect("Test user does not exist");

    set_auth_cookie(jar, user.id, state.cookie_duration)
        .unwrap()
        .into_response()
}

pub(crate) fn test_log_in_router() -> Router<AppState> {
    Router::new().route(TEST_LOG_IN_ROUTE, post(stub_log_in))
}

/// The encrypted auth cookie for `email`, via [test_log_in_router].
pub(crate) async fn log_in_cookie(server: &TestServer, email: &str) -> Cookie<'static> {
    server
        .post(TEST_LOG_IN_ROUTE)
        .form(&[("email", email)])
        .await
        .cookie(COOKIE_TOKEN)
}
