//! An extractor for the logged in user, if there is one.

use std::{convert::Infallible, sync::Mutex};

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::PrivateCookieJar;
use rusqlite::Connection;

use crate::{
    Error,
    auth::{AuthState, Profile, cookie::get_token_from_cookies, get_user_by_id},
};

/// The profile of the user that sent the request, or `None` for guests.
///
/// Pages that work for both guests and customers (e.g., the navigation bar)
/// use this instead of sitting behind [crate::auth::auth_guard].
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentUser(pub Option<Profile>);

impl<S> FromRequestParts<S> for CurrentUser
where
    AuthState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // The auth guard has already done the lookup for protected routes.
        if let Some(profile) = parts.extensions.get::<Profile>() {
            return Ok(Self(Some(profile.clone())));
        }

        let state = AuthState::from_ref(state);
        let jar = PrivateCookieJar::from_headers(&parts.headers, state.cookie_key);

        match get_profile_from_cookies(&jar, &state.db_connection) {
            Ok(profile) => Ok(Self(Some(profile))),
            Err(Error::CookieMissing) => Ok(Self(None)),
            Err(error) => {
                tracing::debug!("Treating request as a guest: {error}");
                Ok(Self(None))
            }
        }
    }
}

/// Look up the user named by the token in `jar`.
///
/// # Errors
///
/// Returns:
/// - [Error::CookieMissing] if there is no token cookie,
/// - [Error::InvalidCredentials] if the token is invalid, has expired, or
///   names a user that no longer exists,
/// - [Error::DatabaseLockError] if the database lock is poisoned.
pub(crate) fn get_profile_from_cookies(
    jar: &PrivateCookieJar,
    db_connection: &Mutex<Connection>,
) -> Result<Profile, Error> {
    let token = get_token_from_cookies(jar)?;
    let connection = db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    match get_user_by_id(token.user_id, &connection) {
        Ok(user) => Ok(user.profile()),
        Err(Error::NotFound) => Err(Error::InvalidCredentials),
        Err(error) => Err(error),
    }
}
