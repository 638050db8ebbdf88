//! The private cookie that remembers which cart belongs to a browser.

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use time::Duration;

use crate::cart::CartId;

pub(crate) const COOKIE_CART: &str = "cart";

/// How long a browser keeps its cart without visiting.
pub const CART_COOKIE_DURATION: Duration = Duration::days(30);

/// The cart ID stored in `jar`, if there is a valid one.
pub fn get_cart_id(jar: &PrivateCookieJar) -> Option<CartId> {
    let cookie = jar.get(COOKIE_CART)?;

    match cookie.value_trimmed().parse() {
        Ok(cart_id) => Some(cart_id),
        Err(error) => {
            tracing::debug!("Ignoring invalid cart cookie: {error}");
            None
        }
    }
}

/// The cart ID stored in `jar`, or a new one added to the returned jar.
pub fn get_or_create_cart_id(jar: PrivateCookieJar) -> (PrivateCookieJar, CartId) {
    if let Some(cart_id) = get_cart_id(&jar) {
        return (jar, cart_id);
    }

    let cart_id = CartId::new();
    tracing::debug!("Created cart {cart_id}");

    let cookie = Cookie::build((COOKIE_CART, cart_id.to_string()))
        .path("/")
        .max_age(CART_COOKIE_DURATION)
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(true)
        .build();

    (jar.add(cookie), cart_id)
}
