use axum::{http::header::SET_COOKIE, response::IntoResponse};
use axum_extra::extract::{PrivateCookieJar, cookie::Cookie};

use crate::{
    AppState,
    cart::{COOKIE_CART, CartId},
};

/// The encrypted cart cookie a browser would send for `cart_id`.
pub(crate) fn cart_cookie(state: &AppState, cart_id: CartId) -> Cookie<'static> {
    let response = PrivateCookieJar::new(state.cookie_key.clone())
        .add(Cookie::new(COOKIE_CART, cart_id.to_string()))
        .into_response();
    let header = response
        .headers()
        .get(SET_COOKIE)
        .expect("Cart cookie was not set")
        .to_str()
        .expect("Could not convert cookie to str")
        .to_owned();

    Cookie::parse(header).expect("Could not parse cart cookie")
}
