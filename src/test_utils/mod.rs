#![allow(missing_docs)]

pub(crate) mod auth;
pub(crate) mod cart;
pub(crate) mod db;
pub(crate) mod form;
pub(crate) mod html;
pub(crate) mod http;

pub(crate) use auth::{log_in_cookie, test_log_in_router};
pub(crate) use cart::cart_cookie;
pub(crate) use db::{TEST_PASSWORD, get_test_state, insert_test_user, seed_catalog};
pub(crate) use form::{
    assert_form_error_message, assert_form_input, assert_hx_endpoint, must_get_form,
};
pub(crate) use html::{assert_valid_html, parse_html_document, parse_html_fragment};
pub(crate) use http::{assert_hx_redirect, assert_redirect, get_header};
