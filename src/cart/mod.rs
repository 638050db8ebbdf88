//! Visitor carts and the pages for managing them.

mod cookie;
mod db;
mod domain;
mod items;
mod page;
mod store;

pub use cookie::{get_cart_id, get_or_create_cart_id};
pub use db::create_cart_table;
pub use domain::{CartId, CartItem, cart_total};
pub use items::{add_to_cart_endpoint, remove_from_cart_endpoint};
pub use page::get_cart_page;
pub use store::CartStore;

#[cfg(test)]
pub(crate) use cookie::COOKIE_CART;
