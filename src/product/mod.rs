//! The products the store sells.

mod create;
mod db;
mod delete;
mod domain;
mod list;
mod page;

pub use create::{create_product_endpoint, get_new_product_page};
pub use db::{
    count_products, create_product, create_product_table, delete_product, get_all_products,
    get_product, get_products_by_category,
};
pub(crate) use db::map_row as map_product_row;
pub use delete::delete_product_endpoint;
pub use domain::{NewProduct, Product, ProductFormData, ProductId};
pub use list::get_products_page;
pub use page::{get_product_page, product_cards};
