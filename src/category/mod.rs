//! Product categories, shown in the navigation bar and managed in the CMS.

mod create;
mod db;
mod delete;
mod domain;
mod list;
mod page;

pub use create::{create_category_endpoint, get_new_category_page};
pub use db::{
    count_categories, create_category, create_category_table, delete_category,
    get_all_categories, get_category,
};
pub use delete::delete_category_endpoint;
pub use domain::{Category, CategoryFormData, CategoryId, CategoryName};
pub use list::get_categories_page;
pub use page::get_category_page;
