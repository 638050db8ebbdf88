//! Database operations for products.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    category::CategoryId,
    product::{NewProduct, Product, ProductId},
};

const SELECT_PRODUCT: &str = "SELECT id, title, description, price, category_id FROM product";

/// Insert `product` and return it with its generated ID.
///
/// # Errors
///
/// Returns [Error::InvalidCategory] if the product's category does not exist.
pub fn create_product(product: NewProduct, connection: &Connection) -> Result<Product, Error> {
    connection.execute(
        "INSERT INTO product (title, description, price, category_id) VALUES (?1, ?2, ?3, ?4);",
        (
            product.title(),
            product.description(),
            product.price(),
            product.category_id(),
        ),
    )?;

    Ok(Product {
        id: connection.last_insert_rowid(),
        title: product.title().to_owned(),
        description: product.description().to_owned(),
        price: product.price(),
        category_id: product.category_id(),
    })
}

/// Retrieve a single product by ID.
pub fn get_product(product_id: ProductId, connection: &Connection) -> Result<Product, Error> {
    connection
        .prepare(&format!("{SELECT_PRODUCT} WHERE id = :id;"))?
        .query_row(&[(":id", &product_id)], map_row)
        .map_err(|error| error.into())
}

/// Retrieve every product, oldest first.
pub fn get_all_products(connection: &Connection) -> Result<Vec<Product>, Error> {
    connection
        .prepare(&format!("{SELECT_PRODUCT} ORDER BY id ASC;"))?
        .query_map([], map_row)?
        .map(|maybe_product| maybe_product.map_err(|error| error.into()))
        .collect()
}

/// Retrieve the products in a category ordered by title.
pub fn get_products_by_category(
    category_id: CategoryId,
    connection: &Connection,
) -> Result<Vec<Product>, Error> {
    connection
        .prepare(&format!(
            "{SELECT_PRODUCT} WHERE category_id = :category_id ORDER BY title COLLATE NOCASE ASC;"
        ))?
        .query_map(&[(":category_id", &category_id)], map_row)?
        .map(|maybe_product| maybe_product.map_err(|error| error.into()))
        .collect()
}

/// The number of products in the store.
pub fn count_products(connection: &Connection) -> Result<i64, Error> {
    connection
        .query_row("SELECT COUNT(*) FROM product;", [], |row| row.get(0))
        .map_err(|error| error.into())
}

/// Delete a product by ID, removing it from every cart.
///
/// # Errors
///
/// Returns [Error::DeleteMissingProduct] if the product doesn't exist.
pub fn delete_product(product_id: ProductId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM product WHERE id = ?1", [product_id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingProduct);
    }

    Ok(())
}

/// Initialize the product table and indexes.
///
/// The category table must exist first.
pub fn create_product_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS product (
            id INTEGER PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            price REAL NOT NULL CHECK (price >= 0),
            category_id INTEGER NOT NULL,
            FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_product_category ON product(category_id);",
    )?;

    Ok(())
}

pub(crate) fn map_row(row: &Row) -> Result<Product, rusqlite::Error> {
    Ok(Product {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        price: row.get(3)?,
        category_id: row.get(4)?,
    })
}
