//! Creates the application's database schema.

use rusqlite::Connection;

use crate::{
    auth::create_user_table, cart::create_cart_table, category::create_category_table,
    product::create_product_table,
};

/// Create the tables for all the domain models.
///
/// The tables are created inside a single transaction so that a failure
/// leaves the database untouched. Foreign keys are enabled on `connection`
/// so that deleting a category removes its products and their cart entries.
///
/// # Errors
///
/// Returns an error if any of the SQL queries fail.
pub fn initialize(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction = connection.unchecked_transaction()?;

    create_user_table(&transaction)?;
    create_category_table(&transaction)?;
    create_product_table(&transaction)?;
    create_cart_table(&transaction)?;

    transaction.commit()
}
