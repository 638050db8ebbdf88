//! Database operations for cart contents.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    cart::{CartId, CartItem},
    product::{ProductId, get_product, map_product_row},
};

/// Initialize the cart table.
///
/// The product table must exist first. Removing a product removes it from
/// every cart.
pub fn create_cart_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS cart_item (
            cart_id TEXT NOT NULL,
            product_id INTEGER NOT NULL,
            quantity INTEGER NOT NULL CHECK (quantity > 0),
            PRIMARY KEY (cart_id, product_id),
            FOREIGN KEY(product_id) REFERENCES product(id) ON UPDATE CASCADE ON DELETE CASCADE
        );",
        (),
    )?;

    Ok(())
}

/// The contents of a cart in the order products were first added.
///
/// An unknown `cart_id` is an empty cart.
pub fn get_cart_items(cart_id: CartId, connection: &Connection) -> Result<Vec<CartItem>, Error> {
    connection
        .prepare(
            "SELECT p.id, p.title, p.description, p.price, p.category_id, c.quantity
            FROM cart_item c
            INNER JOIN product p ON p.id = c.product_id
            WHERE c.cart_id = :cart_id
            ORDER BY c.rowid ASC;",
        )?
        .query_map(&[(":cart_id", &cart_id.to_string())], map_row)?
        .map(|maybe_item| maybe_item.map_err(|error| error.into()))
        .collect()
}

/// Add one of `product_id` to the cart.
///
/// # Errors
///
/// Returns [Error::NotFound] if the product does not exist.
pub fn add_cart_item(
    cart_id: CartId,
    product_id: ProductId,
    connection: &Connection,
) -> Result<(), Error> {
    get_product(product_id, connection)?;

    connection.execute(
        "INSERT INTO cart_item (cart_id, product_id, quantity) VALUES (?1, ?2, 1)
        ON CONFLICT(cart_id, product_id) DO UPDATE SET quantity = quantity + 1;",
        (cart_id.to_string(), product_id),
    )?;

    Ok(())
}

/// Remove every unit of `product_id` from the cart.
///
/// # Errors
///
/// Returns [Error::RemoveMissingCartItem] if the product is not in the cart.
pub fn remove_cart_item(
    cart_id: CartId,
    product_id: ProductId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM cart_item WHERE cart_id = ?1 AND product_id = ?2;",
        (cart_id.to_string(), product_id),
    )?;

    if rows_affected == 0 {
        return Err(Error::RemoveMissingCartItem);
    }

    Ok(())
}

pub fn clear_cart(cart_id: CartId, connection: &Connection) -> Result<(), Error> {
    connection.execute(
        "DELETE FROM cart_item WHERE cart_id = ?1;",
        (cart_id.to_string(),),
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<CartItem, rusqlite::Error> {
    Ok(CartItem {
        product: map_product_row(row)?,
        quantity: row.get(5)?,
    })
}

#[cfg(test)]
mod cart_query_tests {
    use rusqlite::Connection;

    use crate::{
        Error,
        cart::CartId,
        category::{CategoryName, create_category},
        db::initialize,
        product::{NewProduct, Product, create_product, delete_product},
    };

    use super::{add_cart_item, clear_cart, get_cart_items, remove_cart_item};

    fn get_test_db_connection() -> (Connection, Vec<Product>) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).expect("Could not initialize database");
        let tea = create_category(CategoryName::new_unchecked("Tea"), &connection).unwrap();
        let products = ["Sencha", "Assam", "Oolong"]
            .into_iter()
            .map(|title| {
                create_product(NewProduct::new(title, "", 5.0, tea.id).unwrap(), &connection)
                    .unwrap()
            })
            .collect();

        (connection, products)
    }

    #[test]
    fn unknown_cart_is_empty() {
        let (connection, _) = get_test_db_connection();

        assert_eq!(get_cart_items(CartId::new(), &connection), Ok(vec![]));
    }

    #[test]
    fn items_keep_insertion_order_and_count_quantity() {
        let (connection, products) = get_test_db_connection();
        let cart_id = CartId::new();

        for product in [&products[2], &products[0], &products[2]] {
            add_cart_item(cart_id, product.id, &connection).unwrap();
        }

        let items = get_cart_items(cart_id, &connection).unwrap();
        let got = items
            .iter()
            .map(|item| (item.product.title.as_str(), item.quantity))
            .collect::<Vec<_>>();
        assert_eq!(got, [("Oolong", 2), ("Sencha", 1)]);
    }

    #[test]
    fn carts_are_separate() {
        let (connection, products) = get_test_db_connection();
        let cart_id = CartId::new();
        add_cart_item(cart_id, products[0].id, &connection).unwrap();

        assert_eq!(get_cart_items(CartId::new(), &connection), Ok(vec![]));
    }

    #[test]
    fn adding_missing_product_fails() {
        let (connection, _) = get_test_db_connection();

        assert_eq!(
            add_cart_item(CartId::new(), 999, &connection),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn remove_and_clear() {
        let (connection, products) = get_test_db_connection();
        let cart_id = CartId::new();
        for product in &products {
            add_cart_item(cart_id, product.id, &connection).unwrap();
        }

        remove_cart_item(cart_id, products[1].id, &connection).unwrap();
        assert_eq!(get_cart_items(cart_id, &connection).unwrap().len(), 2);
        assert_eq!(
            remove_cart_item(cart_id, products[1].id, &connection),
            Err(Error::RemoveMissingCartItem)
        );

        clear_cart(cart_id, &connection).unwrap();
        assert_eq!(get_cart_items(cart_id, &connection), Ok(vec![]));
    }

    #[test]
    fn deleting_product_removes_it_from_carts() {
        let (connection, products) = get_test_db_connection();
        let cart_id = CartId::new();
        add_cart_item(cart_id, products[0].id, &connection).unwrap();

        delete_product(products[0].id, &connection).unwrap();

        assert_eq!(get_cart_items(cart_id, &connection), Ok(vec![]));
    }
}
