use rusqlite::Connection;

use crate::{
    AppState, Email, PasswordHash, Role, User, ValidatedPassword, create_user,
    category::{Category, CategoryName, create_category},
    product::{NewProduct, Product, create_product},
};

/// The password of every user made by [insert_test_user].
pub(crate) const TEST_PASSWORD: &str = "correct-horse-battery-staple-42";

pub(crate) fn get_test_state() -> AppState {
    let connection =
        Connection::open_in_memory().expect("Could not open in-memory SQLite database");

    AppState::new(connection, "foobar").expect("Could not create app state")
}

#[track_caller]
pub(crate) fn insert_test_user(state: &AppState, email: &str, name: &str, role: Role) -> User {
    let password_hash =
        PasswordHash::new(ValidatedPassword::new_unchecked(TEST_PASSWORD), 4).unwrap();
    let connection = state.db_connection.lock().unwrap();

    create_user(
        Email::new(email).unwrap(),
        name,
        role,
        password_hash,
        &connection,
    )
    .expect("Could not create test user")
}

/// Inserts two categories with two products each.
///
/// The categories are returned in insertion order ("Tea", then "Coffee")
/// which is not alphabetical.
#[track_caller]
pub(crate) fn seed_catalog(state: &AppState) -> (Vec<Category>, Vec<Product>) {
    let connection = state.db_connection.lock().unwrap();

    let tea = create_category(CategoryName::new_unchecked("Tea"), &connection).unwrap();
    let coffee = create_category(CategoryName::new_unchecked("Coffee"), &connection).unwrap();

    let products = [
        ("Sencha", "A grassy green tea.", 12.5, tea.id),
        ("Earl Grey", "Black tea with bergamot.", 9.0, tea.id),
        ("Espresso Roast", "Dark and syrupy.", 18.0, coffee.id),
        ("Decaf", "All of the taste.", 15.25, coffee.id),
    ]
    .into_iter()
    .map(|(title, description, price, category_id)| {
        let product = NewProduct::new(title, description, price, category_id).unwrap();
        create_product(product, &connection).unwrap()
    })
    .collect();

    (vec![tea, coffee], products)
}
