use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;

use storefront_rs::{
    CategoryName, Email, NewProduct, PasswordHash, Role, ValidatedPassword, create_category,
    create_product, create_user, initialize_db,
};

/// A utility for creating a demo database for the storefront_rs server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// The demo catalogue: each category with its products' title, description
/// and price.
const CATALOGUE: [(&str, [(&str, &str, f64); 3]); 3] = [
    (
        "Tea",
        [
            ("Sencha", "A grassy Japanese green tea.", 12.5),
            ("Earl Grey", "Black tea scented with bergamot.", 9.0),
            ("Chamomile", "A caffeine free evening blend.", 7.25),
        ],
    ),
    (
        "Coffee",
        [
            ("Espresso Roast", "Dark, syrupy and low in acidity.", 18.0),
            ("Single Origin Ethiopia", "Bright with notes of blueberry.", 21.5),
            ("Decaf", "All of the taste, none of the jitters.", 15.25),
        ],
    ),
    (
        "Brewing",
        [
            ("Pour Over Kettle", "Gooseneck kettle for a steady pour.", 64.0),
            ("Tea Infuser", "Stainless steel mesh infuser.", 8.5),
            ("Hand Grinder", "Ceramic burrs, adjustable grind.", 45.0),
        ],
    ),
];

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating demo users...");

    for (email, name, role) in [
        ("admin@example.com", "Admin", Role::Admin),
        ("customer@example.com", "Customer", Role::Customer),
    ] {
        let password_hash = PasswordHash::new(
            ValidatedPassword::new_unchecked("test"),
            PasswordHash::DEFAULT_COST,
        )?;
        create_user(Email::new(email)?, name, role, password_hash, &conn)?;
        println!("  {email} ({role}) with the password 'test'");
    }

    println!("Creating demo catalogue...");

    for (category_name, products) in CATALOGUE {
        let category = create_category(CategoryName::new(category_name)?, &conn)?;

        for (title, description, price) in products {
            create_product(
                NewProduct::new(title, description, price, category.id)?,
                &conn,
            )?;
        }

        println!("  {category_name}: {} products", products.len());
    }

    println!("Success!");

    Ok(())
}
