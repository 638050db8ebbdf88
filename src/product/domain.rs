//! Core product domain types.

use serde::{Deserialize, Serialize};

use crate::{Error, category::CategoryId};

/// Database identifier for a product.
pub type ProductId = i64;

/// Something the store sells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub description: String,
    /// The unit price in dollars.
    pub price: f64,
    pub category_id: CategoryId,
}

/// A validated product that has not been saved yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    title: String,
    description: String,
    price: f64,
    category_id: CategoryId,
}

impl NewProduct {
    /// Validate the fields of a new product.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - [Error::EmptyProductTitle] if `title` is empty or only whitespace,
    /// - [Error::InvalidPrice] if `price` is negative, NaN or infinite.
    ///
    /// Whether `category_id` exists is checked when the product is inserted.
    pub fn new(
        title: &str,
        description: &str,
        price: f64,
        category_id: CategoryId,
    ) -> Result<Self, Error> {
        let title = title.trim();

        if title.is_empty() {
            return Err(Error::EmptyProductTitle);
        }

        if !price.is_finite() || price < 0.0 {
            return Err(Error::InvalidPrice(price));
        }

        Ok(Self {
            title: title.to_owned(),
            description: description.trim().to_owned(),
            price,
            category_id,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn category_id(&self) -> CategoryId {
        self.category_id
    }
}

/// Form data for product creation.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProductFormData {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    pub category_id: CategoryId,
}

#[cfg(test)]
mod new_product_tests {
    use crate::{Error, product::NewProduct};

    #[test]
    fn new_trims_fields() {
        let product = NewProduct::new("  Sencha ", " Grassy. ", 12.5, 1).unwrap();

        assert_eq!(product.title(), "Sencha");
        assert_eq!(product.description(), "Grassy.");
    }

    #[test]
    fn new_fails_on_empty_title() {
        assert_eq!(
            NewProduct::new(" ", "", 1.0, 1),
            Err(Error::EmptyProductTitle)
        );
    }

    #[test]
    fn new_fails_on_negative_price() {
        assert_eq!(
            NewProduct::new("Sencha", "", -0.5, 1),
            Err(Error::InvalidPrice(-0.5))
        );
    }

    #[test]
    fn new_fails_on_non_finite_price() {
        assert!(NewProduct::new("Sencha", "", f64::INFINITY, 1).is_err());
        assert!(NewProduct::new("Sencha", "", f64::NAN, 1).is_err());
    }

    #[test]
    fn free_products_are_allowed() {
        assert!(NewProduct::new("Sample", "", 0.0, 1).is_ok());
    }
}
