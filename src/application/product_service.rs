use std::sync::Arc;

use bigdecimal::{BigDecimal, Zero};

use crate::domain::errors::DomainError;
use crate::domain::model::{NewProduct, Product};
use crate::domain::ports::ProductRepository;

/// Prices are stored as `NUMERIC(10, 2)`.
const PRICE_SCALE: i64 = 2;
const PRICE_LIMIT: i64 = 100_000_000;

pub struct ProductService {
    products: Arc<dyn ProductRepository>,
}

impl ProductService {
    pub fn new(products: Arc<dyn ProductRepository>) -> Self {
        Self { products }
    }

    /// Adds a product to the catalogue. Names are unique; price and stock
    /// must not be negative, and the price must fit the stored precision.
    pub fn create_product(
        &self,
        name: String,
        price: BigDecimal,
        quantity: i32,
    ) -> Result<Product, DomainError> {
        if price < BigDecimal::zero() {
            return Err(DomainError::InvalidArgument(
                "Price must not be negative.".to_string(),
            ));
        }
        if price.with_scale(PRICE_SCALE) != price {
            return Err(DomainError::InvalidArgument(
                "Price must have at most 2 decimal places.".to_string(),
            ));
        }
        if price >= BigDecimal::from(PRICE_LIMIT) {
            return Err(DomainError::InvalidArgument(
                "Price must be lower than 100000000.".to_string(),
            ));
        }
        if quantity < 0 {
            return Err(DomainError::InvalidArgument(
                "Quantity must not be negative.".to_string(),
            ));
        }
        if self.products.find_by_name(&name)?.is_some() {
            return Err(DomainError::Conflict(
                "A product with this name already exists.".to_string(),
            ));
        }

        let product = self.products.create(NewProduct {
            name,
            price,
            quantity,
        })?;
        log::info!("product {} added with {} unit(s)", product.id, product.quantity);
        Ok(product)
    }
}
