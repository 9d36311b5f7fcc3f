use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub name: String,
    pub email: String,
}

/// A catalogue entry. `quantity` is the stock currently available.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub price: BigDecimal,
    pub quantity: i32,
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub price: BigDecimal,
    pub quantity: i32,
}

/// A product id paired with a quantity.
///
/// Used both for the entries of an order request and for the absolute stock
/// values written back by `ProductRepository::update_quantity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductQuantity {
    pub id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderLineInput {
    pub product_id: Uuid,
    pub unit_price: BigDecimal,
    pub quantity: i32,
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer: Customer,
    pub lines: Vec<OrderLineInput>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderLine {
    pub id: Uuid,
    pub product_id: Uuid,
    pub unit_price: BigDecimal,
    pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: Uuid,
    pub customer: Customer,
    pub lines: Vec<OrderLine>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
