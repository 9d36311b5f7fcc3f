use uuid::Uuid;

use super::errors::DomainError;
use super::model::{
    Customer, NewCustomer, NewOrder, NewProduct, Order, Product, ProductQuantity,
};

pub trait CustomerRepository: Send + Sync + 'static {
    fn find_by_id(&self, id: Uuid) -> Result<Option<Customer>, DomainError>;
    fn find_by_email(&self, email: &str) -> Result<Option<Customer>, DomainError>;
    fn create(&self, customer: NewCustomer) -> Result<Customer, DomainError>;
}

pub trait ProductRepository: Send + Sync + 'static {
    /// Returns the stored products whose ids appear in `products`; unknown
    /// ids are silently skipped.
    fn find_all_by_id(&self, products: &[ProductQuantity]) -> Result<Vec<Product>, DomainError>;
    /// Overwrites the stock of every listed product with the given quantity.
    fn update_quantity(&self, products: &[ProductQuantity]) -> Result<(), DomainError>;
    fn find_by_name(&self, name: &str) -> Result<Option<Product>, DomainError>;
    fn create(&self, product: NewProduct) -> Result<Product, DomainError>;
}

pub trait OrderRepository: Send + Sync + 'static {
    /// Persists the order header and all of its lines as one unit.
    fn create(&self, order: NewOrder) -> Result<Order, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError>;
}
