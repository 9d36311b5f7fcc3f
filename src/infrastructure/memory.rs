//! In-memory adapters for the repository ports.
//!
//! Each repository keeps its rows behind a `Mutex`; none of them share state
//! with the others, so an order does not see later changes to its customer.

use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::model::{
    Customer, NewCustomer, NewOrder, NewProduct, Order, OrderLine, Product, ProductQuantity,
};
use crate::domain::ports::{CustomerRepository, OrderRepository, ProductRepository};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Default)]
pub struct InMemoryCustomerRepository {
    customers: Mutex<Vec<Customer>>,
}

impl InMemoryCustomerRepository {
    pub fn with_customers(customers: Vec<Customer>) -> Self {
        Self {
            customers: Mutex::new(customers),
        }
    }
}

impl CustomerRepository for InMemoryCustomerRepository {
    fn find_by_id(&self, id: Uuid) -> Result<Option<Customer>, DomainError> {
        Ok(lock(&self.customers).iter().find(|c| c.id == id).cloned())
    }

    fn find_by_email(&self, email: &str) -> Result<Option<Customer>, DomainError> {
        Ok(lock(&self.customers)
            .iter()
            .find(|c| c.email == email)
            .cloned())
    }

    fn create(&self, customer: NewCustomer) -> Result<Customer, DomainError> {
        let customer = Customer {
            id: Uuid::new_v4(),
            name: customer.name,
            email: customer.email,
        };
        lock(&self.customers).push(customer.clone());
        Ok(customer)
    }
}

/// Also records every `update_quantity` batch it receives.
#[derive(Default)]
pub struct InMemoryProductRepository {
    products: Mutex<Vec<Product>>,
    updates: Mutex<Vec<Vec<ProductQuantity>>>,
}

impl InMemoryProductRepository {
    pub fn with_products(products: Vec<Product>) -> Self {
        Self {
            products: Mutex::new(products),
            updates: Mutex::default(),
        }
    }

    pub fn get(&self, id: Uuid) -> Option<Product> {
        lock(&self.products).iter().find(|p| p.id == id).cloned()
    }

    pub fn updates(&self) -> Vec<Vec<ProductQuantity>> {
        lock(&self.updates).clone()
    }
}

impl ProductRepository for InMemoryProductRepository {
    fn find_all_by_id(&self, products: &[ProductQuantity]) -> Result<Vec<Product>, DomainError> {
        Ok(lock(&self.products)
            .iter()
            .filter(|p| products.iter().any(|r| r.id == p.id))
            .cloned()
            .collect())
    }

    fn update_quantity(&self, products: &[ProductQuantity]) -> Result<(), DomainError> {
        let mut stored = lock(&self.products);
        for update in products {
            if let Some(p) = stored.iter_mut().find(|p| p.id == update.id) {
                p.quantity = update.quantity;
            }
        }
        lock(&self.updates).push(products.to_vec());
        Ok(())
    }

    fn find_by_name(&self, name: &str) -> Result<Option<Product>, DomainError> {
        Ok(lock(&self.products).iter().find(|p| p.name == name).cloned())
    }

    fn create(&self, product: NewProduct) -> Result<Product, DomainError> {
        let product = Product {
            id: Uuid::new_v4(),
            name: product.name,
            price: product.price,
            quantity: product.quantity,
        };
        lock(&self.products).push(product.clone());
        Ok(product)
    }
}

#[derive(Default)]
pub struct InMemoryOrderRepository {
    orders: Mutex<Vec<Order>>,
}

impl InMemoryOrderRepository {
    pub fn len(&self) -> usize {
        lock(&self.orders).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl OrderRepository for InMemoryOrderRepository {
    fn create(&self, order: NewOrder) -> Result<Order, DomainError> {
        let now = Utc::now();
        let order = Order {
            id: Uuid::new_v4(),
            customer: order.customer,
            lines: order
                .lines
                .into_iter()
                .map(|l| OrderLine {
                    id: Uuid::new_v4(),
                    product_id: l.product_id,
                    unit_price: l.unit_price,
                    quantity: l.quantity,
                })
                .collect(),
            created_at: now,
            updated_at: now,
        };
        lock(&self.orders).push(order.clone());
        Ok(order)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        Ok(lock(&self.orders).iter().find(|o| o.id == id).cloned())
    }
}
