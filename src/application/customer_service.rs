use std::sync::Arc;

use crate::domain::errors::DomainError;
use crate::domain::model::{Customer, NewCustomer};
use crate::domain::ports::CustomerRepository;

pub struct CustomerService {
    customers: Arc<dyn CustomerRepository>,
}

impl CustomerService {
    pub fn new(customers: Arc<dyn CustomerRepository>) -> Self {
        Self { customers }
    }

    /// Registers a customer. E-mail addresses are unique across customers.
    pub fn create_customer(&self, name: String, email: String) -> Result<Customer, DomainError> {
        if self.customers.find_by_email(&email)?.is_some() {
            return Err(DomainError::Conflict(
                "This e-mail is already assigned to a customer.".to_string(),
            ));
        }

        let customer = self.customers.create(NewCustomer { name, email })?;
        log::info!("customer {} registered", customer.id);
        Ok(customer)
    }
}
