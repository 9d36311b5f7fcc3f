use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::model::{Customer, NewCustomer};
use crate::domain::ports::CustomerRepository;
use crate::schema::customers;

use super::models::{CustomerRow, NewCustomerRow};

pub struct DieselCustomerRepository {
    pool: DbPool,
}

impl DieselCustomerRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl CustomerRepository for DieselCustomerRepository {
    fn find_by_id(&self, id: Uuid) -> Result<Option<Customer>, DomainError> {
        let mut conn = self.pool.get()?;

        let row = customers::table
            .find(id)
            .select(CustomerRow::as_select())
            .first(&mut conn)
            .optional()?;

        Ok(row.map(Customer::from))
    }

    fn find_by_email(&self, email: &str) -> Result<Option<Customer>, DomainError> {
        let mut conn = self.pool.get()?;

        let row = customers::table
            .filter(customers::email.eq(email))
            .select(CustomerRow::as_select())
            .first(&mut conn)
            .optional()?;

        Ok(row.map(Customer::from))
    }

    fn create(&self, customer: NewCustomer) -> Result<Customer, DomainError> {
        let mut conn = self.pool.get()?;

        let row = diesel::insert_into(customers::table)
            .values(&NewCustomerRow {
                id: Uuid::new_v4(),
                name: customer.name,
                email: customer.email,
            })
            .returning(CustomerRow::as_returning())
            .get_result(&mut conn)?;

        Ok(row.into())
    }
}
