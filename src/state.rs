use std::sync::Arc;

use crate::application::customer_service::CustomerService;
use crate::application::order_service::OrderService;
use crate::application::product_service::ProductService;
use crate::db::DbPool;
use crate::domain::ports::{CustomerRepository, OrderRepository, ProductRepository};
use crate::infrastructure::customer_repo::DieselCustomerRepository;
use crate::infrastructure::memory::{
    InMemoryCustomerRepository, InMemoryOrderRepository, InMemoryProductRepository,
};
use crate::infrastructure::order_repo::DieselOrderRepository;
use crate::infrastructure::product_repo::DieselProductRepository;

/// Shared application services, handed to every handler as `web::Data`.
pub struct AppState {
    pub customers: CustomerService,
    pub products: ProductService,
    pub orders: OrderService,
}

impl AppState {
    pub fn new(
        customers: Arc<dyn CustomerRepository>,
        products: Arc<dyn ProductRepository>,
        orders: Arc<dyn OrderRepository>,
    ) -> Self {
        Self {
            customers: CustomerService::new(customers.clone()),
            products: ProductService::new(products.clone()),
            orders: OrderService::new(orders, products, customers),
        }
    }

    pub fn with_pool(pool: DbPool) -> Self {
        Self::new(
            Arc::new(DieselCustomerRepository::new(pool.clone())),
            Arc::new(DieselProductRepository::new(pool.clone())),
            Arc::new(DieselOrderRepository::new(pool)),
        )
    }

    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryCustomerRepository::default()),
            Arc::new(InMemoryProductRepository::default()),
            Arc::new(InMemoryOrderRepository::default()),
        )
    }
}
