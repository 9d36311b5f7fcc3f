use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use uuid::{Uuid, Variant};

use crate::domain::errors::{join_ids, DomainError};
use crate::domain::model::{NewOrder, Order, OrderLineInput, Product, ProductQuantity};
use crate::domain::ports::{CustomerRepository, OrderRepository, ProductRepository};

/// Order creation and lookup.
///
/// Creation persists the order and then writes the decremented stock in a
/// second, independent call. Nothing rolls the order back if that second
/// write fails, and no lock guards the read-check-write on stock, so two
/// concurrent orders for the same product can oversell.
pub struct OrderService {
    orders: Arc<dyn OrderRepository>,
    products: Arc<dyn ProductRepository>,
    customers: Arc<dyn CustomerRepository>,
}

impl OrderService {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        products: Arc<dyn ProductRepository>,
        customers: Arc<dyn CustomerRepository>,
    ) -> Self {
        Self {
            orders,
            products,
            customers,
        }
    }

    pub fn create_order(
        &self,
        customer_id: Uuid,
        requested: Vec<ProductQuantity>,
    ) -> Result<Order, DomainError> {
        let customer = self.customers.find_by_id(customer_id)?.ok_or_else(|| {
            DomainError::InvalidReference("Provided customer ID does not exist.".to_string())
        })?;

        validate_request(&requested)?;

        let stored = self.products.find_all_by_id(&requested)?;
        if stored.is_empty() {
            return Err(DomainError::NotFound("Products not found.".to_string()));
        }

        let stored_by_id: HashMap<Uuid, &Product> = stored.iter().map(|p| (p.id, p)).collect();

        let missing: Vec<Uuid> = requested
            .iter()
            .filter(|r| !stored_by_id.contains_key(&r.id))
            .map(|r| r.id)
            .collect();
        if !missing.is_empty() {
            return Err(DomainError::ProductsNotFound(missing));
        }

        let short: Vec<Uuid> = requested
            .iter()
            .filter(|r| {
                stored_by_id
                    .get(&r.id)
                    .is_some_and(|p| p.quantity < r.quantity)
            })
            .map(|r| r.id)
            .collect();
        if !short.is_empty() {
            return Err(DomainError::InsufficientStock(short));
        }

        let requested_by_id: HashMap<Uuid, i32> =
            requested.iter().map(|r| (r.id, r.quantity)).collect();
        let lines: Vec<OrderLineInput> = stored
            .iter()
            .filter_map(|p| {
                requested_by_id.get(&p.id).map(|&quantity| OrderLineInput {
                    product_id: p.id,
                    unit_price: p.price.clone(),
                    quantity,
                })
            })
            .collect();

        log::debug!(
            "customer {} passed stock checks for {} product(s)",
            customer.id,
            lines.len()
        );

        let order = self.orders.create(NewOrder { customer, lines })?;

        let remaining: Vec<ProductQuantity> = requested
            .iter()
            .filter_map(|r| {
                stored_by_id.get(&r.id).map(|p| ProductQuantity {
                    id: r.id,
                    quantity: p.quantity - r.quantity,
                })
            })
            .collect();
        self.products.update_quantity(&remaining)?;

        log::info!(
            "order {} created for customer {} with {} line(s)",
            order.id,
            order.customer.id,
            order.lines.len()
        );

        Ok(order)
    }

    /// Looks an order up by its textual id. An unknown but well-formed id is
    /// `Ok(None)`.
    pub fn find_order(&self, id: &str) -> Result<Option<Order>, DomainError> {
        let id = parse_order_id(id)?;
        self.orders.find_by_id(id)
    }
}

/// Accepts the canonical hyphenated form of an RFC 4122 UUID (versions 1-5)
/// or the nil UUID.
fn parse_order_id(raw: &str) -> Result<Uuid, DomainError> {
    if raw.len() != 36 {
        return Err(invalid_id());
    }
    let id = Uuid::parse_str(raw).map_err(|_| invalid_id())?;
    let rfc = matches!(id.get_version_num(), 1..=5) && id.get_variant() == Variant::RFC4122;
    if rfc || id.is_nil() {
        Ok(id)
    } else {
        Err(invalid_id())
    }
}

fn invalid_id() -> DomainError {
    DomainError::InvalidArgument("Please provide a valid ID.".to_string())
}

fn validate_request(requested: &[ProductQuantity]) -> Result<(), DomainError> {
    let non_positive: Vec<Uuid> = requested
        .iter()
        .filter(|r| r.quantity < 1)
        .map(|r| r.id)
        .collect();
    if !non_positive.is_empty() {
        return Err(DomainError::InvalidArgument(format!(
            "Product(s) {} must be requested with a positive quantity",
            join_ids(&non_positive)
        )));
    }

    let mut seen = HashSet::new();
    let mut duplicated = Vec::new();
    for r in requested {
        if !seen.insert(r.id) && !duplicated.contains(&r.id) {
            duplicated.push(r.id);
        }
    }
    if !duplicated.is_empty() {
        return Err(DomainError::InvalidArgument(format!(
            "Product(s) {} requested more than once",
            join_ids(&duplicated)
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;

    use super::*;
    use crate::domain::model::{Customer, Product};
    use crate::infrastructure::memory::{
        InMemoryCustomerRepository, InMemoryOrderRepository, InMemoryProductRepository,
    };

    struct Fixture {
        customer: Customer,
        p1: Product,
        p2: Product,
        orders: Arc<InMemoryOrderRepository>,
        products: Arc<InMemoryProductRepository>,
        service: OrderService,
    }

    fn product(name: &str, price: &str, quantity: i32) -> Product {
        Product {
            id: Uuid::new_v4(),
            name: name.to_string(),
            price: BigDecimal::from_str(price).expect("valid decimal"),
            quantity,
        }
    }

    fn fixture() -> Fixture {
        let customer = Customer {
            id: Uuid::new_v4(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
        };
        let p1 = product("Keyboard", "5", 10);
        let p2 = product("Mouse", "2", 3);

        let customers = Arc::new(InMemoryCustomerRepository::with_customers(vec![
            customer.clone()
        ]));
        let products = Arc::new(InMemoryProductRepository::with_products(vec![
            p1.clone(),
            p2.clone(),
        ]));
        let orders = Arc::new(InMemoryOrderRepository::default());
        let service = OrderService::new(orders.clone(), products.clone(), customers);

        Fixture {
            customer,
            p1,
            p2,
            orders,
            products,
            service,
        }
    }

    fn req(id: Uuid, quantity: i32) -> ProductQuantity {
        ProductQuantity { id, quantity }
    }

    #[test]
    fn create_order_persists_lines_and_decrements_stock() {
        let f = fixture();

        let order = f
            .service
            .create_order(f.customer.id, vec![req(f.p1.id, 2), req(f.p2.id, 3)])
            .expect("order should be created");

        assert_eq!(order.customer, f.customer);
        let lines: Vec<(Uuid, BigDecimal, i32)> = order
            .lines
            .iter()
            .map(|l| (l.product_id, l.unit_price.clone(), l.quantity))
            .collect();
        assert_eq!(
            lines,
            vec![
                (f.p1.id, BigDecimal::from(5), 2),
                (f.p2.id, BigDecimal::from(2), 3),
            ]
        );

        assert_eq!(
            f.products.updates(),
            vec![vec![req(f.p1.id, 8), req(f.p2.id, 0)]]
        );
        assert_eq!(f.orders.len(), 1);
    }

    #[test]
    fn create_order_returns_what_the_repository_stored() {
        let f = fixture();

        let order = f
            .service
            .create_order(f.customer.id, vec![req(f.p1.id, 1)])
            .expect("order should be created");

        let stored = f.orders.find_by_id(order.id).expect("lookup");
        assert_eq!(stored, Some(order));
    }

    #[test]
    fn unknown_customer_is_an_invalid_reference() {
        let f = fixture();

        let err = f
            .service
            .create_order(Uuid::new_v4(), vec![req(f.p1.id, 1)])
            .unwrap_err();

        assert!(matches!(err, DomainError::InvalidReference(_)));
        assert_eq!(err.to_string(), "Provided customer ID does not exist.");
        assert_eq!(f.orders.len(), 0);
        assert!(f.products.updates().is_empty());
    }

    #[test]
    fn no_matching_products_is_not_found() {
        let f = fixture();

        let err = f
            .service
            .create_order(f.customer.id, vec![req(Uuid::new_v4(), 1)])
            .unwrap_err();

        assert!(matches!(err, DomainError::NotFound(_)));
        assert_eq!(err.to_string(), "Products not found.");
    }

    #[test]
    fn empty_request_is_not_found() {
        let f = fixture();

        let err = f.service.create_order(f.customer.id, vec![]).unwrap_err();

        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[test]
    fn partially_unknown_products_name_exactly_the_missing_ids() {
        let f = fixture();
        let ghost_a = Uuid::new_v4();
        let ghost_b = Uuid::new_v4();

        let err = f
            .service
            .create_order(
                f.customer.id,
                vec![req(ghost_a, 1), req(f.p1.id, 1), req(ghost_b, 1)],
            )
            .unwrap_err();

        match err {
            DomainError::ProductsNotFound(ids) => assert_eq!(ids, vec![ghost_a, ghost_b]),
            other => panic!("expected ProductsNotFound, got {other:?}"),
        }
        assert_eq!(f.orders.len(), 0);
    }

    #[test]
    fn exceeding_stock_names_offenders_and_persists_nothing() {
        let f = fixture();

        let err = f
            .service
            .create_order(f.customer.id, vec![req(f.p1.id, 2), req(f.p2.id, 4)])
            .unwrap_err();

        match err {
            DomainError::InsufficientStock(ids) => assert_eq!(ids, vec![f.p2.id]),
            other => panic!("expected InsufficientStock, got {other:?}"),
        }
        assert_eq!(f.orders.len(), 0);
        assert!(f.products.updates().is_empty());
        assert_eq!(f.products.get(f.p2.id).map(|p| p.quantity), Some(3));
    }

    #[test]
    fn ordering_the_whole_stock_is_allowed() {
        let f = fixture();

        f.service
            .create_order(f.customer.id, vec![req(f.p2.id, 3)])
            .expect("exact stock should be orderable");

        assert_eq!(f.products.get(f.p2.id).map(|p| p.quantity), Some(0));
    }

    #[test]
    fn duplicate_product_ids_are_rejected_before_lookup() {
        let f = fixture();

        let err = f
            .service
            .create_order(f.customer.id, vec![req(f.p1.id, 1), req(f.p1.id, 2)])
            .unwrap_err();

        assert!(matches!(err, DomainError::InvalidArgument(_)));
        assert!(err.to_string().contains(&f.p1.id.to_string()));
        assert_eq!(f.orders.len(), 0);
    }

    #[test]
    fn non_positive_quantities_are_rejected() {
        let f = fixture();

        let err = f
            .service
            .create_order(f.customer.id, vec![req(f.p1.id, 0)])
            .unwrap_err();

        assert!(matches!(err, DomainError::InvalidArgument(_)));
        assert!(f.products.updates().is_empty());
    }

    #[test]
    fn find_order_rejects_malformed_ids() {
        let f = fixture();

        for raw in [
            "",
            "abc",
            "12345",
            "6f9619ff8b86d011b42d00c04fc964ff",
            "ffffffff-ffff-ffff-ffff-ffffffffffff",
            "6f9619ff-8b86-4011-c42d-00c04fc964ff",
            "6f9619ff-8b86-7011-b42d-00c04fc964ff",
        ] {
            let err = f.service.find_order(raw).unwrap_err();
            assert!(matches!(err, DomainError::InvalidArgument(_)), "{raw}");
            assert_eq!(err.to_string(), "Please provide a valid ID.");
        }
    }

    #[test]
    fn find_order_accepts_rfc_versions_and_nil() {
        let f = fixture();

        for raw in [
            "00000000-0000-0000-0000-000000000000",
            "6f9619ff-8b86-1011-b42d-00c04fc964ff",
            "6F9619FF-8B86-5011-A42D-00C04FC964FF",
        ] {
            let found = f.service.find_order(raw);
            assert!(matches!(found, Ok(None)), "{raw}");
        }
    }

    #[test]
    fn find_order_returns_none_for_unknown_id() {
        let f = fixture();

        let found = f
            .service
            .find_order(&Uuid::new_v4().to_string())
            .expect("well-formed id should not error");

        assert!(found.is_none());
    }

    #[test]
    fn find_order_returns_created_order() {
        let f = fixture();
        let order = f
            .service
            .create_order(f.customer.id, vec![req(f.p1.id, 2)])
            .expect("order should be created");

        let found = f
            .service
            .find_order(&order.id.to_string())
            .expect("lookup should succeed");

        assert_eq!(found, Some(order));
    }
}
