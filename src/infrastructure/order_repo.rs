use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::model::{Customer, NewOrder, Order, OrderLine};
use crate::domain::ports::OrderRepository;
use crate::schema::{customers, order_lines, orders};

use super::models::{CustomerRow, NewOrderLineRow, NewOrderRow, OrderLineRow, OrderRow};

pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl OrderRepository for DieselOrderRepository {
    fn create(&self, order: NewOrder) -> Result<Order, DomainError> {
        let mut conn = self.pool.get()?;
        let NewOrder { customer, lines } = order;

        conn.transaction::<_, DomainError, _>(|conn| {
            let header = diesel::insert_into(orders::table)
                .values(&NewOrderRow {
                    id: Uuid::new_v4(),
                    customer_id: customer.id,
                })
                .returning(OrderRow::as_returning())
                .get_result(conn)?;

            let new_lines: Vec<NewOrderLineRow> = lines
                .into_iter()
                .zip(0..)
                .map(|(l, position)| NewOrderLineRow {
                    id: Uuid::new_v4(),
                    order_id: header.id,
                    product_id: l.product_id,
                    position,
                    quantity: l.quantity,
                    unit_price: l.unit_price,
                })
                .collect();
            let mut stored_lines: Vec<OrderLineRow> = diesel::insert_into(order_lines::table)
                .values(&new_lines)
                .returning(OrderLineRow::as_returning())
                .get_results(conn)?;
            stored_lines.sort_by_key(|l| l.position);

            Ok(Order {
                id: header.id,
                customer,
                lines: stored_lines.into_iter().map(OrderLine::from).collect(),
                created_at: header.created_at,
                updated_at: header.updated_at,
            })
        })
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        let found = orders::table
            .inner_join(customers::table)
            .filter(orders::id.eq(id))
            .select((OrderRow::as_select(), CustomerRow::as_select()))
            .first::<(OrderRow, CustomerRow)>(&mut conn)
            .optional()?;

        let Some((order, customer)) = found else {
            return Ok(None);
        };

        let lines = OrderLineRow::belonging_to(&order)
            .select(OrderLineRow::as_select())
            .order(order_lines::position.asc())
            .load(&mut conn)?;

        Ok(Some(Order {
            id: order.id,
            customer: Customer::from(customer),
            lines: lines.into_iter().map(OrderLine::from).collect(),
            created_at: order.created_at,
            updated_at: order.updated_at,
        }))
    }
}
