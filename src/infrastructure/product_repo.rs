use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::model::{NewProduct, Product, ProductQuantity};
use crate::domain::ports::ProductRepository;
use crate::schema::products;

use super::models::{NewProductRow, ProductRow};

pub struct DieselProductRepository {
    pool: DbPool,
}

impl DieselProductRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl ProductRepository for DieselProductRepository {
    fn find_all_by_id(&self, products: &[ProductQuantity]) -> Result<Vec<Product>, DomainError> {
        let mut conn = self.pool.get()?;
        let ids: Vec<Uuid> = products.iter().map(|p| p.id).collect();

        let rows = products::table
            .filter(products::id.eq_any(ids))
            .select(ProductRow::as_select())
            .load(&mut conn)?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    fn update_quantity(&self, products: &[ProductQuantity]) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;
        let now = Utc::now();

        conn.transaction::<_, DomainError, _>(|conn| {
            for p in products {
                diesel::update(products::table.find(p.id))
                    .set((
                        products::quantity.eq(p.quantity),
                        products::updated_at.eq(now),
                    ))
                    .execute(conn)?;
            }
            Ok(())
        })
    }

    fn find_by_name(&self, name: &str) -> Result<Option<Product>, DomainError> {
        let mut conn = self.pool.get()?;

        let row = products::table
            .filter(products::name.eq(name))
            .select(ProductRow::as_select())
            .first(&mut conn)
            .optional()?;

        Ok(row.map(Product::from))
    }

    fn create(&self, product: NewProduct) -> Result<Product, DomainError> {
        let mut conn = self.pool.get()?;

        let row = diesel::insert_into(products::table)
            .values(&NewProductRow {
                id: Uuid::new_v4(),
                name: product.name,
                price: product.price,
                quantity: product.quantity,
            })
            .returning(ProductRow::as_returning())
            .get_result(&mut conn)?;

        Ok(row.into())
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;

    use super::*;
    use crate::infrastructure::test_db::setup_db;

    fn new_product(name: &str, quantity: i32) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            price: BigDecimal::from_str("12.50").expect("valid decimal"),
            quantity,
        }
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn find_all_by_id_skips_unknown_ids() {
        let (_container, pool) = setup_db().await;
        let repo = DieselProductRepository::new(pool);
        let keyboard = repo.create(new_product("Keyboard", 5)).expect("create failed");
        repo.create(new_product("Mouse", 5)).expect("create failed");

        let found = repo
            .find_all_by_id(&[
                ProductQuantity {
                    id: keyboard.id,
                    quantity: 1,
                },
                ProductQuantity {
                    id: Uuid::new_v4(),
                    quantity: 1,
                },
            ])
            .expect("find failed");

        assert_eq!(found, vec![keyboard]);
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn update_quantity_overwrites_stock() {
        let (_container, pool) = setup_db().await;
        let repo = DieselProductRepository::new(pool);
        let a = repo.create(new_product("Keyboard", 10)).expect("create failed");
        let b = repo.create(new_product("Mouse", 3)).expect("create failed");

        repo.update_quantity(&[
            ProductQuantity {
                id: a.id,
                quantity: 8,
            },
            ProductQuantity {
                id: b.id,
                quantity: 0,
            },
        ])
        .expect("update failed");

        assert_eq!(
            repo.find_by_name("Keyboard").expect("find failed").map(|p| p.quantity),
            Some(8)
        );
        assert_eq!(
            repo.find_by_name("Mouse").expect("find failed").map(|p| p.quantity),
            Some(0)
        );
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn negative_stock_is_rejected_and_nothing_is_written() {
        let (_container, pool) = setup_db().await;
        let repo = DieselProductRepository::new(pool);
        let a = repo.create(new_product("Keyboard", 10)).expect("create failed");
        let b = repo.create(new_product("Mouse", 3)).expect("create failed");

        let result = repo.update_quantity(&[
            ProductQuantity {
                id: a.id,
                quantity: 9,
            },
            ProductQuantity {
                id: b.id,
                quantity: -1,
            },
        ]);

        assert!(matches!(result, Err(DomainError::Internal(_))));
        assert_eq!(
            repo.find_by_name("Keyboard").expect("find failed").map(|p| p.quantity),
            Some(10)
        );
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn duplicate_name_insert_is_a_conflict() {
        let (_container, pool) = setup_db().await;
        let repo = DieselProductRepository::new(pool);
        repo.create(new_product("Keyboard", 1)).expect("create failed");

        let err = repo.create(new_product("Keyboard", 2)).unwrap_err();

        assert!(matches!(err, DomainError::Conflict(_)), "{err:?}");
    }
}
