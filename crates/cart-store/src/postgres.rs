//! PostgreSQL-backed cart store.
//!
//! Concurrency invariants live in the schema and in single-statement
//! compare-and-set updates, never in process memory:
//!
//! - the partial unique index `one_active_cart_per_user` guarantees at most
//!   one `adding` cart per user, so concurrent lookup-or-create converges
//! - `begin_checkout` / `confirm_cart` are `UPDATE ... WHERE status = <expected>`
//!   statements; zero rows affected means a concurrent transition won
//!
//! No lock is held across gateway I/O: the orchestrator registers with the
//! gateway first and only then issues the status CAS.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgRow, PgPool, Row};
use uuid::Uuid;

use cart_core::{Cart, CartError, CartItem, CartResult, CartStatus, CartStore};

/// PostgreSQL `CartStore` implementation
#[derive(Clone)]
pub struct PostgresCartStore {
    pool: PgPool,
}

impl PostgresCartStore {
    /// Creates a new store over an existing connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_cart(row: PgRow) -> CartResult<Cart> {
        let status_raw: String = row.try_get("status").map_err(db_err)?;
        let status = CartStatus::parse(&status_raw)
            .ok_or_else(|| CartError::Store(format!("unknown cart status {status_raw:?}")))?;

        Ok(Cart {
            id: row.try_get::<Uuid, _>("id").map_err(db_err)?,
            user_id: row.try_get("user_id").map_err(db_err)?,
            status,
            unique_code: row.try_get("unique_code").map_err(db_err)?,
            chain: row.try_get("chain").map_err(db_err)?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(db_err)?,
        })
    }

    fn row_to_cart_item(row: PgRow) -> CartResult<CartItem> {
        Ok(CartItem {
            id: row.try_get::<Uuid, _>("id").map_err(db_err)?,
            cart_id: row.try_get::<Uuid, _>("cart_id").map_err(db_err)?,
            item_id: row.try_get("item_id").map_err(db_err)?,
        })
    }
}

fn db_err(e: sqlx::Error) -> CartError {
    CartError::Store(e.to_string())
}

const CART_COLUMNS: &str = "id, user_id, status, unique_code, chain, created_at";

#[async_trait]
impl CartStore for PostgresCartStore {
    async fn find_active_cart(&self, user_id: i64) -> CartResult<Option<Cart>> {
        let row = sqlx::query(&format!(
            "SELECT {CART_COLUMNS} FROM carts WHERE user_id = $1 AND status = 'adding'"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.map(Self::row_to_cart).transpose()
    }

    async fn get_or_create_active_cart(&self, user_id: i64) -> CartResult<Cart> {
        // The insert races against concurrent creators; the partial unique
        // index makes exactly one of them win and everyone re-reads the winner.
        let cart = Cart::new(user_id);

        sqlx::query(
            r#"
            INSERT INTO carts (id, user_id, status, unique_code, chain, created_at)
            VALUES ($1, $2, 'adding', '', $3, $4)
            ON CONFLICT (user_id) WHERE status = 'adding' DO NOTHING
            "#,
        )
        .bind(cart.id)
        .bind(cart.user_id)
        .bind(cart.chain)
        .bind(cart.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        self.find_active_cart(user_id)
            .await?
            .ok_or_else(|| CartError::Store("active cart vanished after insert".to_string()))
    }

    async fn add_item(&self, cart_id: Uuid, item_id: &str) -> CartResult<CartItem> {
        let item = CartItem::new(cart_id, item_id);

        sqlx::query("INSERT INTO cart_items (id, cart_id, item_id) VALUES ($1, $2, $3)")
            .bind(item.id)
            .bind(item.cart_id)
            .bind(&item.item_id)
            .execute(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db)
                    if db.constraint() == Some("cart_items_cart_id_fkey") =>
                {
                    CartError::not_found(format!("cart {cart_id}"))
                }
                _ => db_err(e),
            })?;

        Ok(item)
    }

    async fn items_for_cart(&self, cart_id: Uuid) -> CartResult<Vec<CartItem>> {
        let rows = sqlx::query(
            "SELECT id, cart_id, item_id FROM cart_items WHERE cart_id = $1 ORDER BY seq",
        )
        .bind(cart_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(Self::row_to_cart_item).collect()
    }

    async fn begin_checkout(
        &self,
        cart_id: Uuid,
        unique_code: &str,
        chain: i32,
    ) -> CartResult<Cart> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE carts SET status = 'check', unique_code = $2, chain = $3
            WHERE id = $1 AND status = 'adding'
            RETURNING {CART_COLUMNS}
            "#
        ))
        .bind(cart_id)
        .bind(unique_code)
        .bind(chain)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        match row {
            Some(row) => Self::row_to_cart(row),
            None => Err(CartError::Conflict { cart_id }),
        }
    }

    async fn confirm_cart(&self, cart_id: Uuid) -> CartResult<Cart> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE carts SET status = 'confirmed'
            WHERE id = $1 AND status = 'check'
            RETURNING {CART_COLUMNS}
            "#
        ))
        .bind(cart_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        match row {
            Some(row) => Self::row_to_cart(row),
            None => Err(CartError::Conflict { cart_id }),
        }
    }

    async fn pending_carts(&self, user_id: i64) -> CartResult<Vec<Cart>> {
        let rows = sqlx::query(&format!(
            "SELECT {CART_COLUMNS} FROM carts WHERE user_id = $1 AND status = 'check'"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(Self::row_to_cart).collect()
    }

    async fn history(&self, user_id: i64) -> CartResult<Vec<Cart>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {CART_COLUMNS} FROM carts
            WHERE user_id = $1 AND status <> 'adding'
            ORDER BY created_at DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(Self::row_to_cart).collect()
    }
}
