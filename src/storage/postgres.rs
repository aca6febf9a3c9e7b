//! Persistent store implementation using PostgreSQL.

use crate::domain::model::{
    Product, ProductPatch, ProductQuery, ProductStatus, ProfileCascade, User,
};
use crate::domain::{MarketError, MarketResult};
use crate::storage::MarketStore;
use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use uuid::Uuid;

const PRODUCT_COLUMNS: &str = "id, name, price, category, contact_phone, image_url, \
     seller_name, description, status, created_at";

const USER_COLUMNS: &str = "id, username, password_hash, institute, branch, mobile";

/// Store backed by a `PgPool`.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Connects and creates the `users` / `products` tables if missing.
    pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn ensure_schema(&self) -> anyhow::Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS users (
                id UUID PRIMARY KEY,
                username TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                institute TEXT NOT NULL DEFAULT 'VJTI',
                branch TEXT NOT NULL,
                mobile TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        // seller_name matches users.username by value only; no foreign key.
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS products (
                id UUID PRIMARY KEY,
                name TEXT NOT NULL,
                price DOUBLE PRECISION NOT NULL,
                category TEXT NOT NULL,
                contact_phone TEXT NOT NULL,
                image_url TEXT NOT NULL,
                seller_name TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                status TEXT NOT NULL DEFAULT 'active',
                created_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS products_seller_idx ON products (seller_name)")
            .execute(&self.pool)
            .await?;
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS products_feed_idx ON products (status, created_at DESC)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn user_from_row(row: &PgRow) -> Result<User, sqlx::Error> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        password_hash: row.try_get("password_hash")?,
        institute: row.try_get("institute")?,
        branch: row.try_get("branch")?,
        mobile: row.try_get("mobile")?,
    })
}

fn product_from_row(row: &PgRow) -> MarketResult<Product> {
    let status: String = row.try_get("status")?;
    let status = ProductStatus::parse(&status).ok_or_else(|| {
        MarketError::Internal(anyhow::anyhow!("unknown product status '{}'", status))
    })?;
    Ok(Product {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        price: row.try_get("price")?,
        category: row.try_get("category")?,
        contact_phone: row.try_get("contact_phone")?,
        image_url: row.try_get("image_url")?,
        seller_name: row.try_get("seller_name")?,
        description: row.try_get("description")?,
        status,
        date: row.try_get("created_at")?,
    })
}

fn products_from_rows(rows: &[PgRow]) -> MarketResult<Vec<Product>> {
    rows.iter().map(product_from_row).collect()
}

#[async_trait]
impl MarketStore for PostgresStore {
    async fn ping(&self) -> MarketResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn find_user(&self, username: &str) -> MarketResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(user_from_row).transpose()?)
    }

    async fn insert_user(&self, user: User) -> MarketResult<()> {
        let result = sqlx::query(
            "INSERT INTO users (id, username, password_hash, institute, branch, mobile)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.institute)
        .bind(&user.branch)
        .bind(&user.mobile)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(MarketError::UsernameTaken)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn update_profile_cascade(
        &self,
        username: &str,
        mobile: &str,
        branch: &str,
    ) -> MarketResult<Option<ProfileCascade>> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "UPDATE users SET mobile = $2, branch = $3 WHERE username = $1 RETURNING {}",
            USER_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(username)
            .bind(mobile)
            .bind(branch)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(row) = row else {
            tx.rollback().await?;
            return Ok(None);
        };
        let user = user_from_row(&row)?;

        let products_updated =
            sqlx::query("UPDATE products SET contact_phone = $2 WHERE seller_name = $1")
                .bind(username)
                .bind(mobile)
                .execute(&mut *tx)
                .await?
                .rows_affected();

        tx.commit().await?;
        Ok(Some(ProfileCascade { user, products_updated }))
    }

    async fn insert_product(&self, product: Product) -> MarketResult<()> {
        sqlx::query(
            "INSERT INTO products (id, name, price, category, contact_phone, image_url,
                                   seller_name, description, status, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(product.price)
        .bind(&product.category)
        .bind(&product.contact_phone)
        .bind(&product.image_url)
        .bind(&product.seller_name)
        .bind(&product.description)
        .bind(product.status.as_str())
        .bind(product.date)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_product(&self, id: Uuid) -> MarketResult<Option<Product>> {
        let sql = format!("SELECT {} FROM products WHERE id = $1", PRODUCT_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(product_from_row).transpose()
    }

    async fn list_active(&self, query: &ProductQuery) -> MarketResult<Vec<Product>> {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {} FROM products WHERE status = ", PRODUCT_COLUMNS));
        qb.push_bind(ProductStatus::Active.as_str());
        // strpos keeps the search literal; LIKE would treat % and _ as wildcards.
        if let Some(search) = query.search() {
            qb.push(" AND strpos(lower(name), lower(");
            qb.push_bind(search.to_string());
            qb.push(")) > 0");
        }
        if let Some(category) = query.category() {
            qb.push(" AND category = ");
            qb.push_bind(category.to_string());
        }
        qb.push(" ORDER BY created_at DESC");

        let rows = qb.build().fetch_all(&self.pool).await?;
        products_from_rows(&rows)
    }

    async fn list_by_seller(&self, seller: &str) -> MarketResult<Vec<Product>> {
        let sql = format!(
            "SELECT {} FROM products WHERE seller_name = $1 ORDER BY created_at DESC",
            PRODUCT_COLUMNS
        );
        let rows = sqlx::query(&sql).bind(seller).fetch_all(&self.pool).await?;
        products_from_rows(&rows)
    }

    async fn set_status(&self, id: Uuid, status: ProductStatus) -> MarketResult<bool> {
        let affected = sqlx::query("UPDATE products SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status.as_str())
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(affected > 0)
    }

    async fn update_product(
        &self,
        id: Uuid,
        patch: &ProductPatch,
    ) -> MarketResult<Option<Product>> {
        let sql = format!(
            "UPDATE products
             SET name = COALESCE($2, name),
                 price = COALESCE($3, price),
                 description = COALESCE($4, description)
             WHERE id = $1
             RETURNING {}",
            PRODUCT_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(patch.name.as_deref())
            .bind(patch.price)
            .bind(patch.description.as_deref())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(product_from_row).transpose()
    }

    async fn delete_product(&self, id: Uuid) -> MarketResult<bool> {
        let affected = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(affected > 0)
    }
}
