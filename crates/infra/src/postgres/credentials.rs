use std::sync::Arc;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;

use invoicehub_auth::{CredentialStore, Tenant, User};
use invoicehub_core::{DomainResult, TenantId, UserId};

use super::map_sqlx_error;

const TENANT_COLUMNS: &str = "id, name, slug, active, created_at";
const USER_COLUMNS: &str =
    "id, username, email, password_hash, first_name, last_name, tenant_id, active, created_at";

/// Tenants and users in Postgres.
///
/// Uses SQLx connection pool which is thread-safe (Arc + Send + Sync).
#[derive(Debug, Clone)]
pub struct PostgresCredentialStore {
    pool: Arc<PgPool>,
}

impl PostgresCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }

    async fn fetch_tenant(&self, filter: &str, bind: &str) -> DomainResult<Option<Tenant>> {
        let sql = format!("SELECT {TENANT_COLUMNS} FROM tenants WHERE {filter} = $1");
        sqlx::query(&sql)
            .bind(bind)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("fetch_tenant", e))?
            .map(|row| tenant_from_row(&row))
            .transpose()
            .map_err(|e| map_sqlx_error("decode_tenant", e))
    }

    async fn fetch_user(&self, filter: &str, bind: &str) -> DomainResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {filter} = $1");
        sqlx::query(&sql)
            .bind(bind)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("fetch_user", e))?
            .map(|row| user_from_row(&row))
            .transpose()
            .map_err(|e| map_sqlx_error("decode_user", e))
    }

    async fn exists(&self, table: &str, column: &str, value: &str) -> DomainResult<bool> {
        let sql = format!("SELECT EXISTS (SELECT 1 FROM {table} WHERE {column} = $1)");
        sqlx::query_scalar::<_, bool>(&sql)
            .bind(value)
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("exists", e))
    }
}

#[async_trait]
impl CredentialStore for PostgresCredentialStore {
    #[instrument(skip_all, fields(tenant_id = %tenant.id, user_id = %user.id), err)]
    async fn register(&self, tenant: Tenant, user: User) -> DomainResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        sqlx::query(
            r#"
            INSERT INTO tenants (id, name, slug, active, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(tenant.id.as_uuid())
        .bind(&tenant.name)
        .bind(&tenant.slug)
        .bind(tenant.active)
        .bind(tenant.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("insert_tenant", e))?;

        sqlx::query(
            r#"
            INSERT INTO users (
                id, username, email, password_hash, first_name, last_name,
                tenant_id, active, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.tenant_id.as_uuid())
        .bind(user.active)
        .bind(user.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("insert_user", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))
    }

    async fn find_tenant_by_id(&self, id: TenantId) -> DomainResult<Option<Tenant>> {
        let sql = format!("SELECT {TENANT_COLUMNS} FROM tenants WHERE id = $1");
        sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_tenant_by_id", e))?
            .map(|row| tenant_from_row(&row))
            .transpose()
            .map_err(|e| map_sqlx_error("decode_tenant", e))
    }

    async fn find_tenant_by_slug(&self, slug: &str) -> DomainResult<Option<Tenant>> {
        self.fetch_tenant("slug", slug).await
    }

    async fn find_user_by_id(&self, id: UserId) -> DomainResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_user_by_id", e))?
            .map(|row| user_from_row(&row))
            .transpose()
            .map_err(|e| map_sqlx_error("decode_user", e))
    }

    async fn find_user_by_username(&self, username: &str) -> DomainResult<Option<User>> {
        self.fetch_user("username", username).await
    }

    async fn username_taken(&self, username: &str) -> DomainResult<bool> {
        self.exists("users", "username", username).await
    }

    async fn email_taken(&self, email: &str) -> DomainResult<bool> {
        self.exists("users", "email", email).await
    }

    async fn tenant_slug_taken(&self, slug: &str) -> DomainResult<bool> {
        self.exists("tenants", "slug", slug).await
    }

    async fn tenant_name_taken(&self, name: &str) -> DomainResult<bool> {
        self.exists("tenants", "name", name).await
    }
}

fn tenant_from_row(row: &PgRow) -> Result<Tenant, sqlx::Error> {
    Ok(Tenant {
        id: TenantId::from_uuid(row.try_get("id")?),
        name: row.try_get("name")?,
        slug: row.try_get("slug")?,
        active: row.try_get("active")?,
        created_at: row.try_get("created_at")?,
    })
}

fn user_from_row(row: &PgRow) -> Result<User, sqlx::Error> {
    Ok(User {
        id: UserId::from_uuid(row.try_get("id")?),
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        tenant_id: TenantId::from_uuid(row.try_get("tenant_id")?),
        active: row.try_get("active")?,
        created_at: row.try_get("created_at")?,
    })
}
