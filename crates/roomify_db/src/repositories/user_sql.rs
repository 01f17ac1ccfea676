//! SQL implementation of the user repository.

use crate::error::DbError;
use crate::repositories::parse_uuid;
use crate::repositories::user::{NewUser, User, UserRepository, UserRole};
use crate::DbClient;
use async_trait::async_trait;
use sqlx::any::AnyRow;
use sqlx::Row;
use tracing::{debug, error};
use uuid::Uuid;

/// SQL implementation of the user repository.
#[derive(Debug, Clone)]
pub struct SqlUserRepository {
    db_client: DbClient,
}

impl SqlUserRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }
}

const USER_COLUMNS: &str = "id, username, full_name, email, role, password_hash";

fn user_from_row(row: &AnyRow) -> Result<User, DbError> {
    let id: String = row.try_get("id")?;
    let role: String = row.try_get("role")?;

    Ok(User {
        id: parse_uuid("id", &id)?,
        username: row.try_get("username")?,
        full_name: row.try_get("full_name")?,
        email: row.try_get("email")?,
        role: UserRole::parse(&role)
            .ok_or_else(|| DbError::CorruptRow(format!("unknown user role '{role}'")))?,
        password_hash: row.try_get("password_hash")?,
    })
}

#[async_trait]
impl UserRepository for SqlUserRepository {
    async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing user schema");

        let query = r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                username TEXT NOT NULL UNIQUE,
                full_name TEXT NOT NULL,
                email TEXT NOT NULL,
                role TEXT NOT NULL,
                password_hash TEXT NOT NULL
            )
        "#;

        self.db_client.execute(query).await?;
        Ok(())
    }

    async fn create(&self, new: NewUser) -> Result<User, DbError> {
        let user = User {
            id: Uuid::new_v4(),
            username: new.username,
            full_name: new.full_name,
            email: new.email,
            role: new.role,
            password_hash: new.password_hash,
        };

        debug!("Creating user: {}", user.username);

        let query = r#"
            INSERT INTO users (id, username, full_name, email, role, password_hash)
            VALUES ($1, $2, $3, $4, $5, $6)
        "#;

        sqlx::query(query)
            .bind(user.id.to_string())
            .bind(&user.username)
            .bind(&user.full_name)
            .bind(&user.email)
            .bind(user.role.as_str())
            .bind(&user.password_hash)
            .execute(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to insert user: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DbError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");

        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(|e| DbError::QueryError(e.to_string()))?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DbError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1");

        let row = sqlx::query(&query)
            .bind(username)
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(|e| DbError::QueryError(e.to_string()))?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn list(&self) -> Result<Vec<User>, DbError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users ORDER BY username ASC");

        let rows = sqlx::query(&query)
            .fetch_all(self.db_client.pool())
            .await
            .map_err(|e| DbError::QueryError(e.to_string()))?;

        rows.iter().map(user_from_row).collect()
    }
}
