//! User model and repository trait.
//!
//! Users exist here only as reservation owners; authentication and token
//! handling live outside this workspace.

use crate::error::DbError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Student,
    Admin,
    Technician,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Student => "student",
            UserRole::Admin => "admin",
            UserRole::Technician => "technician",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "student" => Some(UserRole::Student),
            "admin" => Some(UserRole::Admin),
            "technician" => Some(UserRole::Technician),
            _ => None,
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub role: UserRole,
    /// Hash only, and never serialized out of the process.
    #[serde(skip_serializing)]
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub role: UserRole,
    pub password_hash: String,
}

/// Repository for users.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create the backing table if it does not exist.
    async fn init_schema(&self) -> Result<(), DbError>;

    async fn create(&self, new: NewUser) -> Result<User, DbError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DbError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DbError>;

    /// All users, ordered by username.
    async fn list(&self) -> Result<Vec<User>, DbError>;
}
