//! Test utilities for database operations.
//!
//! Provides a throwaway `PostgreSQL` database per test run plus a few row
//! builders, so integration tests can exercise real constraints (unique pairs,
//! cascades, transactions) instead of mocked results.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, DbErr, Set,
    Statement,
};
use tracing::info;

use crate::entities::{board, pin, user};

/// Test database configuration.
#[derive(Debug, Clone)]
pub struct TestDbConfig {
    /// Database host.
    pub host: String,
    /// Database port.
    pub port: u16,
    /// Database username.
    pub username: String,
    /// Database password.
    pub password: String,
    /// Database name.
    pub database: String,
}

impl Default for TestDbConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("TEST_DB_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: std::env::var("TEST_DB_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5433),
            username: std::env::var("TEST_DB_USER")
                .unwrap_or_else(|_| "travelboard_test".to_string()),
            password: std::env::var("TEST_DB_PASSWORD")
                .unwrap_or_else(|_| "travelboard_test".to_string()),
            database: std::env::var("TEST_DB_NAME")
                .unwrap_or_else(|_| "travelboard_test".to_string()),
        }
    }
}

impl TestDbConfig {
    /// Get the database URL.
    #[must_use]
    pub fn database_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database
        )
    }

    /// URL of the maintenance database used to create and drop test databases.
    #[must_use]
    pub fn postgres_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/postgres",
            self.username, self.password, self.host, self.port
        )
    }
}

/// A migrated, uniquely named test database.
pub struct TestDatabase {
    /// Database connection.
    pub conn: DatabaseConnection,
    /// Database configuration.
    pub config: TestDbConfig,
}

impl TestDatabase {
    /// Create a fresh database with a unique name and run all migrations.
    pub async fn create_unique() -> Result<Self, DbErr> {
        let mut config = TestDbConfig::default();
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        config.database = format!("travelboard_test_{}", &suffix[..8]);

        let admin = Database::connect(&config.postgres_url()).await?;
        admin
            .execute(Statement::from_string(
                DatabaseBackend::Postgres,
                format!("CREATE DATABASE \"{}\"", config.database),
            ))
            .await?;
        admin.close().await?;

        let conn = Database::connect(&config.database_url()).await?;

        {
            use sea_orm_migration::MigratorTrait;
            crate::migrations::Migrator::up(&conn, None).await?;
        }

        info!(database = %config.database, "Created test database");

        Ok(Self { conn, config })
    }

    /// Get the database connection.
    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// Close the connection and drop the database.
    pub async fn drop_database(self) -> Result<(), DbErr> {
        self.conn.close().await?;

        let admin = Database::connect(&self.config.postgres_url()).await?;

        // Stray pool connections would block the drop.
        admin
            .execute(Statement::from_string(
                DatabaseBackend::Postgres,
                format!(
                    "SELECT pg_terminate_backend(pid) FROM pg_stat_activity WHERE datname = '{}'",
                    self.config.database
                ),
            ))
            .await
            .ok();

        admin
            .execute(Statement::from_string(
                DatabaseBackend::Postgres,
                format!("DROP DATABASE IF EXISTS \"{}\"", self.config.database),
            ))
            .await?;
        admin.close().await?;

        info!(database = %self.config.database, "Dropped test database");
        Ok(())
    }
}

/// Insert a user row with the given id.
pub async fn insert_user<C: ConnectionTrait>(conn: &C, id: &str) -> Result<user::Model, DbErr> {
    user::ActiveModel {
        id: Set(id.to_string()),
        external_id: Set(format!("ext_{id}")),
        username: Set(id.to_string()),
        first_name: Set(None),
        last_name: Set(None),
        email: Set(None),
        image_url: Set(None),
        created_at: Set(Utc::now().into()),
        updated_at: Set(None),
    }
    .insert(conn)
    .await
}

/// Insert a pin row owned by `user_id`.
pub async fn insert_pin<C: ConnectionTrait>(
    conn: &C,
    id: &str,
    user_id: &str,
    title: &str,
) -> Result<pin::Model, DbErr> {
    pin::ActiveModel {
        id: Set(id.to_string()),
        user_id: Set(user_id.to_string()),
        title: Set(title.to_string()),
        description: Set(None),
        location: Set(None),
        image_url: Set(None),
        link: Set(None),
        created_at: Set(Utc::now().into()),
        updated_at: Set(None),
    }
    .insert(conn)
    .await
}

/// Insert a board row owned by `owner_id`.
pub async fn insert_board<C: ConnectionTrait>(
    conn: &C,
    id: &str,
    owner_id: &str,
    visibility: board::BoardVisibility,
) -> Result<board::Model, DbErr> {
    board::ActiveModel {
        id: Set(id.to_string()),
        owner_id: Set(owner_id.to_string()),
        name: Set(format!("Board {id}")),
        description: Set(None),
        category: Set(None),
        cover_image_url: Set(None),
        visibility: Set(visibility),
        layout: Set(board::BoardLayout::Masonry),
        is_archived: Set(false),
        created_at: Set(Utc::now().into()),
        updated_at: Set(None),
    }
    .insert(conn)
    .await
}
