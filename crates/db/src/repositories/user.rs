//! User repository.

use std::sync::Arc;

use crate::entities::{User, user};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use travelboard_common::{AppError, AppResult};

use super::{contains_pattern, lower_like};

/// User repository for database operations.
#[derive(Clone)]
pub struct UserRepository {
    db: Arc<DatabaseConnection>,
}

impl UserRepository {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<user::Model>> {
        User::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<user::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User: {id}")))
    }

    /// Find the user linked to an identity provider account.
    pub async fn find_by_external_id(&self, external_id: &str) -> AppResult<Option<user::Model>> {
        User::find()
            .filter(user::Column::ExternalId.eq(external_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Users with the given IDs, in no particular order.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<user::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        User::find()
            .filter(user::Column::Id.is_in(ids.iter().map(String::as_str)))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user by username.
    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<user::Model>> {
        User::find()
            .filter(user::Column::Username.eq(username))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check whether a username is taken.
    pub async fn username_exists(&self, username: &str) -> AppResult<bool> {
        let count = User::find()
            .filter(user::Column::Username.eq(username))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(count > 0)
    }

    /// Insert a user unless one with the same external id already exists.
    ///
    /// Returns `false` when another request provisioned the account first.
    pub async fn insert_if_absent(&self, model: user::ActiveModel) -> AppResult<bool> {
        let inserted = User::insert(model)
            .on_conflict(
                OnConflict::column(user::Column::ExternalId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(inserted > 0)
    }

    /// Case-insensitive substring search over username and names.
    ///
    /// Results keep insertion order.
    pub async fn search(&self, query: &str, limit: u64) -> AppResult<Vec<user::Model>> {
        let pattern = contains_pattern(query);

        User::find()
            .filter(
                Condition::any()
                    .add(lower_like(user::Column::Username, &pattern))
                    .add(lower_like(user::Column::FirstName, &pattern))
                    .add(lower_like(user::Column::LastName, &pattern)),
            )
            .order_by_asc(user::Column::CreatedAt)
            .order_by_asc(user::Column::Id)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Set};

    fn create_test_user(id: &str, username: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            external_id: format!("ext_{id}"),
            username: username.to_string(),
            first_name: Some("Aiko".to_string()),
            last_name: None,
            email: None,
            image_url: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_find_by_external_id() {
        let user = create_test_user("user1", "aiko");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user.clone()]])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        let result = repo.find_by_external_id("ext_user1").await.unwrap();

        assert_eq!(result.unwrap().username, "aiko");
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        let result = repo.get_by_id("missing").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_insert_if_absent_reports_lost_race() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        let model = user::ActiveModel {
            id: Set("user1".to_string()),
            external_id: Set("ext_user1".to_string()),
            username: Set("aiko".to_string()),
            first_name: Set(None),
            last_name: Set(None),
            email: Set(None),
            image_url: Set(None),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        assert!(!repo.insert_if_absent(model).await.unwrap());
    }

    #[tokio::test]
    async fn test_search() {
        let users = vec![
            create_test_user("user1", "kyoto_fan"),
            create_test_user("user2", "kyotoite"),
        ];

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([users])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        let result = repo.search("Kyoto", 5).await.unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].id, "user1");
    }
}
