use sqlx::MySqlPool;
use tracing::{error, warn};

use crate::errors::ApiError;
use crate::users::repo_types::User;

/// Data access for the `users` table. Holds a clone of the shared pool;
/// safe to use from any number of concurrent handlers.
pub struct UserRepository {
    db: MySqlPool,
}

impl UserRepository {
    pub fn new(db: MySqlPool) -> Self {
        Self { db }
    }

    /// Look up a single user by id. `status` and `password` are not
    /// re-hydrated by this query.
    pub async fn get(&self, id: u64) -> Result<User, ApiError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, first_name, last_name, email, date_created
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_one(&self.db)
        .await
        .map_err(|e| match e {
            e @ sqlx::Error::RowNotFound => {
                warn!(id, error = %e, "user not found");
                ApiError::NotFound(format!("user {} not found", id))
            }
            e => db_error("get user by id", e),
        })?;
        Ok(user)
    }

    /// Like `get`, but hydrates `status` as well. The overwrite flows use
    /// this so a partial update has the stored status to fall back on.
    pub async fn get_with_status(&self, id: u64) -> Result<User, ApiError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, first_name, last_name, email, date_created, status
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_one(&self.db)
        .await
        .map_err(|e| match e {
            e @ sqlx::Error::RowNotFound => {
                warn!(id, error = %e, "user not found");
                ApiError::NotFound(format!("user {} not found", id))
            }
            e => db_error("get user for update", e),
        })?;
        Ok(user)
    }

    /// Insert a new user and write the generated id back onto the entity.
    /// This is the only path that assigns `id`.
    pub async fn save(&self, user: &mut User) -> Result<(), ApiError> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (first_name, last_name, email, date_created, status, password)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.date_created)
        .bind(&user.status)
        .bind(&user.password)
        .execute(&self.db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                warn!(email = %user.email, "duplicate email on save");
                ApiError::Conflict(format!("email {} already exists", user.email))
            } else {
                db_error("save user", e)
            }
        })?;

        user.id = result.last_insert_id();
        Ok(())
    }

    /// Overwrite the mutable fields for the row matching `user.id`.
    /// An unmatched id is not an error: the affected-row count is not
    /// checked, so the caller cannot tell "updated" from "no such id".
    pub async fn update(&self, user: &User) -> Result<(), ApiError> {
        sqlx::query(
            r#"
            UPDATE users
            SET first_name = ?, last_name = ?, email = ?, status = ?
            WHERE id = ?
            "#,
        )
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.status)
        .bind(user.id)
        .execute(&self.db)
        .await
        .map_err(|e| db_error("update user", e))?;
        Ok(())
    }

    /// Remove the row matching `id`. Same affected-row-count gap as
    /// `update`: deleting a missing id succeeds.
    pub async fn delete(&self, id: u64) -> Result<(), ApiError> {
        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.db)
            .await
            .map_err(|e| db_error("delete user", e))?;
        Ok(())
    }

    /// Every user whose status matches. An empty result is NotFound, not an
    /// empty list; callers rely on that.
    pub async fn find_by_status(&self, status: &str) -> Result<Vec<User>, ApiError> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, first_name, last_name, email, date_created, status
            FROM users
            WHERE status = ?
            "#,
        )
        .bind(status)
        .fetch_all(&self.db)
        .await
        .map_err(|e| db_error("find users by status", e))?;

        if users.is_empty() {
            return Err(ApiError::NotFound(format!(
                "no users matching status {}",
                status
            )));
        }
        Ok(users)
    }
}

/// Log the raw driver error and hand the caller the generic classification.
fn db_error(op: &str, e: sqlx::Error) -> ApiError {
    error!(error = %e, "error when trying to {}", op);
    ApiError::Internal
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    match e.as_database_error() {
        Some(db) => {
            matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation)
                // fallback for drivers that only expose the index name
                || db.message().contains("email_UNIQUE")
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_error_is_always_internal() {
        let err = db_error("save user", sqlx::Error::PoolTimedOut);
        assert!(matches!(err, ApiError::Internal));
        assert_eq!(err.to_string(), "database error");
    }

    #[test]
    fn row_not_found_is_not_a_unique_violation() {
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
        assert!(!is_unique_violation(&sqlx::Error::PoolTimedOut));
    }
}
