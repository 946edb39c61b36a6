use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// User record in the database.
///
/// `status` and `password` carry `#[sqlx(default)]` because not every query
/// re-hydrates them: select-by-id returns neither, select-by-status returns
/// status only. `password` is never selected by any read path.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: u64, // 0 until the first successful save
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub date_created: String,
    #[sqlx(default)]
    pub status: String,
    #[serde(skip_serializing)]
    #[sqlx(default)]
    pub password: String, // write-only, not exposed in JSON
}
