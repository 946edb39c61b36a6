use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        // DATABASE_URL wins; otherwise the URL is assembled from the split
        // MYSQL_USERS_* variables.
        let database_url = match std::env::var("DATABASE_URL") {
            Ok(url) => url,
            Err(_) => {
                let username = std::env::var("MYSQL_USERS_USERNAME")?;
                let password = std::env::var("MYSQL_USERS_PASSWORD")?;
                let host = std::env::var("MYSQL_USERS_HOST")?;
                let schema = std::env::var("MYSQL_USERS_SCHEMA")?;
                format!("mysql://{}:{}@{}/{}", username, password, host, schema)
            }
        };
        Ok(Self { database_url })
    }
}
