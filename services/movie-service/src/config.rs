use catalog_common::{env_flag, env_or};

#[derive(Clone, Debug)]
pub struct ServiceConfig {
    pub port: u16,
    /// PostgreSQL connection string; without one the in-process store is used.
    pub database_url: Option<String>,
    pub seed_data: bool,
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|value| !value.trim().is_empty());

        Self {
            port: env_or("PORT", 8080u16),
            database_url,
            seed_data: env_flag("SEED_DATA", true),
        }
    }
}
