use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use crate::store::{MemoryStudentStore, PgStudentStore, StudentStore};

/// Student registration HTTP API.
#[derive(Debug, Clone, Parser)]
#[command(name = "student-registry", version, about)]
pub struct Config {
    /// Address the HTTP server listens on.
    #[arg(long, env = "REGISTRY_BIND", default_value = "127.0.0.1:3000")]
    pub bind: SocketAddr,

    /// Path of the single API endpoint.
    #[arg(long, env = "REGISTRY_ENDPOINT", default_value = "/register")]
    pub endpoint: String,

    /// Postgres connection string. Without it records live in memory.
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    #[arg(long, env = "REGISTRY_DB_MAX_CONNECTIONS", default_value_t = 5)]
    pub max_connections: u32,

    /// Seconds to wait for a pooled connection before failing the request.
    #[arg(long, env = "REGISTRY_DB_ACQUIRE_TIMEOUT", default_value_t = 5)]
    pub acquire_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 3000)),
            endpoint: "/register".to_string(),
            database_url: None,
            max_connections: 5,
            acquire_timeout_secs: 5,
        }
    }
}

impl Config {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    pub fn open_store(&self) -> anyhow::Result<Arc<dyn StudentStore>> {
        match &self.database_url {
            Some(url) => Ok(Arc::new(PgStudentStore::connect_lazy(
                url,
                self.max_connections,
                self.acquire_timeout(),
            )?)),
            None => {
                log::warn!("DATABASE_URL not set, registrations are kept in memory only");
                Ok(Arc::new(MemoryStudentStore::new()))
            }
        }
    }
}
