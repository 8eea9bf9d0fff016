//! Command-line and environment configuration.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use crate::database::Db;
use crate::memory::MemoryStore;
use crate::store::AccountStore;
use crate::Result;

const DEFAULT_FILTER : &str = "account_service=info,warp=info";

/// Storage backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// SQLite database file
    Sqlite,
    /// In-process store, lost on exit
    Memory,
}

/// User account service
#[derive(Parser, Debug)]
#[command(name = "account-service")]
#[command(version)]
pub struct Cli {
    /// Address to listen on
    #[arg(short, long, default_value = "127.0.0.1:8000", env = "ACCOUNTS_LISTEN")]
    pub listen : SocketAddr,

    /// Storage backend to use
    #[arg(short, long, default_value = "sqlite", env = "ACCOUNTS_BACKEND")]
    pub backend : Backend,

    /// SQLite database path (ignored by the memory backend)
    #[arg(long, default_value = "accounts.sqlite3", env = "ACCOUNTS_DB")]
    pub db : PathBuf,
}

impl Cli {
    pub fn open_store(&self) -> Result<Arc<dyn AccountStore>> {
        let store : Arc<dyn AccountStore> = match self.backend {
            Backend::Sqlite => Arc::new(Db::new(&self.db)?),
            Backend::Memory => Arc::new(MemoryStore::new()),
        };

        Ok(store)
    }
}

/// Installs the global `tracing` subscriber. `RUST_LOG` overrides the
/// default filter.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
