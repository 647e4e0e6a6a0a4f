pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod store;

pub use config::{Config, StoreBackend};
pub use db::DbPool;
pub use routes::{create_router, AppState};
pub use store::{MemoryUserStore, PgUserStore, StoreError, UserStore};
