/// Storage layer for Feedline
///
/// # Modules
///
/// - `storage`: The [`Storage`](storage::Storage) trait every backend implements
/// - `postgres`: PostgreSQL backend over the model queries
/// - `memory`: In-process backend for tests and database-less runs
/// - `pool`: PostgreSQL connection pool management with health checks
/// - `migrations`: Embedded schema migrations
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use feedline_shared::db::{pool::{create_pool, DatabaseConfig}, postgres::PgStorage, storage::Storage};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = DatabaseConfig {
///         url: std::env::var("DATABASE_URL")?,
///         ..Default::default()
///     };
///
///     let pool = create_pool(config).await?;
///     let storage: Arc<dyn Storage> = Arc::new(PgStorage::new(pool));
///     storage.ping().await?;
///     Ok(())
/// }
/// ```

pub mod memory;
pub mod migrations;
pub mod pool;
pub mod postgres;
pub mod storage;
