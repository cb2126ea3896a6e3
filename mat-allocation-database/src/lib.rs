pub mod error;
pub mod memory;
pub mod models;
pub mod order;
pub mod pg;
pub mod schema;
pub mod store;

use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::{AsyncPgConnection, SimpleAsyncConnection};
pub use error::{DatabaseError, StoreError};
pub use memory::MemoryStore;
pub use pg::PgStore;
pub use store::Store;
use tracing::info;

// https://github.com/tokio-rs/axum/tree/main/examples/diesel-async-postgres

pub type Pool = diesel_async::pooled_connection::deadpool::Pool<AsyncPgConnection>;

const CREATE_TABLES: &str = include_str!("../migrations/2024-06-01-000000_create_tables/up.sql");

pub fn get_database_connection(database_url: &str) -> Result<Pool, DatabaseError> {
    let config = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url);
    Ok(Pool::builder(config).build()?)
}

/// Creates the tables and unique indexes if they do not exist yet.
pub async fn migrate(pool: &Pool) -> Result<(), DatabaseError> {
    // checkout a connection from the pool
    let mut connection = pool.get().await?;
    let connection: &mut AsyncPgConnection = &mut connection;
    connection.batch_execute(CREATE_TABLES).await?;
    info!("database schema is up to date");
    Ok(())
}
