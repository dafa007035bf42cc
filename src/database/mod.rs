use anyhow::Result;
use sqlx::{PgPool, postgres::PgPoolOptions};

pub mod memory;
pub mod models;
pub mod repositories;
pub mod store;
pub mod transaction;
pub mod utils;

pub use memory::MemoryDatabase;
pub use repositories::{PgDatabase, PgSession};
pub use store::{
    AttendanceStore, Database, EmployeeDirectory, LeaveStore, PayrunStore, SalaryStore, Session,
};

pub async fn init_database(database_url: &str) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    log::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;
    log::info!("Migrations completed successfully");

    Ok(pool)
}
