use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use crate::database::store::{Database, Session, StoreResult};

pub mod attendance;
pub mod employee;
pub mod leave;
pub mod payroll;
pub mod salary;

/// Postgres-backed store. Each session owns one database transaction.
#[derive(Clone)]
pub struct PgDatabase {
    pool: PgPool,
}

impl PgDatabase {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

pub struct PgSession {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl Database for PgDatabase {
    type Session = PgSession;

    async fn begin(&self) -> StoreResult<PgSession> {
        let tx = self.pool.begin().await?;
        Ok(PgSession { tx })
    }
}

#[async_trait]
impl Session for PgSession {
    async fn commit(self) -> StoreResult<()> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> StoreResult<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}
