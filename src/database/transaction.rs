use std::future::Future;
use std::pin::Pin;

use crate::database::store::{Database, Session};
use crate::error::AppError;

pub type SessionFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, AppError>> + Send + 'a>>;

/// Run a closure inside one session, committing on success and rolling back on error.
pub async fn run<D, T, F>(db: &D, f: F) -> Result<T, AppError>
where
    D: Database,
    F: for<'a> FnOnce(&'a mut D::Session) -> SessionFuture<'a, T>,
    T: Send,
{
    let mut session = db.begin().await?;

    match f(&mut session).await {
        Ok(value) => {
            session.commit().await?;
            Ok(value)
        }
        Err(err) => {
            log::warn!("Transaction failed with error: {}, rolling back", err);
            if let Err(rollback_err) = session.rollback().await {
                log::error!(
                    "Rollback failed after error (orig: {}, rollback: {})",
                    err,
                    rollback_err
                );
            }
            Err(err)
        }
    }
}
