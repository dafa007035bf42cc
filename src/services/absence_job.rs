use std::time::Duration;

use chrono::{NaiveDate, Utc};
use tokio::task::JoinHandle;

use super::attendance;
use crate::database::store::{Database, EmployeeDirectory};
use crate::database::transaction;
use crate::error::AppError;

/// Periodically marks employees absent for the previous day in every company.
pub struct AbsenceJob<D: Database> {
    db: D,
    interval: Duration,
}

impl<D: Database> AbsenceJob<D> {
    pub fn new(db: D, interval: Duration) -> Self {
        Self { db, interval }
    }

    /// Marks absences for the day before `today`. A failing company is logged
    /// and skipped. Returns the number of rows inserted.
    pub async fn run_once(&self, today: NaiveDate) -> Result<i64, AppError> {
        let Some(date) = today.pred_opt() else {
            return Ok(0);
        };

        let company_ids = transaction::run(&self.db, |session| {
            Box::pin(async move { session.list_company_ids().await })
        })
        .await?;

        let mut total = 0;
        for company_id in company_ids {
            let result = transaction::run(&self.db, move |session| {
                Box::pin(async move { attendance::mark_absent(session, company_id, date).await })
            })
            .await;

            match result {
                Ok(marking) => total += marking.marked_absent,
                Err(err) => log::error!(
                    "Absence marking failed for company {} on {}: {}",
                    company_id,
                    date,
                    err
                ),
            }
        }
        Ok(total)
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            log::info!("Absence job scheduled every {:?}", self.interval);
            loop {
                ticker.tick().await;
                match self.run_once(Utc::now().date_naive()).await {
                    Ok(marked) => log::info!("Absence job marked {} employees absent", marked),
                    Err(err) => log::error!("Absence job failed: {}", err),
                }
            }
        })
    }
}
