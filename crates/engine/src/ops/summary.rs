use std::sync::Arc;

use chrono::NaiveDate;

use crate::{EngineError, FinancialSummary, ResultEngine, TransactionStore, summarize};

/// Reject ranges whose start comes after the end.
///
/// The summary itself does not check its range; callers at the boundary run
/// this first.
pub fn check_period(start: NaiveDate, end: NaiveDate) -> ResultEngine<()> {
    if start > end {
        return Err(EngineError::InvalidPeriod(
            "start date cannot be after end date".to_string(),
        ));
    }
    Ok(())
}

pub struct SummaryService {
    store: Arc<dyn TransactionStore>,
}

impl SummaryService {
    pub fn new(store: Arc<dyn TransactionStore>) -> Self {
        Self { store }
    }

    /// Build the summary of `[start, end]` with the carry-over of everything
    /// dated before `start`.
    pub async fn generate(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        user_id: Option<&str>,
    ) -> ResultEngine<FinancialSummary> {
        let in_range = self.store.get_by_period(start, end, user_id).await?;
        let before = match start.pred_opt() {
            Some(day_before) => {
                self.store
                    .get_by_period(NaiveDate::MIN, day_before, user_id)
                    .await?
            }
            None => Vec::new(),
        };

        let summary = summarize(start, end, &in_range, &before)?;
        tracing::debug!(
            "summary {start}..={end}: {} day(s), final balance {}",
            summary.days.len(),
            summary.final_balance_minor
        );
        Ok(summary)
    }
}
