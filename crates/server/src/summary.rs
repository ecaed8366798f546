use api_types::{
    ApiResult, PeriodQuery,
    summary::{DailySummaryView, FinancialSummaryView, SummaryEntryView},
};
use axum::{
    Extension, Json,
    extract::{Query, State},
};
use engine::{FinancialSummary, User, check_period};

use crate::{ServerError, server::ServerState};

fn summary_view(summary: FinancialSummary) -> FinancialSummaryView {
    FinancialSummaryView {
        start: summary.start,
        end: summary.end,
        carry_over_minor: summary.carry_over_minor,
        total_income_minor: summary.total_income_minor,
        total_expense_minor: summary.total_expense_minor,
        final_balance_minor: summary.final_balance_minor,
        days: summary
            .days
            .into_iter()
            .map(|day| DailySummaryView {
                date: day.date,
                income_minor: day.income_minor,
                expense_minor: day.expense_minor,
                net_minor: day.net_minor,
                transactions: day
                    .transactions
                    .into_iter()
                    .map(|entry| SummaryEntryView {
                        id: entry.id,
                        kind: entry.kind,
                        date: entry.date.fixed_offset(),
                        description: entry.description,
                        amount_minor: entry.amount_minor,
                    })
                    .collect(),
            })
            .collect(),
    }
}

pub async fn get_summary(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Query(period): Query<PeriodQuery>,
) -> Result<Json<ApiResult<FinancialSummaryView>>, ServerError> {
    check_period(period.start, period.end)?;

    let user_id = user.id.to_string();
    let summary = state
        .engine
        .summary()
        .generate(period.start, period.end, Some(&user_id))
        .await?;

    Ok(Json(ApiResult::ok(summary_view(summary), None)))
}
