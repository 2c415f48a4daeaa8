//! Pipeline orchestrator: Calendar + Requests → Stage-1 → Stage-2 →
//! Repair → final roster (spec.md §2). Single-threaded, synchronous, no
//! cancellation (spec.md §5).

use crate::calendar::Calendar;
use crate::config::SchedulerConfig;
use crate::domain::{Request, Roster};
use crate::error::{SchedulerError, SchedulerWarning};
use crate::requests::parse_requests;

/// The result of a full pipeline run: the final roster plus any
/// non-fatal warnings raised by Stage-2 or Repair.
pub struct SolveOutcome {
    pub roster: Roster,
    pub warnings: Vec<SchedulerWarning>,
}

/// Runs the full pipeline against a parsed request list.
pub fn solve(config: &SchedulerConfig, requests: &[Request]) -> Result<SolveOutcome, SchedulerError> {
    let calendar = Calendar::new(config.year, config.month, config.days_in_month);

    tracing::info!(year = config.year, month = config.month, "stage-1: locking structure");
    let mut roster = crate::stage1::run(config, &calendar, requests)?;

    tracing::info!("stage-2: greedy fill");
    let mut warnings = crate::stage2::run(config, &calendar, &mut roster);
    if !warnings.is_empty() {
        tracing::warn!(count = warnings.len(), "stage-2 reported template underflows");
    }

    tracing::info!("repair: streak and balance passes");
    let repair_warnings = crate::repair::run(&mut roster, config.target_rest_score_doubled);
    if !repair_warnings.is_empty() {
        tracing::warn!(count = repair_warnings.len(), "repair reported residual violations");
    }
    warnings.extend(repair_warnings);

    Ok(SolveOutcome { roster, warnings })
}

/// Runs the full pipeline against a raw CSV request matrix, per spec.md
/// §4.2's textual input format.
pub fn solve_from_csv(config: &SchedulerConfig, csv_text: &str) -> Result<SolveOutcome, SchedulerError> {
    let requests = parse_requests(csv_text)?;
    solve(config, &requests)
}
