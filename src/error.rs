//! Error and warning taxonomy per spec.md §7.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use crate::domain::DayIndex;

/// Hard errors: fail fast, no relaxation attempted.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Missing required nurse or unknown shift code in input; fail fast
    /// at load.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Stage-1's hard constraints are unsatisfiable. No automatic
    /// relaxation is attempted.
    #[error("stage-1 infeasible: {0}")]
    Infeasible(String),
}

/// Non-fatal conditions surfaced alongside a successfully produced
/// roster, per spec.md §7's "Stage-2 and Repair recover everything
/// locally" rule.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind")]
pub enum SchedulerWarning {
    /// Stage-2 could not fill a required template slot; the slot was
    /// left empty and later caught by the final off-fill.
    TemplateUnderflow { day: DayIndex, slot: String },
    /// A repair pass terminated with a residual violation.
    RepairFixpoint { nurse: String, day: DayIndex },
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for SchedulerError {
    fn into_response(self) -> Response {
        let status = match &self {
            SchedulerError::Configuration(_) => StatusCode::BAD_REQUEST,
            SchedulerError::Infeasible(_) => StatusCode::UNPROCESSABLE_ENTITY,
        };

        if status.is_server_error() {
            tracing::error!(error = %self, %status, "scheduler error");
        } else {
            tracing::warn!(error = %self, %status, "scheduler error");
        }

        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, axum::Json(body)).into_response()
    }
}
