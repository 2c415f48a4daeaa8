//! DTOs for the REST API (spec.md §6's external interfaces).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{PreferenceCode, Request, ShiftCode};
use crate::error::SchedulerWarning;

/// A single preferred-off request in request/response payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDto {
    pub nurse: String,
    pub day: u32,
    pub code: String,
}

impl RequestDto {
    pub fn to_domain(&self) -> Option<Request> {
        PreferenceCode::from_glyph(&self.code).map(|code| Request {
            nurse: self.nurse.clone(),
            day: self.day,
            code,
        })
    }
}

impl From<&Request> for RequestDto {
    fn from(r: &Request) -> Self {
        Self {
            nurse: r.nurse.clone(),
            day: r.day,
            code: match r.code {
                PreferenceCode::FullOff => "①",
                PreferenceCode::FullOffNightCompatible => "②",
                PreferenceCode::MorningHalf => "③",
                PreferenceCode::AfternoonHalf => "④",
                PreferenceCode::AfternoonHalfNightCompatible => "⑤",
            }
            .to_string(),
        }
    }
}

/// `POST /schedules` request body: an optional PRNG seed override plus
/// either raw request-matrix CSV text or a pre-parsed request list.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRequestDto {
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub requests_csv: Option<String>,
    #[serde(default)]
    pub requests: Option<Vec<RequestDto>>,
}

/// Numeric outpatient codes (`1`..`4`) serialize as JSON integers for
/// spreadsheet recognition; every other code serializes as its literal
/// glyph (spec.md §6).
pub fn cell_value(code: ShiftCode) -> Value {
    match code {
        ShiftCode::Outpatient1 => Value::from(1),
        ShiftCode::Outpatient2 => Value::from(2),
        ShiftCode::Outpatient3 => Value::from(3),
        ShiftCode::Outpatient4 => Value::from(4),
        other => Value::from(other.glyph()),
    }
}

/// One row of the full roster table.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterRowDto {
    pub nurse: String,
    pub days: Vec<Value>,
}

/// One row of the summary table: the roster row plus the weighted
/// off-count trailing column (`休み合計`).
#[derive(Debug, Clone, Serialize)]
pub struct SummaryRowDto {
    pub nurse: String,
    pub days: Vec<Value>,
    #[serde(rename = "休み合計")]
    pub off_total: f64,
}

/// `POST /schedules` / `GET /schedules/{id}` response body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleResponseDto {
    pub roster: Vec<RosterRowDto>,
    pub summary: Vec<SummaryRowDto>,
    pub warnings: Vec<SchedulerWarning>,
}

impl ScheduleResponseDto {
    pub fn from_roster(roster: &crate::domain::Roster, warnings: &[SchedulerWarning]) -> Self {
        let roster_rows = roster
            .nurses()
            .iter()
            .enumerate()
            .map(|(n, name)| RosterRowDto {
                nurse: name.clone(),
                days: (0..roster.days())
                    .map(|d| cell_value(roster.get(n, d).code.unwrap_or(ShiftCode::Off)))
                    .collect(),
            })
            .collect();

        let summary_rows = roster
            .nurses()
            .iter()
            .enumerate()
            .map(|(n, name)| SummaryRowDto {
                nurse: name.clone(),
                days: (0..roster.days())
                    .map(|d| cell_value(roster.get(n, d).code.unwrap_or(ShiftCode::Off)))
                    .collect(),
                off_total: roster.weighted_off_score_doubled(n) as f64 / 2.0,
            })
            .collect();

        Self {
            roster: roster_rows,
            summary: summary_rows,
            warnings: warnings.to_vec(),
        }
    }
}
