//! Domain model for the nurse shift roster.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The closed shift-code alphabet. Every cell in the final roster carries
/// exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShiftCode {
    /// `休` full day off.
    Off,
    /// `夜` night shift.
    Night,
    /// `早` ward early.
    WardEarly,
    /// `残` ward late.
    WardLate,
    /// `〇` ward round.
    WardRound,
    /// `1` weekday outpatient slot 1.
    Outpatient1,
    /// `2` weekday outpatient slot 2.
    Outpatient2,
    /// `3` weekday outpatient slot 3.
    Outpatient3,
    /// `4` weekday outpatient slot 4.
    Outpatient4,
    /// `×` mandatory post-night rest.
    PostNight,
    /// `/訪` home-visit half day, used for `久保`'s second-Thursday duty.
    HomeVisitHalf,
    /// `CT` full CT duty (used when 8 nurses are available).
    Ct,
    /// `早日` day-program-B early duty.
    DayEarly,
    /// `残日` day-program-B late duty.
    DayLate,
    /// `1/` Saturday outpatient slot 1 (also a half-off code).
    SatOutpatient1,
    /// `2/` Saturday outpatient slot 2 (also a half-off code).
    SatOutpatient2,
    /// `3/` Saturday outpatient slot 3 (also a half-off code).
    SatOutpatient3,
    /// `4/` Saturday outpatient slot 4 (also a half-off code).
    SatOutpatient4,
    /// `/休` afternoon half-off.
    OffAfternoonHalf,
    /// `休/` morning half-off.
    OffMorningHalf,
    /// `F` reserved, never produced by any stage.
    Free,
    /// `2・CT` combined CT duty (used when only 7 nurses are available).
    CtWithOutpatient2,
}

/// Scoring/availability category for a [`ShiftCode`]. Looked up rather than
/// inferred from the glyph, since `1/`..`4/` double as both half-off and
/// Saturday-outpatient codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftCategory {
    FullOff,
    HalfOff,
    Night,
    PostNight,
    OutpatientWeekday,
    WardWeekday,
    OutpatientSaturday,
    DayOffDuty,
    Free,
}

impl ShiftCode {
    /// The Japanese glyph this code is rendered as.
    pub fn glyph(self) -> &'static str {
        match self {
            ShiftCode::Off => "休",
            ShiftCode::Night => "夜",
            ShiftCode::WardEarly => "早",
            ShiftCode::WardLate => "残",
            ShiftCode::WardRound => "〇",
            ShiftCode::Outpatient1 => "1",
            ShiftCode::Outpatient2 => "2",
            ShiftCode::Outpatient3 => "3",
            ShiftCode::Outpatient4 => "4",
            ShiftCode::PostNight => "×",
            ShiftCode::HomeVisitHalf => "/訪",
            ShiftCode::Ct => "CT",
            ShiftCode::DayEarly => "早日",
            ShiftCode::DayLate => "残日",
            ShiftCode::SatOutpatient1 => "1/",
            ShiftCode::SatOutpatient2 => "2/",
            ShiftCode::SatOutpatient3 => "3/",
            ShiftCode::SatOutpatient4 => "4/",
            ShiftCode::OffAfternoonHalf => "/休",
            ShiftCode::OffMorningHalf => "休/",
            ShiftCode::Free => "F",
            ShiftCode::CtWithOutpatient2 => "2・CT",
        }
    }

    /// Category tag, used for scoring and availability filtering.
    pub fn category(self) -> ShiftCategory {
        match self {
            ShiftCode::Off | ShiftCode::PostNight => ShiftCategory::FullOff,
            ShiftCode::OffMorningHalf
            | ShiftCode::OffAfternoonHalf
            | ShiftCode::SatOutpatient1
            | ShiftCode::SatOutpatient2
            | ShiftCode::SatOutpatient3
            | ShiftCode::SatOutpatient4
            | ShiftCode::HomeVisitHalf => ShiftCategory::HalfOff,
            ShiftCode::Night => ShiftCategory::Night,
            ShiftCode::Outpatient1
            | ShiftCode::Outpatient2
            | ShiftCode::Outpatient3
            | ShiftCode::Outpatient4
            | ShiftCode::Ct
            | ShiftCode::CtWithOutpatient2 => ShiftCategory::OutpatientWeekday,
            ShiftCode::WardEarly | ShiftCode::WardLate | ShiftCode::WardRound => {
                ShiftCategory::WardWeekday
            }
            ShiftCode::DayEarly | ShiftCode::DayLate => ShiftCategory::DayOffDuty,
            ShiftCode::Free => ShiftCategory::Free,
        }
    }

    /// `true` for the codes in the "busy" set used by Stage-2 Program A/B
    /// to decide whether a cell is off-limits for a fresh assignment.
    /// `busy = {休, 休/, /休, 夜, ×}`.
    pub fn is_busy(self) -> bool {
        matches!(
            self,
            ShiftCode::Off
                | ShiftCode::OffMorningHalf
                | ShiftCode::OffAfternoonHalf
                | ShiftCode::Night
                | ShiftCode::PostNight
        )
    }

    /// `true` for off-codes as used by the repair passes (full-off ∪
    /// half-off, regardless of glyph-overload context).
    pub fn is_off(self) -> bool {
        matches!(self.category(), ShiftCategory::FullOff | ShiftCategory::HalfOff)
    }

    /// Weighted off-score contribution used by the off-allocation policy
    /// (`full-off=2`, `half-off=1`, scaled by 2 relative to spec.md §3's
    /// `full-off=1`/`half-off=0.5` so everything stays integral).
    pub fn off_weight_doubled(self) -> u32 {
        match self.category() {
            ShiftCategory::FullOff => 2,
            ShiftCategory::HalfOff => 1,
            _ => 0,
        }
    }
}

/// Role flags attached to a nurse; static, configured once.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NurseRoles {
    pub night_eligible: bool,
    pub outpatient_eligible: bool,
    pub slot4_eligible: bool,
    pub ct_primary: bool,
    pub ct_backup: bool,
    pub saturday_primary: bool,
    pub holiday_worker: bool,
}

/// A nurse, identified by a stable name, with her static role flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Nurse {
    pub name: String,
    pub roles: NurseRoles,
}

impl Nurse {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            roles: NurseRoles::default(),
        }
    }

    pub fn night_eligible(mut self) -> Self {
        self.roles.night_eligible = true;
        self
    }

    pub fn outpatient_eligible(mut self) -> Self {
        self.roles.outpatient_eligible = true;
        self
    }

    pub fn slot4_eligible(mut self) -> Self {
        self.roles.slot4_eligible = true;
        self
    }

    pub fn ct_primary(mut self) -> Self {
        self.roles.ct_primary = true;
        self
    }

    pub fn ct_backup(mut self) -> Self {
        self.roles.ct_backup = true;
        self
    }

    pub fn saturday_primary(mut self) -> Self {
        self.roles.saturday_primary = true;
        self
    }

    pub fn holiday_worker(mut self) -> Self {
        self.roles.holiday_worker = true;
        self
    }
}

/// Day index within the 31-day scheduling window: 0 corresponds to the
/// 21st of the preceding calendar month.
pub type DayIndex = u32;

/// A preference code from the request matrix, mapped per spec.md §3's
/// preference table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PreferenceCode {
    /// `①` full off.
    FullOff,
    /// `②` full off, night-post-compatible.
    FullOffNightCompatible,
    /// `③` morning half-off.
    MorningHalf,
    /// `④` afternoon half-off.
    AfternoonHalf,
    /// `⑤` afternoon half-off, night-post-compatible.
    AfternoonHalfNightCompatible,
}

impl PreferenceCode {
    /// The forced [`ShiftCode`] per spec.md §3's preference-code table.
    pub fn forced_code(self) -> ShiftCode {
        match self {
            PreferenceCode::FullOff | PreferenceCode::FullOffNightCompatible => ShiftCode::Off,
            PreferenceCode::MorningHalf => ShiftCode::OffMorningHalf,
            PreferenceCode::AfternoonHalf | PreferenceCode::AfternoonHalfNightCompatible => {
                ShiftCode::OffAfternoonHalf
            }
        }
    }

    pub fn from_glyph(glyph: &str) -> Option<Self> {
        match glyph.trim() {
            "①" => Some(PreferenceCode::FullOff),
            "②" => Some(PreferenceCode::FullOffNightCompatible),
            "③" => Some(PreferenceCode::MorningHalf),
            "④" => Some(PreferenceCode::AfternoonHalf),
            "⑤" => Some(PreferenceCode::AfternoonHalfNightCompatible),
            _ => None,
        }
    }
}

/// A single (nurse, day-index, preference-code) request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub nurse: String,
    pub day: DayIndex,
    pub code: PreferenceCode,
}

/// Where a roster cell's value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellOrigin {
    /// Value fixed by Stage-1 (request honoring, mandatory holiday, or
    /// night rotation). Immutable for the rest of the pipeline.
    Locked,
    /// Value assigned by Stage-2's greedy fill.
    Filled,
    /// No value yet; treated as off once Stage-2 completes.
    Empty,
}

/// One (nurse, day) cell of the roster.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Cell {
    pub code: Option<ShiftCode>,
    pub origin: CellOrigin,
}

impl Cell {
    pub const fn empty() -> Self {
        Self {
            code: None,
            origin: CellOrigin::Empty,
        }
    }

    pub fn locked(code: ShiftCode) -> Self {
        Self {
            code: Some(code),
            origin: CellOrigin::Locked,
        }
    }

    pub fn filled(code: ShiftCode) -> Self {
        Self {
            code: Some(code),
            origin: CellOrigin::Filled,
        }
    }

    pub fn is_locked(&self) -> bool {
        self.origin == CellOrigin::Locked
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_none()
    }
}

/// Number of days in a scheduling window (fixed by spec.md for the
/// reference data, but kept as a configuration constant).
pub const DAYS_IN_MONTH: usize = 31;

/// A dense (nurse × day) roster table. Nurse order is stable (insertion
/// order of the nurse roster it was built from).
#[derive(Debug, Clone)]
pub struct Roster {
    nurse_index: Vec<String>,
    days: usize,
    cells: Vec<Cell>,
}

impl Roster {
    pub fn new(nurses: &[Nurse], days: usize) -> Self {
        let nurse_index: Vec<String> = nurses.iter().map(|n| n.name.clone()).collect();
        let cells = vec![Cell::empty(); nurse_index.len() * days];
        Self {
            nurse_index,
            days,
            cells,
        }
    }

    pub fn nurses(&self) -> &[String] {
        &self.nurse_index
    }

    pub fn days(&self) -> usize {
        self.days
    }

    pub fn nurse_position(&self, name: &str) -> Option<usize> {
        self.nurse_index.iter().position(|n| n == name)
    }

    fn index(&self, nurse: usize, day: usize) -> usize {
        nurse * self.days + day
    }

    pub fn get(&self, nurse: usize, day: usize) -> Cell {
        self.cells[self.index(nurse, day)]
    }

    pub fn get_by_name(&self, nurse: &str, day: usize) -> Option<Cell> {
        self.nurse_position(nurse).map(|i| self.get(i, day))
    }

    pub fn set(&mut self, nurse: usize, day: usize, cell: Cell) {
        let idx = self.index(nurse, day);
        self.cells[idx] = cell;
    }

    /// Sets a cell unless it is already locked (Stage-1's output is
    /// immutable for the rest of the pipeline).
    pub fn set_if_unlocked(&mut self, nurse: usize, day: usize, cell: Cell) -> bool {
        if self.get(nurse, day).is_locked() {
            return false;
        }
        self.set(nurse, day, cell);
        true
    }

    /// Timeline of a single nurse's cells across all days.
    pub fn timeline(&self, nurse: usize) -> Vec<Cell> {
        (0..self.days).map(|d| self.get(nurse, d)).collect()
    }

    /// Weighted off-score for a nurse, doubled to stay integral
    /// (`full-off=2`, `half-off=1`), matching spec.md §9's scoring
    /// convention where `×` counts as full-off.
    pub fn weighted_off_score_doubled(&self, nurse: usize) -> u32 {
        (0..self.days)
            .filter_map(|d| self.get(nurse, d).code)
            .map(ShiftCode::off_weight_doubled)
            .sum()
    }

    /// Every cell that is still empty after Stage-2 is treated as off
    /// for invariant purposes, but is only materialized as `休` by
    /// Repair's final fallback pass.
    pub fn all_nurse_indices(&self) -> std::ops::Range<usize> {
        0..self.nurse_index.len()
    }

    pub fn code_counts(&self) -> HashSet<ShiftCode> {
        self.cells.iter().filter_map(|c| c.code).collect()
    }
}
