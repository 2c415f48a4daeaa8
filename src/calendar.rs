//! Calendar: maps a day-index in 0..31 to a real date, weekday, holiday
//! status, and day-program, per spec.md §4.1. Day 0 is always the 21st of
//! `month - 1`.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::domain::DayIndex;

/// Weekday-driven fill template; Stage-2 dispatches on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayProgram {
    /// Mon/Tue/Wed/Fri, non-holiday: full staffing weekday.
    A,
    /// Thu/Sun or national holiday: skeleton day-duty only.
    B,
    /// Saturday: outpatient-only.
    C,
}

/// A single resolved calendar day.
#[derive(Debug, Clone, Copy)]
pub struct CalendarDay {
    pub day_index: DayIndex,
    pub date: NaiveDate,
    pub weekday: Weekday,
    pub is_holiday: bool,
    pub program: DayProgram,
}

/// The 31-day scheduling window for a given (year, month) configuration.
pub struct Calendar {
    days: Vec<CalendarDay>,
}

impl Calendar {
    /// Builds the window starting at the 21st of `month - 1` in `year`,
    /// covering `days_in_month` consecutive days.
    pub fn new(year: i32, month: u32, days_in_month: usize) -> Self {
        let start = start_date(year, month);
        let days = (0..days_in_month)
            .map(|i| {
                let date = start + Duration::days(i as i64);
                let weekday = date.weekday();
                let is_holiday = is_national_holiday(date) || national_bridging_day(date);
                let program = day_program(weekday, is_holiday);
                CalendarDay {
                    day_index: i as DayIndex,
                    date,
                    weekday,
                    is_holiday,
                    program,
                }
            })
            .collect();
        Self { days }
    }

    pub fn day(&self, index: DayIndex) -> CalendarDay {
        self.days[index as usize]
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CalendarDay> {
        self.days.iter()
    }

    /// The day-index of the second Thursday in the window, if any — used
    /// by Stage-1's `久保` special case.
    pub fn second_thursday(&self) -> Option<DayIndex> {
        self.days
            .iter()
            .filter(|d| d.weekday == Weekday::Thu)
            .nth(1)
            .map(|d| d.day_index)
    }
}

fn start_date(year: i32, month: u32) -> NaiveDate {
    let (prev_year, prev_month) = if month == 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    };
    NaiveDate::from_ymd_opt(prev_year, prev_month, 21).expect("valid configured (year, month)")
}

fn day_program(weekday: Weekday, is_holiday: bool) -> DayProgram {
    if is_holiday || matches!(weekday, Weekday::Thu | Weekday::Sun) {
        DayProgram::B
    } else if weekday == Weekday::Sat {
        DayProgram::C
    } else {
        DayProgram::A
    }
}

/// `true` if `date` falls on one of the Japanese national holidays
/// (fixed-date, Happy-Monday, or equinox), not counting bridging days or
/// substitute holidays — those are layered on separately below.
pub fn is_national_holiday(date: NaiveDate) -> bool {
    fixed_holiday(date) || happy_monday_holiday(date) || equinox_holiday(date) || substitute_holiday(date)
}

fn fixed_holiday(date: NaiveDate) -> bool {
    let year = date.year();
    matches!(
        (date.month(), date.day()),
        (1, 1)   // 元日
        | (2, 11) // 建国記念の日
        | (4, 29) // 昭和の日
        | (5, 3)  // 憲法記念日
        | (5, 4)  // みどりの日
        | (5, 5)  // こどもの日
        | (8, 11) // 山の日
        | (11, 3) // 文化の日
        | (11, 23) // 勤労感謝の日
    ) || emperors_birthday(date, year)
}

fn emperors_birthday(date: NaiveDate, year: i32) -> bool {
    if year >= 2020 {
        date.month() == 2 && date.day() == 23
    } else if year >= 1989 {
        date.month() == 12 && date.day() == 23
    } else {
        false
    }
}

/// Nth-weekday-of-month helper: the `week`th occurrence (1-indexed) of
/// `weekday` in `year`/`month`, or `None` if the month doesn't have that
/// many occurrences.
fn week_day(year: i32, month: u32, week: u32, weekday: Weekday) -> Option<NaiveDate> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let offset = (7 + weekday.num_days_from_monday() as i64
        - first.weekday().num_days_from_monday() as i64)
        % 7;
    let first_occurrence = first + Duration::days(offset);
    let candidate = first_occurrence + Duration::days(7 * (week as i64 - 1));
    if candidate.month() == month {
        Some(candidate)
    } else {
        None
    }
}

fn happy_monday_holiday(date: NaiveDate) -> bool {
    let year = date.year();
    let targets = [
        week_day(year, 1, 2, Weekday::Mon),  // 成人の日
        week_day(year, 7, 3, Weekday::Mon),  // 海の日
        week_day(year, 9, 3, Weekday::Mon),  // 敬老の日
        week_day(year, 10, 2, Weekday::Mon), // スポーツの日
    ];
    targets.into_iter().flatten().any(|d| d == date)
}

/// `⌊20.8431 + 0.242194·(y−1980) − ⌊(y−1980)/4⌋⌋`, per spec.md §4.1.
fn vernal_equinox_day(year: i32) -> u32 {
    let y = (year - 1980) as f64;
    (20.8431 + 0.242194 * y - (y / 4.0).floor()).floor() as u32
}

/// The analogous autumn constant from spec.md §4.1.
fn autumnal_equinox_day(year: i32) -> u32 {
    let y = (year - 1980) as f64;
    (23.2488 + 0.242194 * y - (y / 4.0).floor()).floor() as u32
}

fn equinox_holiday(date: NaiveDate) -> bool {
    let year = date.year();
    (date.month() == 3 && date.day() == vernal_equinox_day(year))
        || (date.month() == 9 && date.day() == autumnal_equinox_day(year))
}

/// The next non-holiday weekday after a Sunday holiday becomes a
/// substitute holiday (振替休日). We walk backward from `date` looking for
/// a Sunday holiday whose substitute lands on `date`.
fn substitute_holiday(date: NaiveDate) -> bool {
    if date.weekday() == Weekday::Sun {
        return false;
    }
    let mut cursor = date - Duration::days(1);
    loop {
        if cursor.weekday() != Weekday::Sun {
            return false;
        }
        if fixed_holiday(cursor) || happy_monday_holiday(cursor) || equinox_holiday(cursor) {
            return true;
        }
        cursor -= Duration::days(1);
    }
}

/// National bridging day (国民の休日): a weekday strictly between two
/// holidays, skipping Sundays. No direct grounding source in the
/// retrieval pack; implemented from spec.md's textual rule.
fn national_bridging_day(date: NaiveDate) -> bool {
    if date.weekday() == Weekday::Sun {
        return false;
    }
    let base_holiday =
        |d: NaiveDate| fixed_holiday(d) || happy_monday_holiday(d) || equinox_holiday(d);
    if base_holiday(date) {
        return false;
    }
    base_holiday(date - Duration::days(1)) && base_holiday(date + Duration::days(1))
}
