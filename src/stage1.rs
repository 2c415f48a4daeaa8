//! Stage-1 Solver: locks the structurally-hardest decisions (spec.md
//! §4.3) — mandatory holiday offs, preferred-off honoring, and the
//! night-shift rotation with next-day `×` pairing.
//!
//! Mandatory-holiday and preferred-off fixes are deterministic rule
//! lookups (no search is needed: each cell's value follows directly from
//! the calendar and the request list). The night rotation is the one
//! genuinely globally-coupled decision — one nurse per day, banded
//! per-nurse totals, locked-day exclusions — and is posted as a
//! finite-domain model to `selen`, following `optimize_1.py`'s
//! `ortools.sat.python.cp_model` heritage.

use selen::prelude::*;
use std::collections::HashMap;

use crate::calendar::Calendar;
use crate::config::SchedulerConfig;
use crate::domain::{Cell, Request, Roster, ShiftCode};
use crate::error::SchedulerError;

const HOLIDAY_NO_WORKERS: [&str; 4] = ["久保", "小嶋", "久保（千）", "田浦"];

/// Runs Stage-1, returning a roster with night/post-night,
/// preferred-off, and mandatory-holiday cells locked; all other cells
/// remain empty.
pub fn run(
    config: &SchedulerConfig,
    calendar: &Calendar,
    requests: &[Request],
) -> Result<Roster, SchedulerError> {
    let mut roster = Roster::new(&config.nurses, config.days_in_month);

    apply_mandatory_holidays(config, calendar, &mut roster);
    apply_preferred_off(config, &mut roster, requests)?;
    apply_night_rotation(config, calendar, &mut roster)?;

    Ok(roster)
}

fn apply_mandatory_holidays(config: &SchedulerConfig, calendar: &Calendar, roster: &mut Roster) {
    let second_thursday = calendar.second_thursday();

    for day in calendar.iter() {
        if !matches!(day.weekday, chrono::Weekday::Thu | chrono::Weekday::Sun) {
            continue;
        }
        for &name in HOLIDAY_NO_WORKERS.iter() {
            let Some(idx) = roster.nurse_position(name) else {
                continue;
            };
            let code = if name == "久保" && Some(day.day_index) == second_thursday {
                ShiftCode::HomeVisitHalf
            } else {
                ShiftCode::Off
            };
            roster.set(idx, day.day_index as usize, Cell::locked(code));
        }
    }
}

fn apply_preferred_off(
    config: &SchedulerConfig,
    roster: &mut Roster,
    requests: &[Request],
) -> Result<(), SchedulerError> {
    for request in requests {
        let Some(idx) = roster.nurse_position(&request.nurse) else {
            return Err(SchedulerError::Configuration(format!(
                "unknown nurse in request: {}",
                request.nurse
            )));
        };
        if (request.day as usize) >= config.days_in_month {
            return Err(SchedulerError::Configuration(format!(
                "request day {} outside scheduling window",
                request.day
            )));
        }
        // Mandatory-holiday fixes take priority when they collide with a
        // preferred-off request on the same cell.
        roster.set_if_unlocked(
            idx,
            request.day as usize,
            Cell::locked(request.code.forced_code()),
        );
    }
    Ok(())
}

fn apply_night_rotation(
    config: &SchedulerConfig,
    calendar: &Calendar,
    roster: &mut Roster,
) -> Result<(), SchedulerError> {
    let night_nurses: Vec<usize> = config
        .nurses
        .iter()
        .enumerate()
        .filter(|(_, n)| n.roles.night_eligible)
        .map(|(i, _)| i)
        .collect();

    if night_nurses.is_empty() {
        return Err(SchedulerError::Configuration(
            "no night-eligible nurses configured".to_string(),
        ));
    }

    let days = calendar.len();
    let band_lo = (days as u32) / crate::config::NIGHT_ROTATION_BAND;
    let band_hi = band_lo + 1;

    let mut model = Model::default();
    // night_vars[d][n] = 1 iff nurse night_nurses[n] takes 夜 on day d.
    let mut night_vars: HashMap<(usize, usize), VarId> = HashMap::new();

    for &nurse in &night_nurses {
        for d in 0..days {
            let locked_today = roster.get(nurse, d).is_locked();
            let locked_tomorrow_conflict = d + 1 < days
                && roster.get(nurse, d + 1).is_locked()
                && roster.get(nurse, d + 1).code != Some(ShiftCode::PostNight);
            let var = if locked_today || locked_tomorrow_conflict {
                model.int(0, 0)
            } else {
                model.int(0, 1)
            };
            night_vars.insert((d, nurse), var);
        }
    }

    // Exactly one nurse per day.
    for d in 0..days {
        let vars: Vec<VarId> = night_nurses.iter().map(|&n| night_vars[&(d, n)]).collect();
        model.c(model.sum(&vars)).eq(int(1));
    }

    // Per-nurse total within [band_lo, band_hi].
    for &nurse in &night_nurses {
        let vars: Vec<VarId> = (0..days).map(|d| night_vars[&(d, nurse)]).collect();
        model.c(model.sum(&vars)).ge(int(band_lo as i32));
        model.c(model.sum(&vars)).le(int(band_hi as i32));
    }

    // No nurse takes 夜 on two consecutive days: spec.md §4.3 item 3 fixes
    // `x[n,d+1,×] = x[n,d,夜]`, so the night variable itself must be
    // pairwise-exclusive across (d, d+1) or the same nurse could legally
    // be posted 夜 again the day her own × falls.
    for &nurse in &night_nurses {
        for d in 0..days.saturating_sub(1) {
            let pair = [night_vars[&(d, nurse)], night_vars[&(d + 1, nurse)]];
            model.c(model.sum(&pair)).le(int(1));
        }
    }

    let solution = model
        .solve()
        .map_err(|e| SchedulerError::Infeasible(format!("night rotation unsatisfiable: {e}")))?;

    for d in 0..days {
        for &nurse in &night_nurses {
            let assigned = solution.get::<i32>(night_vars[&(d, nurse)]) == 1;
            if !assigned {
                continue;
            }
            roster.set(nurse, d, Cell::locked(ShiftCode::Night));
            if d + 1 < days {
                roster.set(nurse, d + 1, Cell::locked(ShiftCode::PostNight));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SchedulerConfig;

    #[test]
    fn exactly_one_night_per_day_and_banded_totals() {
        let config = SchedulerConfig::clinic();
        let calendar = Calendar::new(config.year, config.month, config.days_in_month);
        let roster = run(&config, &calendar, &[]).expect("feasible");

        for d in 0..roster.days() {
            let night_count = roster
                .all_nurse_indices()
                .filter(|&n| roster.get(n, d).code == Some(ShiftCode::Night))
                .count();
            assert_eq!(night_count, 1, "day {d} should have exactly one 夜");
        }

        for n in roster.all_nurse_indices() {
            let count = (0..roster.days())
                .filter(|&d| roster.get(n, d).code == Some(ShiftCode::Night))
                .count();
            if config.nurses[n].roles.night_eligible {
                assert!((3..=4).contains(&count), "nurse {n} night count {count}");
            } else {
                assert_eq!(count, 0);
            }
        }
    }

    #[test]
    fn night_is_always_followed_by_post_night() {
        let config = SchedulerConfig::clinic();
        let calendar = Calendar::new(config.year, config.month, config.days_in_month);
        let roster = run(&config, &calendar, &[]).expect("feasible");

        for n in roster.all_nurse_indices() {
            for d in 0..roster.days() - 1 {
                let is_night = roster.get(n, d).code == Some(ShiftCode::Night);
                let is_post_night = roster.get(n, d + 1).code == Some(ShiftCode::PostNight);
                assert_eq!(is_night, is_post_night, "nurse {n} day {d}");
            }
        }
    }

    #[test]
    fn no_nurse_gets_night_on_two_consecutive_days() {
        let config = SchedulerConfig::clinic();
        let calendar = Calendar::new(config.year, config.month, config.days_in_month);
        let roster = run(&config, &calendar, &[]).expect("feasible");

        for n in roster.all_nurse_indices() {
            for d in 0..roster.days() - 1 {
                let both_nights = roster.get(n, d).code == Some(ShiftCode::Night)
                    && roster.get(n, d + 1).code == Some(ShiftCode::Night);
                assert!(!both_nights, "nurse {n} got 夜 on both day {d} and day {}", d + 1);
            }
        }
    }

    #[test]
    fn itagawa_and_miyoshi_never_get_night() {
        let config = SchedulerConfig::clinic();
        let calendar = Calendar::new(config.year, config.month, config.days_in_month);
        let roster = run(&config, &calendar, &[]).expect("feasible");

        for name in ["板川", "三好"] {
            let idx = roster.nurse_position(name).unwrap();
            assert!((0..roster.days()).all(|d| roster.get(idx, d).code != Some(ShiftCode::Night)));
        }
    }
}
