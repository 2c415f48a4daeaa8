//! Stage-2 Filler: the deterministic-with-controlled-randomness greedy
//! that fills every still-empty cell left by Stage-1, per spec.md §4.4.
//! Grounded on `original_source/optimize_2.py`'s weekday-dispatch loop.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::HashMap;

use crate::calendar::{Calendar, DayProgram};
use crate::config::SchedulerConfig;
use crate::domain::{Cell, Roster, ShiftCode};
use crate::error::SchedulerWarning;

/// Per-(nurse, shift-code) tally. Stage-2 keeps one table for weekday
/// (program A/B) days and a disjoint one for Saturday (program C) days,
/// per spec.md §4.4's "running counts" note. `CT` and `2・CT` are distinct
/// keys, matching `optimize_2.py`'s separate `shift_counts[...]['CT']` /
/// `['2・CT']` counters.
#[derive(Default)]
struct RunningCounts(HashMap<(usize, ShiftCode), u32>);

impl RunningCounts {
    fn get(&self, nurse: usize, code: ShiftCode) -> u32 {
        self.0.get(&(nurse, code)).copied().unwrap_or(0)
    }

    fn increment(&mut self, nurse: usize, code: ShiftCode) {
        *self.0.entry((nurse, code)).or_insert(0) += 1;
    }
}

pub fn run(config: &SchedulerConfig, calendar: &Calendar, roster: &mut Roster) -> Vec<SchedulerWarning> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut weekday_counts = RunningCounts::default();
    let mut saturday_counts = RunningCounts::default();
    let mut warnings = Vec::new();
    let saturday_primary = config.saturday_primary_names();

    for day in calendar.iter() {
        let d = day.day_index as usize;
        match day.program {
            DayProgram::A => fill_program_a(
                roster,
                d,
                &mut weekday_counts,
                &saturday_primary,
                &mut rng,
                &mut warnings,
            ),
            DayProgram::B => fill_program_b(roster, d, &mut weekday_counts, &mut warnings),
            DayProgram::C => fill_program_c(
                roster,
                d,
                &mut saturday_counts,
                &saturday_primary,
                &mut rng,
                &mut warnings,
            ),
        }
    }

    warnings
}

fn available_nurses(roster: &Roster) -> impl Fn(usize) -> Vec<usize> + '_ {
    move |day: usize| {
        roster
            .all_nurse_indices()
            .filter(|&n| roster.get(n, day).is_empty())
            .collect()
    }
}

fn pick_lowest_count(
    candidates: &[usize],
    roster: &Roster,
    counts: &RunningCounts,
    code: ShiftCode,
) -> Option<usize> {
    candidates
        .iter()
        .copied()
        .min_by(|&a, &b| {
            counts
                .get(a, code)
                .cmp(&counts.get(b, code))
                .then_with(|| roster.nurses()[a].cmp(&roster.nurses()[b]))
        })
}

fn is_saturday_primary(roster: &Roster, nurse: usize, saturday_primary: &[&str]) -> bool {
    saturday_primary.contains(&roster.nurses()[nurse].as_str())
}

fn is_gosho(roster: &Roster, nurse: usize) -> bool {
    roster.nurses()[nurse] == "御書"
}

/// Picks a nurse for an outpatient-style slot: prefer an available
/// saturday-primary nurse (lowest running count among those, tie
/// lexicographic); otherwise the lowest-count nurse among the rest,
/// excluding `御書`. Used by Program A's weekday numeric slots.
fn pick_outpatient_slot(
    available: &[usize],
    roster: &Roster,
    counts: &RunningCounts,
    code: ShiftCode,
    saturday_primary: &[&str],
) -> Option<usize> {
    let primaries: Vec<usize> = available
        .iter()
        .copied()
        .filter(|&n| is_saturday_primary(roster, n, saturday_primary))
        .collect();
    if let Some(n) = pick_lowest_count(&primaries, roster, counts, code) {
        return Some(n);
    }
    pick_non_primary_lowest_count(available, roster, counts, code)
}

fn pick_non_primary_lowest_count(
    available: &[usize],
    roster: &Roster,
    counts: &RunningCounts,
    code: ShiftCode,
) -> Option<usize> {
    let rest: Vec<usize> = available.iter().copied().filter(|&n| !is_gosho(roster, n)).collect();
    pick_lowest_count(&rest, roster, counts, code)
}

fn assign(
    roster: &mut Roster,
    day: usize,
    nurse: usize,
    code: ShiftCode,
    counts: &mut RunningCounts,
    count_key: ShiftCode,
    available: &mut Vec<usize>,
) {
    roster.set(nurse, day, Cell::filled(code));
    counts.increment(nurse, count_key);
    available.retain(|&n| n != nurse);
}

fn fill_program_a(
    roster: &mut Roster,
    day: usize,
    counts: &mut RunningCounts,
    saturday_primary: &[&str],
    rng: &mut StdRng,
    warnings: &mut Vec<SchedulerWarning>,
) {
    let mut available = available_nurses(roster)(day);
    let k = if available.len() >= 8 { 8 } else { 7 };

    // CT assignment. `CT` (k=8) and `2・CT` (k=7) are distinct duties with
    // distinct running counts.
    let ct_code = if k == 8 { ShiftCode::Ct } else { ShiftCode::CtWithOutpatient2 };
    let kubo = roster.nurse_position("久保");
    let ct_nurse = kubo
        .filter(|&n| available.contains(&n))
        .or_else(|| {
            let backups: Vec<usize> = available
                .iter()
                .copied()
                .filter(|&n| ["三好", "前野"].contains(&roster.nurses()[n].as_str()))
                .collect();
            pick_lowest_count(&backups, roster, counts, ct_code)
        });
    match ct_nurse {
        Some(n) => assign(roster, day, n, ct_code, counts, ct_code, &mut available),
        None => warnings.push(SchedulerWarning::TemplateUnderflow {
            day: day as u32,
            slot: "CT".to_string(),
        }),
    }

    // Outpatient numeric assignment.
    let mut slots: Vec<ShiftCode> = if k == 8 {
        vec![
            ShiftCode::Outpatient1,
            ShiftCode::Outpatient2,
            ShiftCode::Outpatient3,
            ShiftCode::Outpatient4,
        ]
    } else {
        vec![ShiftCode::Outpatient1, ShiftCode::Outpatient3, ShiftCode::Outpatient4]
    };
    slots.shuffle(rng);
    for slot in slots {
        match pick_outpatient_slot(&available, roster, counts, slot, saturday_primary) {
            Some(n) => assign(roster, day, n, slot, counts, slot, &mut available),
            None => warnings.push(SchedulerWarning::TemplateUnderflow {
                day: day as u32,
                slot: slot.glyph().to_string(),
            }),
        }
    }

    // Ward assignment.
    for slot in [ShiftCode::WardEarly, ShiftCode::WardLate, ShiftCode::WardRound] {
        match pick_lowest_count(&available, roster, counts, slot) {
            Some(n) => assign(roster, day, n, slot, counts, slot, &mut available),
            None => warnings.push(SchedulerWarning::TemplateUnderflow {
                day: day as u32,
                slot: slot.glyph().to_string(),
            }),
        }
    }

    apply_off_allocation(roster, day, &available);
}

fn fill_program_b(
    roster: &mut Roster,
    day: usize,
    counts: &mut RunningCounts,
    warnings: &mut Vec<SchedulerWarning>,
) {
    let mut candidates = available_nurses(roster)(day);

    match pick_lowest_count(&candidates, roster, counts, ShiftCode::DayEarly) {
        Some(n) => assign(
            roster,
            day,
            n,
            ShiftCode::DayEarly,
            counts,
            ShiftCode::DayEarly,
            &mut candidates,
        ),
        None => warnings.push(SchedulerWarning::TemplateUnderflow {
            day: day as u32,
            slot: "早日".to_string(),
        }),
    }

    match pick_lowest_count(&candidates, roster, counts, ShiftCode::DayLate) {
        Some(n) => assign(
            roster,
            day,
            n,
            ShiftCode::DayLate,
            counts,
            ShiftCode::DayLate,
            &mut candidates,
        ),
        None => warnings.push(SchedulerWarning::TemplateUnderflow {
            day: day as u32,
            slot: "残日".to_string(),
        }),
    }

    apply_off_allocation(roster, day, &candidates);
}

/// Saturday fill. Unlike the weekday numeric slots, the outpatient-primary
/// nurses pair with the (shuffled) slot list positionally — a direct
/// `zip(slots, saturday_primary)`, not a lowest-count tie-break — matching
/// `original_source/optimize_2.py`'s `zip(gai_shift, 土曜担当)`. Any slots
/// left over once the primary list is exhausted fall back to lowest-count
/// among the non-primary remainder.
fn fill_program_c(
    roster: &mut Roster,
    day: usize,
    counts: &mut RunningCounts,
    saturday_primary: &[&str],
    rng: &mut StdRng,
    warnings: &mut Vec<SchedulerWarning>,
) {
    let mut available = available_nurses(roster)(day);
    let kubo = roster.nurse_position("久保");
    let kubo_available = kubo.is_some_and(|n| available.contains(&n));

    let mut slots: Vec<ShiftCode> = if kubo_available {
        let n = kubo.unwrap();
        assign(
            roster,
            day,
            n,
            ShiftCode::SatOutpatient2,
            counts,
            ShiftCode::SatOutpatient2,
            &mut available,
        );
        vec![ShiftCode::SatOutpatient1, ShiftCode::SatOutpatient3, ShiftCode::SatOutpatient4]
    } else {
        vec![
            ShiftCode::SatOutpatient1,
            ShiftCode::SatOutpatient2,
            ShiftCode::SatOutpatient3,
            ShiftCode::SatOutpatient4,
        ]
    };
    slots.shuffle(rng);

    let primaries: Vec<usize> = available
        .iter()
        .copied()
        .filter(|&n| is_saturday_primary(roster, n, saturday_primary))
        .collect();
    let paired = slots.len().min(primaries.len());

    for i in 0..paired {
        assign(roster, day, primaries[i], slots[i], counts, slots[i], &mut available);
    }

    for &slot in &slots[paired..] {
        match pick_non_primary_lowest_count(&available, roster, counts, slot) {
            Some(n) => assign(roster, day, n, slot, counts, slot, &mut available),
            None => warnings.push(SchedulerWarning::TemplateUnderflow {
                day: day as u32,
                slot: slot.glyph().to_string(),
            }),
        }
    }

    for slot in [ShiftCode::WardEarly, ShiftCode::WardLate, ShiftCode::WardRound] {
        match pick_lowest_count(&available, roster, counts, slot) {
            Some(n) => assign(roster, day, n, slot, counts, slot, &mut available),
            None => warnings.push(SchedulerWarning::TemplateUnderflow {
                day: day as u32,
                slot: slot.glyph().to_string(),
            }),
        }
    }

    apply_off_allocation(roster, day, &available);
}

/// Off-allocation policy shared by all three programs (spec.md §4.4):
/// order the remaining nurses by descending `need`, and assign `休` or
/// `休/` while slack remains.
fn apply_off_allocation(roster: &mut Roster, day: usize, candidates: &[usize]) {
    let mut ordered: Vec<usize> = candidates.to_vec();
    ordered.sort_by_key(|&n| std::cmp::Reverse(need(roster, n)));

    for n in ordered {
        if roster.get(n, day).is_locked() {
            continue;
        }
        let remaining_need = need(roster, n);
        if remaining_need >= 2 {
            roster.set(n, day, Cell::filled(ShiftCode::Off));
        } else if remaining_need >= 1 {
            roster.set(n, day, Cell::filled(ShiftCode::OffMorningHalf));
        }
        // Otherwise leave empty; the final repair fallback fills it.
    }
}

fn need(roster: &Roster, nurse: usize) -> i64 {
    crate::config::TARGET_REST_SCORE_DOUBLED as i64 - roster.weighted_off_score_doubled(nurse) as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SchedulerConfig;

    #[test]
    fn program_a_day_fills_every_cell() {
        let config = SchedulerConfig::clinic();
        let calendar = Calendar::new(config.year, config.month, config.days_in_month);
        let mut roster = crate::stage1::run(&config, &calendar, &[]).unwrap();
        run(&config, &calendar, &mut roster);

        for day in calendar.iter() {
            if day.program != DayProgram::A {
                continue;
            }
            for n in roster.all_nurse_indices() {
                assert!(
                    !roster.get(n, day.day_index as usize).is_empty()
                        || roster.get(n, day.day_index as usize).is_locked(),
                    "cell ({n}, {}) left empty on a program-A day",
                    day.day_index
                );
            }
        }
    }

    #[test]
    fn program_c_day_gives_kubo_sat_outpatient_2_when_available() {
        let config = SchedulerConfig::clinic();
        let calendar = Calendar::new(config.year, config.month, config.days_in_month);
        let mut roster = crate::stage1::run(&config, &calendar, &[]).unwrap();
        run(&config, &calendar, &mut roster);

        let kubo = roster.nurse_position("久保").unwrap();
        for day in calendar.iter() {
            if day.program != DayProgram::C {
                continue;
            }
            let cell = roster.get(kubo, day.day_index as usize);
            if !cell.code.unwrap().is_off() {
                assert_eq!(cell.code, Some(ShiftCode::SatOutpatient2));
            }
        }
    }

    #[test]
    fn saturday_primary_set_no_longer_includes_kubo() {
        let config = SchedulerConfig::clinic();
        let primary = config.saturday_primary_names();
        assert!(!primary.contains(&"久保"));
        assert_eq!(primary.len(), 3);
    }
}
