//! Repair Passes (spec.md §4.5): idempotent post-processing applied
//! after Stage-2. All passes honor the lock mask; since `夜` and the `×`
//! that follows it are always Stage-1-locked cells, checking
//! `!cell.is_locked()` is sufficient to keep repairs off them.
//!
//! Grounded on `original_source/optimize_2.py`'s `balance_rest_days`,
//! `prevent_seven_day_streaks`, `prevent_four_day_rest_streaks`, and
//! `ensure_min_rest_days_balanced`.

use crate::domain::{Cell, Roster, ShiftCode};
use crate::error::SchedulerWarning;

/// Runs the equity swap, both streak-breaking passes, the balancer/top-up,
/// and the final empty-cell fallback, in spec.md §4.5's order.
pub fn run(roster: &mut Roster, target_doubled: u32) -> Vec<SchedulerWarning> {
    let mut warnings = Vec::new();
    balance_rest_days(roster);
    warnings.extend(break_seven_day_on_streaks(roster));
    warnings.extend(break_four_day_off_streaks(roster));
    balance_and_top_up(roster, target_doubled);
    fill_remaining_empty_with_off(roster);
    warnings
}

/// Equity-swap pass, run immediately after the initial greedy fill and
/// before the streak-breaking passes: repeatedly pick the
/// highest-scoring and lowest-scoring nurse and, if a day exists where
/// the high nurse is off and the low nurse is working (both unlocked),
/// swap their cells. Matches `original_source/optimize_2.py`'s
/// `balance_rest_days` max-min variance reduction. Bounded so a
/// configuration with no swappable day terminates rather than spinning.
fn balance_rest_days(roster: &mut Roster) {
    let nurse_count = roster.all_nurse_indices().len();
    let days = roster.days();
    let max_iterations = nurse_count.saturating_mul(days);

    for _ in 0..max_iterations {
        let scores: Vec<u32> = roster
            .all_nurse_indices()
            .map(|n| roster.weighted_off_score_doubled(n))
            .collect();
        if scores.len() < 2 {
            break;
        }

        let (high, &high_score) = scores.iter().enumerate().max_by_key(|&(_, s)| s).unwrap();
        let (low, &low_score) = scores.iter().enumerate().min_by_key(|&(_, s)| s).unwrap();

        if high == low || high_score.saturating_sub(low_score) < 2 {
            break;
        }

        let swap_day = (0..days).find(|&d| {
            let high_cell = roster.get(high, d);
            let low_cell = roster.get(low, d);
            !high_cell.is_locked() && !low_cell.is_locked() && effective_is_off(high_cell) && !effective_is_off(low_cell)
        });

        let Some(day) = swap_day else { break };

        let high_cell = roster.get(high, day);
        let low_cell = roster.get(low, day);
        roster.set(high, day, low_cell);
        roster.set(low, day, high_cell);
    }
}

fn effective_is_off(cell: Cell) -> bool {
    cell.code.map(ShiftCode::is_off).unwrap_or(true)
}

fn break_seven_day_on_streaks(roster: &mut Roster) -> Vec<SchedulerWarning> {
    let mut warnings = Vec::new();
    let days = roster.days();

    for n in roster.all_nurse_indices() {
        let mut run_len = 0usize;
        for d in 0..days {
            if effective_is_off(roster.get(n, d)) {
                run_len = 0;
                continue;
            }
            run_len += 1;
            if run_len < 7 {
                continue;
            }

            let mut fixed = false;
            for back in 0..7 {
                let day = d - back;
                if !roster.get(n, day).is_locked() {
                    roster.set(n, day, Cell::filled(ShiftCode::Off));
                    fixed = true;
                    break;
                }
            }
            run_len = 0;
            if !fixed {
                warnings.push(SchedulerWarning::RepairFixpoint {
                    nurse: roster.nurses()[n].clone(),
                    day: d as u32,
                });
            }
        }
    }

    warnings
}

fn break_four_day_off_streaks(roster: &mut Roster) -> Vec<SchedulerWarning> {
    let mut warnings = Vec::new();
    let days = roster.days();

    for n in roster.all_nurse_indices() {
        let mut run_len = 0usize;
        let mut run_start = 0usize;
        let mut d = 0usize;
        while d < days {
            if effective_is_off(roster.get(n, d)) {
                if run_len == 0 {
                    run_start = d;
                }
                run_len += 1;
            } else {
                run_len = 0;
            }

            if run_len == 4 {
                // Latest-in-window first, matching `optimize_2.py`'s
                // `range(i, i-4, -1)` descending scan.
                let off_day = (run_start..=d).rev().find(|&day| !roster.get(n, day).is_locked());
                let on_day = (0..days).find(|&day| {
                    !(run_start..=d).contains(&day)
                        && !roster.get(n, day).is_locked()
                        && !effective_is_off(roster.get(n, day))
                });

                match (off_day, on_day) {
                    (Some(off_day), Some(on_day)) => {
                        let off_cell = roster.get(n, off_day);
                        let on_cell = roster.get(n, on_day);
                        roster.set(n, off_day, on_cell);
                        roster.set(n, on_day, off_cell);
                    }
                    _ => {
                        warnings.push(SchedulerWarning::RepairFixpoint {
                            nurse: roster.nurses()[n].clone(),
                            day: d as u32,
                        });
                    }
                }
                run_len = 0;
            }
            d += 1;
        }
    }

    warnings
}

fn work_counts(roster: &Roster) -> Vec<usize> {
    (0..roster.days())
        .map(|d| {
            roster
                .all_nurse_indices()
                .filter(|&n| {
                    roster
                        .get(n, d)
                        .code
                        .map(|c| !c.is_off())
                        .unwrap_or(false)
                })
                .count()
        })
        .collect()
}

fn balance_and_top_up(roster: &mut Roster, target_doubled: u32) {
    let mut counts = work_counts(roster);
    let days = roster.days();

    for n in roster.all_nurse_indices() {
        loop {
            let score = roster.weighted_off_score_doubled(n);
            if score >= target_doubled {
                break;
            }
            let need = target_doubled - score;

            let mut candidates: Vec<usize> = (0..days)
                .filter(|&d| {
                    let cell = roster.get(n, d);
                    !cell.is_locked()
                        && cell.code.map(|c| !c.is_off()).unwrap_or(false)
                        && counts[d] > 7
                })
                .collect();
            candidates.sort_by_key(|&d| std::cmp::Reverse(counts[d]));

            let Some(&day) = candidates.first() else {
                break;
            };

            if need >= 2 {
                roster.set(n, day, Cell::filled(ShiftCode::Off));
            } else {
                roster.set(n, day, Cell::filled(ShiftCode::OffMorningHalf));
            }
            counts[day] -= 1;
        }
    }
}

fn fill_remaining_empty_with_off(roster: &mut Roster) {
    for n in roster.all_nurse_indices() {
        for d in 0..roster.days() {
            if roster.get(n, d).is_empty() {
                roster.set(n, d, Cell::filled(ShiftCode::Off));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::Calendar;
    use crate::config::SchedulerConfig;
    use crate::domain::Nurse;

    #[test]
    fn balance_rest_days_reduces_the_max_min_gap() {
        let nurses = vec![Nurse::new("A"), Nurse::new("B")];
        let mut roster = Roster::new(&nurses, 4);
        for d in 0..4 {
            roster.set(0, d, Cell::filled(ShiftCode::Off));
            roster.set(1, d, Cell::filled(ShiftCode::WardEarly));
        }

        balance_rest_days(&mut roster);

        let score_a = roster.weighted_off_score_doubled(0);
        let score_b = roster.weighted_off_score_doubled(1);
        assert!(
            score_a.abs_diff(score_b) <= 2,
            "expected the max-min gap to close, got {score_a} vs {score_b}"
        );
    }

    #[test]
    fn seven_day_streak_is_broken_when_unlocked_cells_exist() {
        let config = SchedulerConfig::clinic();
        let calendar = Calendar::new(config.year, config.month, config.days_in_month);
        let mut roster = crate::stage1::run(&config, &calendar, &[]).unwrap();
        let morizono = roster.nurse_position("森園").unwrap();

        for d in 0..7 {
            if !roster.get(morizono, d).is_locked() {
                roster.set(morizono, d, Cell::filled(ShiftCode::WardEarly));
            }
        }

        run(&mut roster, config.target_rest_score_doubled);

        let has_off_in_window = (0..7).any(|d| roster.get(morizono, d).code == Some(ShiftCode::Off));
        assert!(has_off_in_window, "expected at least one 休 in days 0..6");
    }

    #[test]
    fn no_cell_is_left_empty_after_repair() {
        let config = SchedulerConfig::clinic();
        let calendar = Calendar::new(config.year, config.month, config.days_in_month);
        let mut roster = crate::stage1::run(&config, &calendar, &[]).unwrap();
        crate::stage2::run(&config, &calendar, &mut roster);
        run(&mut roster, config.target_rest_score_doubled);

        for n in roster.all_nurse_indices() {
            for d in 0..roster.days() {
                assert!(!roster.get(n, d).is_empty(), "cell ({n}, {d}) left empty");
            }
        }
    }

    #[test]
    fn repair_is_idempotent() {
        let config = SchedulerConfig::clinic();
        let calendar = Calendar::new(config.year, config.month, config.days_in_month);
        let mut roster = crate::stage1::run(&config, &calendar, &[]).unwrap();
        crate::stage2::run(&config, &calendar, &mut roster);
        run(&mut roster, config.target_rest_score_doubled);

        let before: Vec<Option<ShiftCode>> = (0..roster.days())
            .flat_map(|d| roster.all_nurse_indices().map(move |n| (n, d)))
            .map(|(n, d)| roster.get(n, d).code)
            .collect();

        run(&mut roster, config.target_rest_score_doubled);

        let after: Vec<Option<ShiftCode>> = (0..roster.days())
            .flat_map(|d| roster.all_nurse_indices().map(move |n| (n, d)))
            .map(|(n, d)| roster.get(n, d).code)
            .collect();

        assert_eq!(before, after, "second repair run must be a no-op");
    }
}
