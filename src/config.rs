//! Scheduler configuration: calendar constants, nurse roster, PRNG seed.
//! Named presets only (`SchedulerConfig::clinic()`), matching the
//! teacher's `DemoData::{Small,Large}` pattern rather than a blanket
//! `Default` impl.

use crate::domain::Nurse;

/// Per-nurse monthly off-score target (doubled to stay integral: 26 ==
/// 13 full-off-equivalent days), matching spec.md §3/§6's `TARGET_REST_SCORE
/// = 13`.
pub const TARGET_REST_SCORE_DOUBLED: u32 = 26;

/// The night-shift rotation band divisor (`k = 8` in spec.md §4.3).
pub const NIGHT_ROTATION_BAND: u32 = 8;

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub year: i32,
    pub month: u32,
    pub days_in_month: usize,
    pub target_rest_score_doubled: u32,
    pub nurses: Vec<Nurse>,
    pub seed: u64,
}

impl SchedulerConfig {
    /// The reference clinic configuration: the fourteen named nurses and
    /// role flags enumerated in spec.md §3, for August 2025.
    pub fn clinic() -> Self {
        let nurses = vec![
            Nurse::new("久保")
                .outpatient_eligible()
                .slot4_eligible()
                .ct_primary()
                .holiday_worker(),
            Nurse::new("小嶋")
                .outpatient_eligible()
                .slot4_eligible()
                .saturday_primary(),
            Nurse::new("久保（千）")
                .outpatient_eligible()
                .slot4_eligible()
                .saturday_primary(),
            Nurse::new("田浦")
                .outpatient_eligible()
                .slot4_eligible()
                .saturday_primary(),
            Nurse::new("樋渡").night_eligible().outpatient_eligible().slot4_eligible(),
            Nurse::new("中山").night_eligible().outpatient_eligible().slot4_eligible(),
            Nurse::new("川原田")
                .night_eligible()
                .outpatient_eligible()
                .slot4_eligible(),
            Nurse::new("友枝").night_eligible().outpatient_eligible().slot4_eligible(),
            Nurse::new("奥平").night_eligible().outpatient_eligible().slot4_eligible(),
            Nurse::new("前野")
                .night_eligible()
                .outpatient_eligible()
                .slot4_eligible()
                .ct_backup(),
            Nurse::new("森園").night_eligible().outpatient_eligible().slot4_eligible(),
            Nurse::new("御書").night_eligible(),
            Nurse::new("板川").outpatient_eligible().slot4_eligible(),
            Nurse::new("三好").outpatient_eligible().ct_backup(),
        ];

        Self {
            year: 2025,
            month: 8,
            days_in_month: crate::domain::DAYS_IN_MONTH,
            target_rest_score_doubled: TARGET_REST_SCORE_DOUBLED,
            nurses,
            seed: 0,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn night_eligible_names(&self) -> Vec<&str> {
        self.nurses
            .iter()
            .filter(|n| n.roles.night_eligible)
            .map(|n| n.name.as_str())
            .collect()
    }

    pub fn saturday_primary_names(&self) -> Vec<&str> {
        self.nurses
            .iter()
            .filter(|n| n.roles.saturday_primary)
            .map(|n| n.name.as_str())
            .collect()
    }

    pub fn nurse(&self, name: &str) -> Option<&Nurse> {
        self.nurses.iter().find(|n| n.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clinic_has_fourteen_nurses() {
        assert_eq!(SchedulerConfig::clinic().nurses.len(), 14);
    }

    #[test]
    fn night_eligible_set_matches_spec() {
        let cfg = SchedulerConfig::clinic();
        let mut names = cfg.night_eligible_names();
        names.sort();
        let mut expected = vec!["樋渡", "中山", "川原田", "友枝", "奥平", "前野", "森園", "御書"];
        expected.sort();
        assert_eq!(names, expected);
    }

    #[test]
    fn itagawa_and_miyoshi_are_not_night_eligible() {
        let cfg = SchedulerConfig::clinic();
        assert!(!cfg.nurse("板川").unwrap().roles.night_eligible);
        assert!(!cfg.nurse("三好").unwrap().roles.night_eligible);
    }

    #[test]
    fn gosho_excluded_from_outpatient_and_slot4() {
        let cfg = SchedulerConfig::clinic();
        let gosho = cfg.nurse("御書").unwrap();
        assert!(!gosho.roles.outpatient_eligible);
        assert!(!gosho.roles.slot4_eligible);
    }

    #[test]
    fn saturday_primary_set_matches_spec_and_excludes_kubo() {
        let cfg = SchedulerConfig::clinic();
        let mut names = cfg.saturday_primary_names();
        names.sort();
        let mut expected = vec!["小嶋", "久保（千）", "田浦"];
        expected.sort();
        assert_eq!(names, expected);
        assert!(!cfg.nurse("久保").unwrap().roles.saturday_primary);
    }
}
