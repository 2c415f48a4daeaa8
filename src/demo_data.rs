//! Demo data generators: the reference clinic roster plus sample
//! preferred-off requests, in the teacher's `DemoData` named-preset style.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::calendar::Calendar;
use crate::config::SchedulerConfig;
use crate::domain::{PreferenceCode, Request};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoData {
    /// The reference clinic, no preferred-off requests.
    Empty,
    /// The reference clinic with a handful of sample requests scattered
    /// across the month.
    Sample,
}

impl std::str::FromStr for DemoData {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "EMPTY" => Ok(DemoData::Empty),
            "SAMPLE" => Ok(DemoData::Sample),
            _ => Err(()),
        }
    }
}

impl DemoData {
    pub fn as_str(&self) -> &'static str {
        match self {
            DemoData::Empty => "EMPTY",
            DemoData::Sample => "SAMPLE",
        }
    }
}

/// List of available demo data sets.
pub fn list_demo_data() -> Vec<&'static str> {
    vec!["EMPTY", "SAMPLE"]
}

/// Generates a (config, requests) pair for the given demo data set.
pub fn generate(demo: DemoData) -> (SchedulerConfig, Vec<Request>) {
    let config = SchedulerConfig::clinic().with_seed(0);
    let requests = match demo {
        DemoData::Empty => Vec::new(),
        DemoData::Sample => sample_requests(&config),
    };
    (config, requests)
}

/// A handful of plausible preferred-off requests, one or two per nurse,
/// scattered across the month with a seeded RNG (the teacher's
/// `demo_data.rs` uses the same `StdRng` pattern).
fn sample_requests(config: &SchedulerConfig) -> Vec<Request> {
    let calendar = Calendar::new(config.year, config.month, config.days_in_month);
    let mut rng = StdRng::seed_from_u64(config.seed);
    let codes = [
        PreferenceCode::FullOff,
        PreferenceCode::MorningHalf,
        PreferenceCode::AfternoonHalf,
    ];

    let mut requests = Vec::new();
    for nurse in &config.nurses {
        let mut days: Vec<u32> = (0..calendar.len() as u32).collect();
        days.shuffle(&mut rng);
        for &day in days.iter().take(2) {
            let code = *codes.choose(&mut rng).expect("non-empty code list");
            requests.push(Request {
                nurse: nurse.name.clone(),
                day,
                code,
            });
        }
    }
    requests
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_demo_has_no_requests() {
        let (_, requests) = generate(DemoData::Empty);
        assert!(requests.is_empty());
    }

    #[test]
    fn sample_demo_has_requests_for_every_nurse() {
        let (config, requests) = generate(DemoData::Sample);
        for nurse in &config.nurses {
            assert!(requests.iter().any(|r| r.nurse == nurse.name));
        }
    }

    #[test]
    fn demo_data_from_str_roundtrips() {
        assert_eq!("EMPTY".parse::<DemoData>(), Ok(DemoData::Empty));
        assert_eq!("sample".parse::<DemoData>(), Ok(DemoData::Sample));
        assert!("bogus".parse::<DemoData>().is_err());
    }
}
