//! Request Loader: parses the preferred-off request matrix (spec.md §4.2)
//! into a flat list of [`Request`]s.

use crate::domain::{DayIndex, PreferenceCode, Request};
use crate::error::SchedulerError;

/// Maps a day-of-month to a [`DayIndex`] per spec.md §4.2: `d - 21` if
/// `d >= 21`, else `d + 10`.
pub fn day_of_month_to_index(day_of_month: u32) -> DayIndex {
    if day_of_month >= 21 {
        day_of_month - 21
    } else {
        day_of_month + 10
    }
}

/// The inverse mapping, used by the round-trip test in spec.md §8.
pub fn day_index_to_day_of_month(day_index: DayIndex) -> u32 {
    if day_index <= 9 {
        day_index + 21
    } else {
        day_index - 10
    }
}

/// Parses an in-memory CSV request matrix: header row has the literal
/// `日付` in column 1 and day-of-month integers thereafter; each
/// subsequent row is a nurse name followed by preference-code cells.
/// Blank cells and unrecognized codes are ignored.
pub fn parse_requests(csv_text: &str) -> Result<Vec<Request>, SchedulerError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(csv_text.as_bytes());

    let header = reader
        .headers()
        .map_err(|e| SchedulerError::Configuration(format!("malformed request header: {e}")))?
        .clone();

    if header.get(0) != Some("日付") {
        return Err(SchedulerError::Configuration(
            "request matrix header must start with 日付".to_string(),
        ));
    }

    let day_columns: Vec<DayIndex> = header
        .iter()
        .skip(1)
        .map(|cell| {
            cell.trim()
                .parse::<u32>()
                .map(day_of_month_to_index)
                .map_err(|_| {
                    SchedulerError::Configuration(format!("non-numeric day-of-month column: {cell}"))
                })
        })
        .collect::<Result<_, _>>()?;

    let mut requests = Vec::new();
    for record in reader.records() {
        let record = record
            .map_err(|e| SchedulerError::Configuration(format!("malformed request row: {e}")))?;
        let nurse = match record.get(0) {
            Some(name) if !name.trim().is_empty() => name.trim().to_string(),
            _ => continue,
        };

        for (cell, &day) in record.iter().skip(1).zip(day_columns.iter()) {
            if let Some(code) = PreferenceCode::from_glyph(cell) {
                requests.push(Request {
                    nurse: nurse.clone(),
                    day,
                    code,
                });
            }
        }
    }

    Ok(requests)
}

/// Formats parsed requests back into a request matrix for the nurses and
/// day range given, the inverse of [`parse_requests`] on valid rows (used
/// by spec.md §8's round-trip property).
pub fn format_requests(nurses: &[String], days: usize, requests: &[Request]) -> String {
    let mut wtr = csv::WriterBuilder::new().from_writer(vec![]);

    let mut header = vec!["日付".to_string()];
    header.extend((0..days).map(|d| day_index_to_day_of_month(d as DayIndex).to_string()));
    wtr.write_record(&header).expect("in-memory writer");

    for nurse in nurses {
        let mut row = vec![nurse.clone()];
        for day in 0..days {
            let glyph = requests
                .iter()
                .find(|r| &r.nurse == nurse && r.day == day as DayIndex)
                .map(|r| preference_glyph(r.code))
                .unwrap_or_default();
            row.push(glyph);
        }
        wtr.write_record(&row).expect("in-memory writer");
    }

    String::from_utf8(wtr.into_inner().expect("in-memory writer")).expect("utf8 csv output")
}

fn preference_glyph(code: PreferenceCode) -> String {
    match code {
        PreferenceCode::FullOff => "①",
        PreferenceCode::FullOffNightCompatible => "②",
        PreferenceCode::MorningHalf => "③",
        PreferenceCode::AfternoonHalf => "④",
        PreferenceCode::AfternoonHalfNightCompatible => "⑤",
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_of_month_mapping_matches_spec() {
        assert_eq!(day_of_month_to_index(21), 0);
        assert_eq!(day_of_month_to_index(25), 4);
        assert_eq!(day_of_month_to_index(31), 10);
        assert_eq!(day_of_month_to_index(1), 11);
        assert_eq!(day_of_month_to_index(20), 30);
    }

    #[test]
    fn parses_a_simple_request_matrix() {
        let csv = "日付,25,26\n三好,①,\n久保,,②\n";
        let requests = parse_requests(csv).unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].nurse, "三好");
        assert_eq!(requests[0].day, 4);
        assert!(matches!(requests[0].code, PreferenceCode::FullOff));
        assert_eq!(requests[1].nurse, "久保");
        assert_eq!(requests[1].day, 5);
    }

    #[test]
    fn unknown_codes_are_ignored() {
        let csv = "日付,25\n三好,?\n";
        let requests = parse_requests(csv).unwrap();
        assert!(requests.is_empty());
    }

    #[test]
    fn round_trip_is_identity_on_valid_rows() {
        let nurses = vec!["三好".to_string()];
        let requests = vec![Request {
            nurse: "三好".to_string(),
            day: 4,
            code: PreferenceCode::FullOff,
        }];
        let csv = format_requests(&nurses, 31, &requests);
        let parsed = parse_requests(&csv).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].nurse, "三好");
        assert_eq!(parsed[0].day, 4);
    }
}
