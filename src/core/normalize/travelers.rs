use crate::domain::model::{Normalized, RawTravelerRow, TravelerRecord};
use crate::utils::format::sas_date;
use chrono::Datelike;

/// 入境口岸未知時的代碼
pub const UNKNOWN_PORT: &str = "XXX";

fn as_int(value: Option<f64>) -> Option<i64> {
    value.filter(|v| v.is_finite()).map(|v| v as i64)
}

/// Cleans one partition of I-94 records. Pure and order-preserving, so any
/// executor can run it per partition.
pub fn normalize_travelers(rows: Vec<RawTravelerRow>) -> Normalized<TravelerRecord> {
    let input_rows = rows.len();

    let records = rows
        .into_iter()
        .filter_map(|row| {
            // null port fails the `!= 'XXX'` predicate as well
            let port = row.i94port.map(|p| p.trim().to_string())?;
            if port == UNKNOWN_PORT {
                return None;
            }
            let gender = row.gender?;

            let arrival = as_int(row.arrdate).and_then(sas_date);

            Some(TravelerRecord {
                iata_code: port,
                age: as_int(row.i94bir),
                visa: as_int(row.i94visa),
                gender,
                year_of_birth: as_int(row.biryear),
                arrival_year: arrival.map(|d| d.year()),
                arrival_month: arrival.map(|d| d.month()),
                arrival_day: arrival.map(|d| d.day()),
            })
        })
        .collect();

    Normalized::new(records, input_rows)
}
