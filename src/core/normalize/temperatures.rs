use crate::domain::model::{Normalized, RawTemperatureRow, TemperatureRecord};
use crate::utils::error::{EtlError, Result};
use crate::utils::format::round2;
use chrono::{Datelike, NaiveDate};
use std::collections::HashMap;

const COUNTRY: &str = "United States";

/// A row with every field present, before the monthly baseline is attached.
struct CompleteRow {
    date: String,
    avg_temp: f64,
    avg_temp_uncertainty: f64,
    city: String,
    lat: String,
    long: String,
    month: u32,
    year: i32,
}

fn complete(row: RawTemperatureRow) -> Option<(String, CompleteRow)> {
    let country = row.country?;
    Some((
        country,
        CompleteRow {
            date: row.dt?,
            avg_temp: row.average_temperature?,
            avg_temp_uncertainty: row.average_temperature_uncertainty?,
            city: row.city?,
            lat: row.latitude?,
            long: row.longitude?,
            month: 0,
            year: 0,
        },
    ))
}

/// Running mean per (city, month).
#[derive(Default)]
struct MonthlyMean {
    sum: f64,
    count: usize,
}

impl MonthlyMean {
    fn value(&self) -> f64 {
        self.sum / self.count as f64
    }
}

/// Keeps complete US rows and attaches `average_temp_month`: the mean
/// temperature of the row's (city, month) over every year in the dataset.
pub fn normalize_temperatures(rows: Vec<RawTemperatureRow>) -> Result<Normalized<TemperatureRecord>> {
    let input_rows = rows.len();
    let mut cleaned = Vec::new();

    for (country, mut row) in rows.into_iter().filter_map(complete) {
        if country.trim() != COUNTRY {
            continue;
        }

        let date = NaiveDate::parse_from_str(row.date.trim(), "%Y-%m-%d").map_err(|e| {
            EtlError::input("temperatures", format!("invalid date '{}': {}", row.date, e))
        })?;
        row.month = date.month();
        row.year = date.year();
        cleaned.push(row);
    }

    // 全資料集分組平均，不是逐列計算
    let mut baselines: HashMap<(&str, u32), MonthlyMean> = HashMap::new();
    for row in &cleaned {
        let mean = baselines.entry((row.city.as_str(), row.month)).or_default();
        mean.sum += row.avg_temp;
        mean.count += 1;
    }
    let baselines: HashMap<(String, u32), f64> = baselines
        .into_iter()
        .map(|((city, month), mean)| ((city.to_string(), month), mean.value()))
        .collect();

    let mut records: Vec<TemperatureRecord> = cleaned
        .into_iter()
        .map(|row| {
            let average_temp_month = baselines
                .get(&(row.city.clone(), row.month))
                .copied()
                .unwrap_or(row.avg_temp);
            TemperatureRecord {
                date: row.date,
                avg_temp: round2(row.avg_temp),
                avg_temp_uncertainty: round2(row.avg_temp_uncertainty),
                city: row.city,
                lat: row.lat,
                long: row.long,
                month: row.month,
                year: row.year,
                average_temp_month: round2(average_temp_month),
            }
        })
        .collect();

    records.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.city.cmp(&a.city)));

    Ok(Normalized::new(records, input_rows))
}
