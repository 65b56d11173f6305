use chrono::{Duration, NaiveDate};

/// 取到小數第二位，同值時取偶數 (0.125 -> 0.12)
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// `count / population`，四捨五入到兩位；人口為 0 或缺值時回傳 None
pub fn share(count: Option<f64>, population: Option<f64>) -> Option<f64> {
    match (count, population) {
        (Some(count), Some(population)) if population > 0.0 => Some(round2(count / population)),
        _ => None,
    }
}

fn hemisphere(value: f64, positive: char, negative: char) -> String {
    // -0.0 formats as "-0", so fold it into zero first
    let value = if value == 0.0 { 0.0 } else { value };
    if value < 0.0 {
        format!("{:?}{}", value.abs(), negative)
    } else {
        format!("{:?}{}", value, positive)
    }
}

/// `-122.41` -> `"122.41W"`, `100.0` -> `"100.0E"`
pub fn format_longitude(value: f64) -> String {
    hemisphere(value, 'E', 'W')
}

/// `-33.87` -> `"33.87S"`, `37.77` -> `"37.77N"`
pub fn format_latitude(value: f64) -> String {
    hemisphere(value, 'N', 'S')
}

/// Inverse of [`format_longitude`] / [`format_latitude`].
pub fn parse_hemisphere(text: &str) -> Option<f64> {
    let text = text.trim();
    let suffix = text.chars().last()?;
    let magnitude: f64 = text[..text.len() - suffix.len_utf8()].parse().ok()?;
    match suffix.to_ascii_uppercase() {
        'N' | 'E' => Some(magnitude),
        'S' | 'W' => Some(-magnitude),
        _ => None,
    }
}

/// SAS 日期以 1960-01-01 為基準的天數
pub const SAS_EPOCH: (i32, u32, u32) = (1960, 1, 1);

pub fn sas_date(day_offset: i64) -> Option<NaiveDate> {
    let (year, month, day) = SAS_EPOCH;
    NaiveDate::from_ymd_opt(year, month, day)?.checked_add_signed(Duration::try_days(day_offset)?)
}
