use serde::{Deserialize, Serialize};
use std::fmt;

/// 四個來源資料集
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dataset {
    Cities,
    Airports,
    Temperatures,
    Travelers,
}

impl Dataset {
    pub const ALL: [Dataset; 4] = [
        Dataset::Cities,
        Dataset::Airports,
        Dataset::Temperatures,
        Dataset::Travelers,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Dataset::Cities => "cities",
            Dataset::Airports => "airports",
            Dataset::Temperatures => "temperatures",
            Dataset::Travelers => "travelers",
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Normalizer 輸出：清理後的資料列與被過濾掉的列數
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized<T> {
    pub records: Vec<T>,
    pub input_rows: usize,
    pub dropped_rows: usize,
}

impl<T> Normalized<T> {
    pub fn new(records: Vec<T>, input_rows: usize) -> Self {
        let dropped_rows = input_rows.saturating_sub(records.len());
        Self {
            records,
            input_rows,
            dropped_rows,
        }
    }
}

// ---------------------------------------------------------------------------
// Raw input rows
// ---------------------------------------------------------------------------

/// One row of the semicolon-delimited demographics file: one per (city, state, race).
#[derive(Debug, Clone, Deserialize)]
pub struct RawCityRow {
    #[serde(rename = "City")]
    pub city: String,
    #[serde(rename = "State")]
    pub state: String,
    #[serde(rename = "Median Age", default, deserialize_with = "csv::invalid_option")]
    pub median_age: Option<f64>,
    #[serde(rename = "Male Population", default, deserialize_with = "csv::invalid_option")]
    pub male_population: Option<f64>,
    #[serde(rename = "Female Population", default, deserialize_with = "csv::invalid_option")]
    pub female_population: Option<f64>,
    #[serde(rename = "Total Population", default, deserialize_with = "csv::invalid_option")]
    pub total_population: Option<f64>,
    #[serde(rename = "Number of Veterans", default, deserialize_with = "csv::invalid_option")]
    pub veterans: Option<f64>,
    #[serde(rename = "Foreign-born", default, deserialize_with = "csv::invalid_option")]
    pub foreign_born: Option<f64>,
    #[serde(rename = "Average Household Size", default, deserialize_with = "csv::invalid_option")]
    pub avg_household_size: Option<f64>,
    #[serde(rename = "State Code")]
    pub state_code: String,
    #[serde(rename = "Race", default)]
    pub race: Option<String>,
    #[serde(rename = "Count", default, deserialize_with = "csv::invalid_option")]
    pub count: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawAirportRow {
    #[serde(default)]
    pub iata_code: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub elevation_ft: Option<f64>,
    #[serde(default)]
    pub iso_country: Option<String>,
    #[serde(default)]
    pub iso_region: Option<String>,
    #[serde(default)]
    pub municipality: Option<String>,
    #[serde(default)]
    pub coordinates: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawTemperatureRow {
    #[serde(default)]
    pub dt: Option<String>,
    #[serde(rename = "AverageTemperature", default, deserialize_with = "csv::invalid_option")]
    pub average_temperature: Option<f64>,
    #[serde(
        rename = "AverageTemperatureUncertainty",
        default,
        deserialize_with = "csv::invalid_option"
    )]
    pub average_temperature_uncertainty: Option<f64>,
    #[serde(rename = "City", default)]
    pub city: Option<String>,
    #[serde(rename = "Country", default)]
    pub country: Option<String>,
    #[serde(rename = "Latitude", default)]
    pub latitude: Option<String>,
    #[serde(rename = "Longitude", default)]
    pub longitude: Option<String>,
}

/// I-94 arrival record as exported from the SAS dataset.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTravelerRow {
    #[serde(default)]
    pub i94port: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub arrdate: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub i94bir: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub i94visa: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub biryear: Option<f64>,
    #[serde(default)]
    pub gender: Option<String>,
}

// ---------------------------------------------------------------------------
// Cleaned records. Field order is the staging table column order.
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityRecord {
    pub city: String,
    pub median_age: Option<f64>,
    pub cnt_male: Option<i64>,
    pub cnt_female: Option<i64>,
    pub population: Option<i64>,
    pub cnt_veterans: Option<i64>,
    pub cnt_foreign_born: Option<i64>,
    pub avg_household: Option<f64>,
    pub state: String,
    pub cnt_white: Option<i64>,
    pub per_white: Option<f64>,
    pub cnt_his_latino: Option<i64>,
    pub per_his_latino: Option<f64>,
    pub cnt_asian: Option<i64>,
    pub per_asian: Option<f64>,
    pub cnt_amer_ind_ak_native: Option<i64>,
    pub per_amer_ind_ak_native: Option<f64>,
    pub cnt_black: Option<i64>,
    pub per_black_afr_amer: Option<f64>,
    pub per_male: Option<f64>,
    pub per_female: Option<f64>,
    pub per_veterans: Option<f64>,
    pub per_foreign_born: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AirportRecord {
    pub iata_code: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub elevation_ft: Option<f64>,
    pub city: Option<String>,
    pub long: String,
    pub lat: String,
    pub state: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemperatureRecord {
    pub date: String,
    pub avg_temp: f64,
    pub avg_temp_uncertainty: f64,
    pub city: String,
    pub lat: String,
    pub long: String,
    pub month: u32,
    pub year: i32,
    pub average_temp_month: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TravelerRecord {
    pub iata_code: String,
    pub age: Option<i64>,
    pub visa: Option<i64>,
    pub gender: String,
    pub year_of_birth: Option<i64>,
    pub arrival_year: Option<i32>,
    pub arrival_month: Option<u32>,
    pub arrival_day: Option<u32>,
}
