//! Warehouse schema: staging tables (wide, one per source) and the final
//! dimension/fact tables, plus every statement the loader runs against them.

use crate::domain::model::Dataset;
use crate::utils::error::{EtlError, Result};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Varchar,
    Integer,
    BigInt,
    Float,
    /// Surrogate key: `BIGINT IDENTITY(1,1)`
    Identity,
    /// `INTEGER PRIMARY KEY`
    IntegerKey,
}

impl ColumnType {
    pub fn sql(&self) -> &'static str {
        match self {
            ColumnType::Varchar => "VARCHAR",
            ColumnType::Integer => "INTEGER",
            ColumnType::BigInt => "BIGINT",
            ColumnType::Float => "FLOAT",
            ColumnType::Identity => "BIGINT IDENTITY(1,1)",
            ColumnType::IntegerKey => "INTEGER PRIMARY KEY",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub ty: ColumnType,
}

impl Column {
    pub const fn new(name: &'static str, ty: ColumnType) -> Self {
        Self { name, ty }
    }
}

#[derive(Debug)]
pub struct TableSchema {
    pub name: &'static str,
    pub columns: &'static [Column],
}

impl TableSchema {
    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.name).collect()
    }
}

use ColumnType::*;

// =============================================================================
// Staging tables (column order == CSV column order, COPY is positional)
// =============================================================================

pub static STAGING_TRAVELERS: TableSchema = TableSchema {
    name: "staging_travelers",
    columns: &[
        Column::new("iata_code", Varchar),
        Column::new("age", Integer),
        Column::new("visa", Integer),
        Column::new("gender", Varchar),
        Column::new("year_of_birth", Integer),
        Column::new("arrival_year", Integer),
        Column::new("arrival_month", Integer),
        Column::new("arrival_day", Integer),
    ],
};

pub static STAGING_AIRPORTS: TableSchema = TableSchema {
    name: "staging_airports",
    columns: &[
        Column::new("iata_code", Varchar),
        Column::new("type", Varchar),
        Column::new("name", Varchar),
        Column::new("elevation_ft", Float),
        Column::new("city", Varchar),
        Column::new("long", Varchar),
        Column::new("lat", Varchar),
        Column::new("state", Varchar),
    ],
};

pub static STAGING_CITIES: TableSchema = TableSchema {
    name: "staging_cities",
    columns: &[
        Column::new("city", Varchar),
        Column::new("median_age", Float),
        Column::new("cnt_male", Integer),
        Column::new("cnt_female", Integer),
        Column::new("population", Integer),
        Column::new("cnt_veterans", Integer),
        Column::new("cnt_foreign_born", Integer),
        Column::new("avg_household", Float),
        Column::new("state", Varchar),
        Column::new("cnt_white", Integer),
        Column::new("per_white", Float),
        Column::new("cnt_his_latino", Integer),
        Column::new("per_his_latino", Float),
        Column::new("cnt_asian", Integer),
        Column::new("per_asian", Float),
        Column::new("cnt_amer_ind_ak_native", Integer),
        Column::new("per_amer_ind_ak_native", Float),
        Column::new("cnt_black", Integer),
        Column::new("per_black_afr_amer", Float),
        Column::new("per_male", Float),
        Column::new("per_female", Float),
        Column::new("per_veterans", Float),
        Column::new("per_foreign_born", Float),
    ],
};

pub static STAGING_TEMPERATURES: TableSchema = TableSchema {
    name: "staging_temperatures",
    columns: &[
        Column::new("date", Varchar),
        Column::new("avg_temp", Float),
        Column::new("avg_temp_uncertainty", Float),
        Column::new("city", Varchar),
        Column::new("lat", Varchar),
        Column::new("long", Varchar),
        Column::new("month", Integer),
        Column::new("year", Integer),
        Column::new("average_temp_month", Float),
    ],
};

// =============================================================================
// Final tables
// =============================================================================

pub static VISA_CODES: TableSchema = TableSchema {
    name: "visa_codes",
    columns: &[
        Column::new("v_code", IntegerKey),
        Column::new("v_description", Varchar),
    ],
};

pub static CITY: TableSchema = TableSchema {
    name: "city",
    columns: &[
        Column::new("c_id", Identity),
        Column::new("c_name", Varchar),
        Column::new("c_state_code", Varchar),
        Column::new("c_lat", Varchar),
        Column::new("c_long", Varchar),
    ],
};

pub static AIRPORTS: TableSchema = TableSchema {
    name: "airports",
    columns: &[
        Column::new("a_id", Identity),
        Column::new("a_city_id", BigInt),
        Column::new("a_iata_code", Varchar),
        Column::new("a_type", Varchar),
        Column::new("a_name", Varchar),
        Column::new("a_elevation_ft", Float),
    ],
};

pub static TEMPERATURES: TableSchema = TableSchema {
    name: "temperatures",
    columns: &[
        Column::new("t_city_id", BigInt),
        Column::new("t_date", Varchar),
        Column::new("t_month", Integer),
        Column::new("t_year", Integer),
        Column::new("t_avg_temp", Float),
        Column::new("t_avg_temp_uncertainty", Float),
        Column::new("t_average_temp_month", Float),
    ],
};

pub static STATISTICS: TableSchema = TableSchema {
    name: "statistics",
    columns: &[
        Column::new("s_city_id", BigInt),
        Column::new("s_population", Integer),
        Column::new("s_median_age", Float),
        Column::new("s_avg_household", Float),
        Column::new("s_cnt_male", Integer),
        Column::new("s_per_male", Float),
        Column::new("s_cnt_female", Integer),
        Column::new("s_per_female", Float),
        Column::new("s_cnt_veterans", Integer),
        Column::new("s_per_veterans", Float),
        Column::new("s_cnt_foreign_born", Integer),
        Column::new("s_per_foreign_born", Float),
        Column::new("s_cnt_white", Integer),
        Column::new("s_per_white", Float),
        Column::new("s_cnt_his_latino", Integer),
        Column::new("s_per_his_latino", Float),
        Column::new("s_cnt_asian", Integer),
        Column::new("s_per_asian", Float),
        Column::new("s_cnt_amer_ind_ak_native", Integer),
        Column::new("s_per_amer_ind_ak_native", Float),
        Column::new("s_cnt_black", Integer),
        Column::new("s_per_black_afr_amer", Float),
    ],
};

pub static TRAVELERS: TableSchema = TableSchema {
    name: "travelers",
    columns: &[
        Column::new("p_id", Identity),
        Column::new("p_airport_id", Integer),
        Column::new("p_age", Integer),
        Column::new("p_visa_code", Integer),
        Column::new("p_gender", Varchar),
        Column::new("p_year_of_birth", Integer),
        Column::new("p_arrival_year", Integer),
        Column::new("p_arrival_month", Integer),
        Column::new("p_arrival_day", Integer),
    ],
};

pub static STAGING_TABLES: [&TableSchema; 4] = [
    &STAGING_TRAVELERS,
    &STAGING_AIRPORTS,
    &STAGING_CITIES,
    &STAGING_TEMPERATURES,
];

pub static FINAL_TABLES: [&TableSchema; 6] = [
    &VISA_CODES,
    &CITY,
    &AIRPORTS,
    &TEMPERATURES,
    &STATISTICS,
    &TRAVELERS,
];

/// Seed rows for `visa_codes`.
pub const VISA_CODE_SEED: [(i32, &str); 3] = [(1, "Business"), (2, "Pleasure"), (3, "Student")];

// =============================================================================
// DDL / validation generators
// =============================================================================

pub fn drop_statement(table: &TableSchema) -> String {
    format!("DROP TABLE IF EXISTS {}", table.name)
}

pub fn create_statement(table: &TableSchema) -> String {
    let columns: Vec<String> = table
        .columns
        .iter()
        .map(|c| format!("    {} {}", c.name, c.ty.sql()))
        .collect();
    format!("CREATE TABLE IF NOT EXISTS {} (\n{}\n)", table.name, columns.join(",\n"))
}

pub fn count_statement(table: &TableSchema) -> String {
    format!("select count(*) from {}", table.name)
}

/// 同名城市出現在多個州時，以城市名 join 的 temperatures 會重複計入
pub const AMBIGUOUS_CITY_NAMES_QUERY: &str =
    "select count(*) from (select c_name from city group by c_name having count(*) > 1) as dup";

// =============================================================================
// Bulk copy
// =============================================================================

/// Where the staged CSV artifacts live in object storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingLocation {
    pub bucket: String,
    pub folder: String,
    pub iam_role_arn: String,
}

impl StagingLocation {
    pub fn object_url(&self, key: &str) -> String {
        let folder = self.folder.trim_matches('/');
        if folder.is_empty() {
            format!("s3://{}/{}", self.bucket, key)
        } else {
            format!("s3://{}/{}/{}", self.bucket, folder, key)
        }
    }
}

/// Staging table fed by one output artifact.
#[derive(Debug, Clone, Copy)]
pub struct CopySource {
    pub table: &'static TableSchema,
    pub dataset: Dataset,
    /// 輸出檔是否有標頭列（travelers 分片沒有）
    pub has_header: bool,
}

pub static COPY_SOURCES: [CopySource; 4] = [
    CopySource {
        table: &STAGING_TRAVELERS,
        dataset: Dataset::Travelers,
        has_header: false,
    },
    CopySource {
        table: &STAGING_CITIES,
        dataset: Dataset::Cities,
        has_header: true,
    },
    CopySource {
        table: &STAGING_AIRPORTS,
        dataset: Dataset::Airports,
        has_header: true,
    },
    CopySource {
        table: &STAGING_TEMPERATURES,
        dataset: Dataset::Temperatures,
        has_header: true,
    },
];

/// `object_key` is the artifact name under the staging folder; for travelers it
/// is the directory prefix holding the parts.
pub fn copy_statement(source: &CopySource, location: &StagingLocation, object_key: &str) -> String {
    let mut statement = format!(
        "COPY {}\nFROM '{}'\nIAM_ROLE '{}'\nFORMAT AS CSV",
        source.table.name,
        location.object_url(object_key),
        location.iam_role_arn
    );
    if source.has_header {
        statement.push_str("\nIGNOREHEADER 1");
    }
    statement.push(';');
    statement
}

// =============================================================================
// Insert-from-staging steps
// =============================================================================

#[derive(Debug, Clone, Copy)]
pub struct InsertStep {
    pub name: &'static str,
    /// Final table written by this step.
    pub target: &'static str,
    /// Staging table read by this step, if any.
    pub staging: Option<&'static str>,
    /// Final tables that must already be populated.
    pub depends_on: &'static [&'static str],
    pub sql: StepSql,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepSql {
    Static(&'static str),
    /// `INSERT ... VALUES` rendered from [`VISA_CODE_SEED`]
    VisaSeed,
}

impl InsertStep {
    pub fn statement(&self) -> String {
        match self.sql {
            StepSql::Static(sql) => sql.to_string(),
            StepSql::VisaSeed => visa_seed_statement(),
        }
    }
}

fn visa_seed_statement() -> String {
    let values: Vec<String> = VISA_CODE_SEED
        .iter()
        .map(|(code, description)| format!("({}, '{}')", code, description))
        .collect();
    format!("INSERT INTO visa_codes (v_code, v_description)\nVALUES {}", values.join(", "))
}

pub static INSERT_STEPS: [InsertStep; 7] = [
    InsertStep {
        name: "visa_codes",
        target: "visa_codes",
        staging: None,
        depends_on: &[],
        sql: StepSql::VisaSeed,
    },
    InsertStep {
        name: "city",
        target: "city",
        staging: Some("staging_airports"),
        depends_on: &[],
        sql: StepSql::Static("INSERT INTO city (c_name, c_state_code)\n\
              SELECT city, state FROM staging_airports GROUP BY city, state"),
    },
    InsertStep {
        name: "city_coordinates",
        target: "city",
        staging: Some("staging_airports"),
        depends_on: &["city"],
        sql: StepSql::Static("UPDATE city SET c_lat = lat, c_long = long\n\
              FROM staging_airports\n\
              WHERE city.c_name = staging_airports.city AND city.c_state_code = staging_airports.state"),
    },
    InsertStep {
        name: "airports",
        target: "airports",
        staging: Some("staging_airports"),
        depends_on: &["city"],
        sql: StepSql::Static("INSERT INTO airports (a_city_id, a_iata_code, a_type, a_name, a_elevation_ft)\n\
              SELECT c.c_id, sa.iata_code, sa.type, sa.name, sa.elevation_ft\n\
              FROM staging_airports AS sa\n\
              JOIN city AS c ON sa.city = c.c_name AND sa.state = c.c_state_code"),
    },
    InsertStep {
        name: "temperatures",
        target: "temperatures",
        staging: Some("staging_temperatures"),
        depends_on: &["city"],
        sql: StepSql::Static("INSERT INTO temperatures (t_city_id, t_date, t_month, t_year, t_avg_temp, t_avg_temp_uncertainty, t_average_temp_month)\n\
              SELECT c.c_id, st.date, st.month, st.year, st.avg_temp, st.avg_temp_uncertainty, st.average_temp_month\n\
              FROM staging_temperatures AS st\n\
              JOIN city AS c ON st.city = c.c_name"),
    },
    InsertStep {
        name: "statistics",
        target: "statistics",
        staging: Some("staging_cities"),
        depends_on: &["city"],
        sql: StepSql::Static("INSERT INTO statistics (s_city_id, s_population, s_median_age, s_avg_household, s_cnt_male, s_per_male,\n\
                  s_cnt_female, s_per_female, s_cnt_veterans, s_per_veterans, s_cnt_foreign_born, s_per_foreign_born,\n\
                  s_cnt_white, s_per_white, s_cnt_his_latino, s_per_his_latino, s_cnt_asian, s_per_asian,\n\
                  s_cnt_amer_ind_ak_native, s_per_amer_ind_ak_native, s_cnt_black, s_per_black_afr_amer)\n\
              SELECT c.c_id, population, median_age, avg_household, cnt_male, per_male,\n\
                  cnt_female, per_female, cnt_veterans, per_veterans, cnt_foreign_born, per_foreign_born,\n\
                  cnt_white, per_white, cnt_his_latino, per_his_latino, cnt_asian, per_asian,\n\
                  cnt_amer_ind_ak_native, per_amer_ind_ak_native, cnt_black, per_black_afr_amer\n\
              FROM staging_cities AS sc\n\
              JOIN city AS c ON sc.city = c.c_name AND sc.state = c.c_state_code"),
    },
    InsertStep {
        name: "travelers",
        target: "travelers",
        staging: Some("staging_travelers"),
        depends_on: &["airports"],
        sql: StepSql::Static("INSERT INTO travelers (p_airport_id, p_age, p_visa_code, p_gender, p_year_of_birth, p_arrival_year, p_arrival_month, p_arrival_day)\n\
              SELECT a_id, age, visa, gender, year_of_birth, arrival_year, arrival_month, arrival_day\n\
              FROM staging_travelers AS st\n\
              JOIN airports ON a_iata_code = st.iata_code"),
    },
];

/// Rejects a step sequence where a step reads a final table that no earlier
/// step has populated. Out-of-order joins fail silently in the warehouse
/// (zero rows), so this is checked before anything runs.
pub fn check_insert_order(steps: &[InsertStep]) -> Result<()> {
    let mut populated: HashSet<&str> = HashSet::new();

    for step in steps {
        if let Some(missing) = step.depends_on.iter().find(|table| !populated.contains(*table)) {
            return Err(EtlError::ValidationError {
                message: format!(
                    "insert step '{}' depends on '{}' which has not been populated yet",
                    step.name, missing
                ),
            });
        }
        populated.insert(step.target);
    }

    Ok(())
}
