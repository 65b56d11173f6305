use crate::domain::model::{CityRecord, Normalized, RawCityRow};
use crate::utils::format::share;
use std::collections::HashMap;

/// 人口統計中的五個族裔類別，順序即輸出欄位順序
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Race {
    White,
    HispanicOrLatino,
    Asian,
    AmericanIndianAlaskaNative,
    BlackAfricanAmerican,
}

impl Race {
    pub const ALL: [Race; 5] = [
        Race::White,
        Race::HispanicOrLatino,
        Race::Asian,
        Race::AmericanIndianAlaskaNative,
        Race::BlackAfricanAmerican,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Race::White => "White",
            Race::HispanicOrLatino => "Hispanic or Latino",
            Race::Asian => "Asian",
            Race::AmericanIndianAlaskaNative => "American Indian and Alaska Native",
            Race::BlackAfricanAmerican => "Black or African-American",
        }
    }

    pub fn from_label(label: &str) -> Option<Race> {
        let label = label.trim();
        Race::ALL.into_iter().find(|race| race.label() == label)
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

/// 一個 (city, state) 的樞紐列：基本人口資料取自第一筆，族裔人數逐筆填入
struct CityPivot {
    base: RawCityRow,
    race_counts: [Option<f64>; 5],
}

/// Pivots the long-format demographics (one row per city, state and race) into
/// one wide row per (city, state). A race missing for a city stays `None`.
pub fn normalize_cities(rows: Vec<RawCityRow>) -> Normalized<CityRecord> {
    let input_rows = rows.len();
    let mut order: Vec<(String, String)> = Vec::new();
    let mut pivots: HashMap<(String, String), CityPivot> = HashMap::new();
    let mut unknown_races = 0usize;

    for row in rows {
        let key = (row.city.clone(), row.state.clone());
        let race = row.race.as_deref().and_then(Race::from_label);
        if race.is_none() {
            unknown_races += 1;
        }
        let count = row.count;

        let pivot = pivots.entry(key.clone()).or_insert_with(|| {
            order.push(key);
            CityPivot {
                base: row,
                race_counts: [None; 5],
            }
        });

        if let Some(race) = race {
            // 重複的 (city, state, race) 以第一筆為準
            let slot = &mut pivot.race_counts[race.index()];
            if slot.is_none() {
                *slot = count;
            }
        }
    }

    if unknown_races > 0 {
        tracing::debug!("Ignored {} rows with an unrecognised race category", unknown_races);
    }

    let mut records: Vec<CityRecord> = order
        .iter()
        .filter_map(|key| pivots.remove(key))
        .map(build_record)
        .collect();

    records.sort_by(|a, b| a.city.cmp(&b.city).then_with(|| a.state.cmp(&b.state)));

    // 每個城市原本有多列（每個族裔一列），輸出後只剩一列
    Normalized::new(records, input_rows)
}

fn build_record(pivot: CityPivot) -> CityRecord {
    let base = pivot.base;
    let population = base.total_population;
    let counts = pivot.race_counts;
    let as_int = |value: Option<f64>| value.map(|v| v as i64);

    CityRecord {
        city: base.city,
        median_age: base.median_age,
        cnt_male: as_int(base.male_population),
        cnt_female: as_int(base.female_population),
        population: as_int(population),
        cnt_veterans: as_int(base.veterans),
        cnt_foreign_born: as_int(base.foreign_born),
        avg_household: base.avg_household_size,
        state: base.state_code.trim().to_string(),
        cnt_white: as_int(counts[Race::White.index()]),
        per_white: share(counts[Race::White.index()], population),
        cnt_his_latino: as_int(counts[Race::HispanicOrLatino.index()]),
        per_his_latino: share(counts[Race::HispanicOrLatino.index()], population),
        cnt_asian: as_int(counts[Race::Asian.index()]),
        per_asian: share(counts[Race::Asian.index()], population),
        cnt_amer_ind_ak_native: as_int(counts[Race::AmericanIndianAlaskaNative.index()]),
        per_amer_ind_ak_native: share(counts[Race::AmericanIndianAlaskaNative.index()], population),
        cnt_black: as_int(counts[Race::BlackAfricanAmerican.index()]),
        per_black_afr_amer: share(counts[Race::BlackAfricanAmerican.index()], population),
        per_male: share(base.male_population, population),
        per_female: share(base.female_population, population),
        per_veterans: share(base.veterans, population),
        per_foreign_born: share(base.foreign_born, population),
    }
}
