use crate::domain::model::{AirportRecord, Normalized, RawAirportRow};
use crate::utils::error::{EtlError, Result};
use crate::utils::format::{format_latitude, format_longitude, round2};

/// IATA 欄位中代表「沒有代碼」的佔位值
const PLACEHOLDER_IATA_CODES: [&str; 2] = ["0", "-"];

fn has_real_iata_code(row: &RawAirportRow) -> bool {
    match row.iata_code.as_deref().map(str::trim) {
        Some(code) => !code.is_empty() && !PLACEHOLDER_IATA_CODES.contains(&code),
        None => false,
    }
}

fn is_us(row: &RawAirportRow) -> bool {
    row.iso_country.as_deref().map(str::trim) == Some("US")
}

/// `"-122.41, 37.77"` -> `(-122.41, 37.77)`
fn split_coordinates(coordinates: &str) -> Option<(f64, f64)> {
    let (long, lat) = coordinates.split_once(',')?;
    Some((long.trim().parse().ok()?, lat.trim().parse().ok()?))
}

/// `"US-CA"` -> `"CA"`
fn region_state(iso_region: &str) -> String {
    match iso_region.split_once('-') {
        Some((_, state)) => state.to_string(),
        None => String::new(),
    }
}

/// Keeps US airports with a usable IATA code and reshapes coordinates into
/// hemisphere notation. Sorted descending by city.
pub fn normalize_airports(rows: Vec<RawAirportRow>) -> Result<Normalized<AirportRecord>> {
    let input_rows = rows.len();
    let mut records = Vec::new();

    for row in rows.into_iter().filter(has_real_iata_code).filter(is_us) {
        let iata_code = row.iata_code.unwrap_or_default().trim().to_string();

        let coordinates = row.coordinates.unwrap_or_default();
        let (long, lat) = split_coordinates(&coordinates).ok_or_else(|| {
            EtlError::input(
                "airports",
                format!("invalid coordinates '{}' for airport {}", coordinates, iata_code),
            )
        })?;

        records.push(AirportRecord {
            iata_code,
            kind: row.kind.unwrap_or_default(),
            name: row.name.unwrap_or_default(),
            elevation_ft: row.elevation_ft,
            city: row.municipality,
            long: format_longitude(round2(long)),
            lat: format_latitude(round2(lat)),
            state: region_state(row.iso_region.as_deref().unwrap_or_default()),
        });
    }

    // 依城市名稱遞減排序（None 排最後）
    records.sort_by(|a, b| b.city.cmp(&a.city));

    Ok(Normalized::new(records, input_rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::csv_io::read_records;
    use crate::utils::format::parse_hemisphere;

    fn raw(iata: Option<&str>, country: &str, region: &str, city: &str, coordinates: &str) -> RawAirportRow {
        RawAirportRow {
            iata_code: iata.map(str::to_string),
            kind: Some("large_airport".to_string()),
            name: Some(format!("{} International", city)),
            elevation_ft: Some(13.0),
            iso_country: Some(country.to_string()),
            iso_region: Some(region.to_string()),
            municipality: Some(city.to_string()),
            coordinates: Some(coordinates.to_string()),
        }
    }

    #[test]
    fn test_san_francisco_reshape() {
        let rows = vec![raw(Some("SFO"), "US", "US-CA", "San Francisco", "-122.41, 37.77")];

        let result = normalize_airports(rows).unwrap();

        assert_eq!(result.records.len(), 1);
        let airport = &result.records[0];
        assert_eq!(airport.long, "122.41W");
        assert_eq!(airport.lat, "37.77N");
        assert_eq!(airport.state, "CA");
        assert_eq!(airport.city.as_deref(), Some("San Francisco"));
    }

    #[test]
    fn test_filters_placeholder_codes_and_foreign_airports() {
        let rows = vec![
            raw(None, "US", "US-TX", "Nowhere", "-97.0, 32.0"),
            raw(Some("0"), "US", "US-TX", "Zero", "-97.0, 32.0"),
            raw(Some("-"), "US", "US-TX", "Dash", "-97.0, 32.0"),
            raw(Some(""), "US", "US-TX", "Blank", "-97.0, 32.0"),
            raw(Some("YYZ"), "CA", "CA-ON", "Toronto", "-79.63, 43.68"),
            raw(Some("DFW"), "US", "US-TX", "Dallas", "-97.04, 32.90"),
        ];

        let result = normalize_airports(rows).unwrap();

        assert_eq!(result.records.len(), 1);
        assert_eq!(result.dropped_rows, 5);
        assert_eq!(result.records[0].iata_code, "DFW");
    }

    #[test]
    fn test_sorted_descending_by_city() {
        let rows = vec![
            raw(Some("AUS"), "US", "US-TX", "Austin", "-97.67, 30.19"),
            raw(Some("SEA"), "US", "US-WA", "Seattle", "-122.30, 47.44"),
            raw(Some("DEN"), "US", "US-CO", "Denver", "-104.67, 39.86"),
        ];

        let cities: Vec<String> = normalize_airports(rows)
            .unwrap()
            .records
            .into_iter()
            .filter_map(|a| a.city)
            .collect();

        assert_eq!(cities, vec!["Seattle", "Denver", "Austin"]);
    }

    #[test]
    fn test_hemisphere_sign_and_rounding() {
        let rows = vec![
            raw(Some("GUM"), "US", "US-GU", "Hagatna", "144.796, 13.4834"),
            raw(Some("PPG"), "US", "US-AS", "Pago Pago", "-170.7105, -14.331"),
        ];

        for airport in normalize_airports(rows).unwrap().records {
            let long = parse_hemisphere(&airport.long).unwrap();
            let lat = parse_hemisphere(&airport.lat).unwrap();
            match airport.iata_code.as_str() {
                "GUM" => {
                    assert_eq!(airport.long, "144.8E");
                    assert_eq!((long, lat), (144.8, 13.48));
                }
                "PPG" => {
                    assert_eq!(airport.long, "170.71W");
                    assert_eq!(airport.lat, "14.33S");
                    assert_eq!((long, lat), (-170.71, -14.33));
                }
                other => panic!("unexpected airport {}", other),
            }
        }
    }

    #[test]
    fn test_whole_degree_coordinates_keep_decimal() {
        let rows = vec![raw(Some("WHL"), "US", "US-KS", "Wholeton", "-100.0, 0.001")];

        let airport = &normalize_airports(rows).unwrap().records[0];
        assert_eq!(airport.long, "100.0W");
        assert_eq!(airport.lat, "0.0N");
    }

    #[test]
    fn test_invalid_coordinates_are_fatal() {
        let rows = vec![raw(Some("BAD"), "US", "US-NY", "Albany", "not-a-coordinate")];
        let err = normalize_airports(rows).unwrap_err();
        assert!(err.to_string().contains("BAD"));
    }

    #[test]
    fn test_parse_source_format() {
        let data = "ident,type,name,elevation_ft,continent,iso_country,iso_region,municipality,gps_code,iata_code,local_code,coordinates\n\
KSFO,large_airport,San Francisco International Airport,13,NA,US,US-CA,San Francisco,KSFO,SFO,SFO,\"-122.375, 37.61899948120117\"\n\
00A,heliport,Total Rf Heliport,11,NA,US,US-PA,Bensalem,00A,,00A,\"-74.93360137939453, 40.07080078125\"\n";

        let rows: Vec<RawAirportRow> = read_records(data.as_bytes(), b',', "airports").unwrap();
        let result = normalize_airports(rows).unwrap();

        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].elevation_ft, Some(13.0));
        assert_eq!(result.records[0].long, "122.38W");
        assert_eq!(result.records[0].lat, "37.62N");
    }
}
