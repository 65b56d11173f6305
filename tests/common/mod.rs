use std::fs;
use std::path::Path;
use travel_warehouse_etl::EtlConfig;

pub const CITIES: &str = "City;State;Median Age;Male Population;Female Population;Total Population;Number of Veterans;Foreign-born;Average Household Size;State Code;Race;Count
Springfield;Illinois;38.5;55000;61000;116000;7000;5000;2.3;IL;White;80000
Springfield;Illinois;38.5;55000;61000;116000;7000;5000;2.3;IL;Asian;3000
Dallas;Texas;32.6;640000;660000;1300000;50000;320000;2.6;TX;Hispanic or Latino;550000
";

pub const AIRPORTS: &str = "ident,type,name,elevation_ft,continent,iso_country,iso_region,municipality,gps_code,iata_code,local_code,coordinates
KSFO,large_airport,San Francisco International Airport,13,NA,US,US-CA,San Francisco,KSFO,SFO,SFO,\"-122.41, 37.62\"
KDAL,medium_airport,Dallas Love Field,487,NA,US,US-TX,Dallas,KDAL,DAL,DAL,\"-96.85, 32.85\"
CYYZ,large_airport,Lester B. Pearson International Airport,569,NA,CA,CA-ON,Toronto,CYYZ,YYZ,,\"-79.63, 43.68\"
00A,heliport,Total Rf Heliport,11,NA,US,US-PA,Bensalem,00A,,00A,\"-74.93, 40.07\"
";

pub const TEMPERATURES: &str = "dt,AverageTemperature,AverageTemperatureUncertainty,City,Country,Latitude,Longitude
2013-08-01,22.5,0.2,Dallas,United States,32.95N,96.70W
2012-08-01,21.5,0.3,Dallas,United States,32.95N,96.70W
2013-09-01,,,Dallas,United States,32.95N,96.70W
2013-08-01,15.0,0.3,Toronto,Canada,44.20N,80.50W
";

pub const TRAVELERS_HEADER: &str = "cicid,i94yr,i94mon,i94port,arrdate,i94bir,i94visa,biryear,gender\n";

/// Writes the raw inputs under `dir` and returns a config pointing at them.
pub fn write_inputs(dir: &Path) -> EtlConfig {
    fs::write(dir.join("us-cities-demographics.csv"), CITIES).unwrap();
    fs::write(dir.join("airport-codes_csv.csv"), AIRPORTS).unwrap();
    fs::write(dir.join("GlobalLandTemperaturesByCity.csv"), TEMPERATURES).unwrap();

    let i94 = dir.join("i94");
    fs::create_dir_all(&i94).unwrap();
    fs::write(
        i94.join("part-0.csv"),
        format!(
            "{}1.0,2016.0,4.0,LOS,20545.0,37.0,2.0,1979.0,F\n2.0,2016.0,4.0,XXX,20545.0,40.0,1.0,1976.0,M\n",
            TRAVELERS_HEADER
        ),
    )
    .unwrap();
    fs::write(
        i94.join("part-1.csv"),
        format!("{}3.0,2016.0,4.0,DAL,20546.0,25.0,3.0,1991.0,M\n4.0,2016.0,4.0,NYC,20546.0,30.0,1.0,1986.0,\n", TRAVELERS_HEADER),
    )
    .unwrap();
    fs::write(i94.join("_SUCCESS"), "").unwrap();

    let toml = format!(
        r#"
[input]
cities = "{d}/us-cities-demographics.csv"
airports = "{d}/airport-codes_csv.csv"
temperatures = "{d}/GlobalLandTemperaturesByCity.csv"
travelers = "{d}/i94"

[output]
folder = "{d}/out"
cities = "cities.csv"
airports = "airports.csv"
temperatures = "temperatures.csv"
travelers = "travelers"

[s3]
bucket = "travel-lake"
folder = "staging"

[iam_role]
arn = "arn:aws:iam::123456789012:role/dwh"

[processing]
workers = 2
"#,
        d = dir.display()
    );
    EtlConfig::from_toml_str(&toml).unwrap()
}
