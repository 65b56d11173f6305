mod common;

use std::fs;
use std::sync::Arc;
use tempfile::TempDir;
use travel_warehouse_etl::adapters::csv_source::CsvTravelerSource;
use travel_warehouse_etl::core::upload::Uploader;
use travel_warehouse_etl::domain::model::Dataset;
use travel_warehouse_etl::utils::validation::Validate;
use travel_warehouse_etl::{LocalStorage, ParallelExecutor, PrepEngine, SequentialExecutor};

#[tokio::test]
async fn test_prep_end_to_end_with_local_upload() {
    let dir = TempDir::new().unwrap();
    let bucket = TempDir::new().unwrap();
    let config = common::write_inputs(dir.path());
    config.validate().unwrap();

    let source = Arc::new(CsvTravelerSource::new(&config.input.travelers));
    let engine = PrepEngine::new(config, SequentialExecutor, source)
        .with_uploader(Uploader::new(LocalStorage::new(bucket.path()), "staging"));

    let report = engine.run().await;
    assert!(report.is_success(), "failures: {:?}", report.failures());

    let summary = |dataset: Dataset| {
        report
            .stages
            .iter()
            .find(|(d, _)| *d == dataset)
            .and_then(|(_, r)| r.as_ref().ok())
            .unwrap()
            .clone()
    };
    assert_eq!(summary(Dataset::Cities).output_rows, 2);
    assert_eq!(summary(Dataset::Airports).output_rows, 2);
    assert_eq!(summary(Dataset::Temperatures).output_rows, 2);

    let travelers = summary(Dataset::Travelers);
    assert_eq!(travelers.input_rows, 4);
    assert_eq!(travelers.output_rows, 2);
    assert_eq!(travelers.dropped_rows, 2);

    let out = dir.path().join("out");
    let cities = fs::read_to_string(out.join("cities.csv")).unwrap();
    let mut lines = cities.lines();
    assert!(lines.next().unwrap().starts_with("city,median_age,cnt_male"));
    assert!(lines.next().unwrap().starts_with("Dallas,"));
    assert!(lines.next().unwrap().starts_with("Springfield,"));

    let airports = fs::read_to_string(out.join("airports.csv")).unwrap();
    assert!(airports.contains("SFO,large_airport"));
    assert!(!airports.contains("YYZ"));

    let temperatures = fs::read_to_string(out.join("temperatures.csv")).unwrap();
    assert!(temperatures.contains("2013-08-01,22.5,0.2,Dallas"));
    assert!(temperatures.contains(",8,2013,22.0"));

    assert_eq!(
        fs::read_to_string(out.join("travelers/part-00000.csv")).unwrap(),
        "LOS,37,2,F,1979,2016,4,1\n"
    );
    assert_eq!(
        fs::read_to_string(out.join("travelers/part-00001.csv")).unwrap(),
        "DAL,25,3,M,1991,2016,4,2\n"
    );

    let upload = report.upload.as_ref().unwrap().as_ref().unwrap();
    assert_eq!(upload.files, 5);
    let staged = bucket.path().join("staging");
    assert!(staged.join("cities.csv").exists());
    assert!(staged.join("airports.csv").exists());
    assert!(staged.join("temperatures.csv").exists());
    assert!(staged.join("travelers/part-00000.csv").exists());
    assert!(staged.join("travelers/part-00001.csv").exists());
    assert!(!staged.join("travelers/_SUCCESS").exists());
}

#[tokio::test]
async fn test_parallel_executor_matches_sequential() {
    let dir = TempDir::new().unwrap();
    let config = common::write_inputs(dir.path());
    let source = Arc::new(CsvTravelerSource::new(&config.input.travelers));

    let engine: PrepEngine<LocalStorage, _> = PrepEngine::new(config, ParallelExecutor::new(2), source);
    let report = engine.run().await;

    assert!(report.is_success());
    assert!(report.upload.is_none());
    let parts = dir.path().join("out/travelers");
    assert!(fs::read_to_string(parts.join("part-00000.csv")).unwrap().starts_with("LOS,"));
    assert!(fs::read_to_string(parts.join("part-00001.csv")).unwrap().starts_with("DAL,"));
}

#[tokio::test]
async fn test_bad_coordinates_fail_airports_only_and_block_upload() {
    let dir = TempDir::new().unwrap();
    let bucket = TempDir::new().unwrap();
    let config = common::write_inputs(dir.path());
    fs::write(
        &config.input.airports,
        format!(
            "{}\nKBAD,small_airport,Broken,1,NA,US,US-TX,Nowhere,KBAD,BAD,BAD,\"not-a-coordinate\"\n",
            common::AIRPORTS.trim_end()
        ),
    )
    .unwrap();

    let source = Arc::new(CsvTravelerSource::new(&config.input.travelers));
    let engine = PrepEngine::new(config, SequentialExecutor, source)
        .with_uploader(Uploader::new(LocalStorage::new(bucket.path()), "staging"));
    let report = engine.run().await;

    let failures = report.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, Dataset::Airports);
    assert!(failures[0].1.to_string().contains("BAD"));

    // 其餘階段仍然完成
    assert!(dir.path().join("out/temperatures.csv").exists());
    assert!(dir.path().join("out/travelers/part-00000.csv").exists());

    assert!(report.upload.is_none());
    assert!(!bucket.path().join("staging").exists());

    let view = serde_json::to_value(report.view()).unwrap();
    assert_eq!(view["succeeded"], false);
    assert_eq!(view["stages"][1]["dataset"], "airports");
    assert_eq!(view["stages"][1]["succeeded"], false);
}
