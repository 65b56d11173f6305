use anyhow::{bail, Context};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use travel_warehouse_etl::adapters::csv_source::CsvTravelerSource;
use travel_warehouse_etl::config::{Cli, Command};
use travel_warehouse_etl::core::upload::Uploader;
use travel_warehouse_etl::domain::ports::{Storage, TravelerSource};
use travel_warehouse_etl::utils::{logger, validation::Validate};
use travel_warehouse_etl::{EtlConfig, EtlError, LoadPlan, LocalStorage, ParallelExecutor, PrepEngine};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    if cli.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    if let Err(e) = run(cli).await {
        match e.downcast_ref::<EtlError>() {
            Some(etl_error) => {
                tracing::error!("❌ {} (Category: {:?})", etl_error, etl_error.category());
                tracing::error!("💡 Recovery suggestion: {}", etl_error.recovery_suggestion());
                eprintln!("❌ {}", etl_error.user_friendly_message());
                eprintln!("💡 建議: {}", etl_error.recovery_suggestion());
            }
            None => {
                tracing::error!("❌ {:#}", e);
                eprintln!("❌ {:#}", e);
            }
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.command.config_path().clone();
    tracing::info!("📁 Loading configuration from: {}", config_path.display());
    let mut config = EtlConfig::from_file(&config_path)?;

    match cli.command {
        Command::Prep {
            skip_upload,
            workers,
            report,
            ..
        } => {
            if let Some(workers) = workers {
                config.processing.workers = workers;
                tracing::info!("🔧 Workers overridden to: {}", workers);
            }
            config.validate()?;
            prep(config, skip_upload, cli.monitor, report).await
        }
        Command::Load { dry_run, report, .. } => {
            config.validate()?;
            load(config, dry_run, report).await
        }
    }
}

async fn prep(config: EtlConfig, skip_upload: bool, monitor: bool, report: Option<PathBuf>) -> anyhow::Result<()> {
    let source: Arc<dyn TravelerSource> = Arc::new(CsvTravelerSource::new(&config.input.travelers));
    let executor = ParallelExecutor::new(config.processing.workers);

    if skip_upload {
        tracing::info!("⏭️ Upload skipped, staged files stay in {}", config.output.folder);
        let engine: PrepEngine<LocalStorage, _> =
            PrepEngine::new(config, executor, source).with_monitoring(monitor);
        return finish_prep(engine, report).await;
    }

    #[cfg(feature = "s3")]
    {
        use travel_warehouse_etl::adapters::s3::S3Storage;

        config.validate_upload()?;
        let s3 = config.s3()?.clone();
        let storage = S3Storage::from_config(config.aws()?, &s3.bucket).await;
        tracing::info!("☁️ Staging to s3://{}/{}", s3.bucket, s3.folder);
        let engine = PrepEngine::new(config, executor, source)
            .with_uploader(Uploader::new(storage, s3.folder))
            .with_monitoring(monitor);
        finish_prep(engine, report).await
    }

    #[cfg(not(feature = "s3"))]
    {
        // 未編入 S3 支援時鏡像到本機目錄
        let mirror = Path::new(&config.output.folder).join("upload");
        let prefix = config.s3.as_ref().map(|s3| s3.folder.clone()).unwrap_or_default();
        tracing::warn!("⚠️ Built without S3 support, mirroring staged files to {}", mirror.display());
        let engine = PrepEngine::new(config, executor, source)
            .with_uploader(Uploader::new(LocalStorage::new(mirror), prefix))
            .with_monitoring(monitor);
        finish_prep(engine, report).await
    }
}

async fn finish_prep<S: Storage>(
    engine: PrepEngine<S, ParallelExecutor>,
    report_path: Option<PathBuf>,
) -> anyhow::Result<()> {
    let report = engine.run().await;

    if let Some(path) = report_path {
        write_report(&path, &report.view())?;
    }

    let failures = report.failures();
    if !failures.is_empty() {
        let names: Vec<&str> = failures.iter().map(|(dataset, _)| dataset.name()).collect();
        bail!("Data preparation failed for: {}", names.join(", "));
    }
    if let Some(Err(e)) = report.upload {
        return Err(e.into());
    }

    println!("✅ Data preparation completed successfully!");
    Ok(())
}

async fn load(config: EtlConfig, dry_run: bool, report: Option<PathBuf>) -> anyhow::Result<()> {
    let location = config.staging_location()?;
    let plan = LoadPlan::new(&location, &config.staged_artifacts());

    if dry_run {
        tracing::info!("🔍 DRY RUN MODE - printing the load script");
        println!("{}", plan.to_script());
        return Ok(());
    }

    #[cfg(feature = "redshift")]
    {
        use travel_warehouse_etl::adapters::redshift::RedshiftWarehouse;
        use travel_warehouse_etl::Loader;

        let warehouse = RedshiftWarehouse::connect(config.warehouse()?).await?;
        let load_report = Loader::new(warehouse).run(&plan).await?;
        if let Some(path) = report {
            write_report(&path, &load_report)?;
        }
        println!("✅ Warehouse load completed successfully!");
        Ok(())
    }

    #[cfg(not(feature = "redshift"))]
    {
        let _ = report;
        Err(EtlError::ConfigError {
            message: "this binary was built without the `redshift` feature; use --dry-run or rebuild".to_string(),
        }
        .into())
    }
}

fn write_report<T: serde::Serialize>(path: &Path, report: &T) -> anyhow::Result<()> {
    let json = serde_json::to_vec_pretty(report)?;
    std::fs::write(path, json).with_context(|| format!("cannot write report to {}", path.display()))?;
    tracing::info!("📝 Report written to {}", path.display());
    Ok(())
}
