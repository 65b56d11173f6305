use crate::core::schema::{
    check_insert_order, copy_statement, count_statement, create_statement, drop_statement, InsertStep,
    StagingLocation, TableSchema, AMBIGUOUS_CITY_NAMES_QUERY, COPY_SOURCES, FINAL_TABLES, INSERT_STEPS,
    STAGING_TABLES,
};
use crate::domain::model::Dataset;
use crate::domain::ports::Warehouse;
use crate::utils::error::{EtlError, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// 載入流程的各階段，嚴格依序執行
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    DropAll,
    CreateAll,
    CopyStaging,
    InsertFinal,
    Validate,
}

impl fmt::Display for LoadPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoadPhase::DropAll => "DROP_ALL",
            LoadPhase::CreateAll => "CREATE_ALL",
            LoadPhase::CopyStaging => "COPY_STAGING",
            LoadPhase::InsertFinal => "INSERT_FINAL",
            LoadPhase::Validate => "VALIDATE",
        };
        f.write_str(name)
    }
}

/// A named statement within a phase.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedStatement {
    pub label: String,
    pub sql: String,
}

impl PlannedStatement {
    fn new(label: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            sql: sql.into(),
        }
    }
}

/// Object keys of the staged artifacts, relative to the staging folder.
#[derive(Debug, Clone)]
pub struct StagedArtifacts {
    pub cities: String,
    pub airports: String,
    pub temperatures: String,
    /// Directory prefix of the traveler parts.
    pub travelers: String,
}

impl StagedArtifacts {
    fn key(&self, dataset: Dataset) -> String {
        match dataset {
            Dataset::Cities => self.cities.clone(),
            Dataset::Airports => self.airports.clone(),
            Dataset::Temperatures => self.temperatures.clone(),
            Dataset::Travelers => format!("{}/", self.travelers.trim_end_matches('/')),
        }
    }
}

/// Every statement of one load run, grouped by phase.
#[derive(Debug, Clone)]
pub struct LoadPlan {
    pub drops: Vec<PlannedStatement>,
    pub creates: Vec<PlannedStatement>,
    pub copies: Vec<PlannedStatement>,
    pub inserts: Vec<InsertStep>,
}

impl LoadPlan {
    pub fn new(location: &StagingLocation, artifacts: &StagedArtifacts) -> Self {
        let tables: Vec<&TableSchema> = STAGING_TABLES.iter().chain(FINAL_TABLES.iter()).copied().collect();

        Self {
            drops: tables
                .iter()
                .map(|t| PlannedStatement::new(t.name, drop_statement(t)))
                .collect(),
            creates: tables
                .iter()
                .map(|t| PlannedStatement::new(t.name, create_statement(t)))
                .collect(),
            copies: COPY_SOURCES
                .iter()
                .map(|source| {
                    PlannedStatement::new(
                        source.table.name,
                        copy_statement(source, location, &artifacts.key(source.dataset)),
                    )
                })
                .collect(),
            inserts: INSERT_STEPS.to_vec(),
        }
    }

    /// Renders the plan as a SQL script (used by `--dry-run`).
    pub fn to_script(&self) -> String {
        let mut script = String::new();
        let sections: [(LoadPhase, Vec<PlannedStatement>); 4] = [
            (LoadPhase::DropAll, self.drops.clone()),
            (LoadPhase::CreateAll, self.creates.clone()),
            (LoadPhase::CopyStaging, self.copies.clone()),
            (
                LoadPhase::InsertFinal,
                self.inserts.iter().map(|s| PlannedStatement::new(s.name, s.statement())).collect(),
            ),
        ];

        for (phase, statements) in sections {
            script.push_str(&format!("-- {}\n", phase));
            for statement in statements {
                script.push_str(&format!("-- {}\n{};\n\n", statement.label, statement.sql.trim_end_matches(';')));
            }
        }
        script
    }
}

/// Rows lost to join misses between staging and final tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JoinLoss {
    pub airports: i64,
    pub statistics: i64,
    pub travelers: i64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadReport {
    pub staging_counts: BTreeMap<String, i64>,
    pub final_counts: BTreeMap<String, i64>,
    pub join_loss: JoinLoss,
    /// City names that exist in more than one state; temperatures join on
    /// name only and duplicate into each of them.
    pub ambiguous_city_names: i64,
}

impl LoadReport {
    pub fn empty_tables(&self) -> Vec<&str> {
        self.final_counts
            .iter()
            .filter(|(_, count)| **count == 0)
            .map(|(table, _)| table.as_str())
            .collect()
    }

    fn staging(&self, table: &str) -> i64 {
        self.staging_counts.get(table).copied().unwrap_or(0)
    }

    fn loaded(&self, table: &str) -> i64 {
        self.final_counts.get(table).copied().unwrap_or(0)
    }
}

/// Runs a [`LoadPlan`] against a warehouse: drop, create, copy, insert,
/// validate. One pass, no retries; the first failing statement stops the run.
pub struct Loader<W: Warehouse> {
    warehouse: W,
}

impl<W: Warehouse> Loader<W> {
    pub fn new(warehouse: W) -> Self {
        Self { warehouse }
    }

    pub async fn run(&self, plan: &LoadPlan) -> Result<LoadReport> {
        check_insert_order(&plan.inserts)?;

        self.run_phase(LoadPhase::DropAll, &plan.drops).await?;
        self.run_phase(LoadPhase::CreateAll, &plan.creates).await?;
        self.run_phase(LoadPhase::CopyStaging, &plan.copies).await?;

        let inserts: Vec<PlannedStatement> = plan
            .inserts
            .iter()
            .map(|step| PlannedStatement::new(step.name, step.statement()))
            .collect();
        self.run_phase(LoadPhase::InsertFinal, &inserts).await?;

        self.validate().await
    }

    async fn run_phase(&self, phase: LoadPhase, statements: &[PlannedStatement]) -> Result<()> {
        tracing::info!("🗄️ {} ({} statements)", phase, statements.len());

        for statement in statements {
            tracing::debug!("{} -> {}", phase, statement.label);
            self.warehouse
                .execute(&statement.sql)
                .await
                .map_err(|e| warehouse_error(phase, &statement.label, e))?;
        }
        Ok(())
    }

    async fn count(&self, label: &str, query: &str) -> Result<i64> {
        self.warehouse
            .count(query)
            .await
            .map_err(|e| warehouse_error(LoadPhase::Validate, label, e))
    }

    async fn validate(&self) -> Result<LoadReport> {
        tracing::info!("🔍 {}", LoadPhase::Validate);
        let mut report = LoadReport::default();

        for table in STAGING_TABLES {
            let count = self.count(table.name, &count_statement(table)).await?;
            tracing::info!("  {}: {} rows", table.name, count);
            report.staging_counts.insert(table.name.to_string(), count);
        }

        for table in FINAL_TABLES {
            let count = self.count(table.name, &count_statement(table)).await?;
            tracing::info!("  {}: {} rows", table.name, count);
            report.final_counts.insert(table.name.to_string(), count);
        }

        report.ambiguous_city_names = self.count("ambiguous_city_names", AMBIGUOUS_CITY_NAMES_QUERY).await?;

        report.join_loss = JoinLoss {
            airports: (report.staging("staging_airports") - report.loaded("airports")).max(0),
            statistics: (report.staging("staging_cities") - report.loaded("statistics")).max(0),
            travelers: (report.staging("staging_travelers") - report.loaded("travelers")).max(0),
        };

        for table in report.empty_tables() {
            tracing::warn!("⚠️ Table {} is empty after load", table);
        }
        if report.join_loss != JoinLoss::default() {
            tracing::warn!(
                "⚠️ Rows excluded by join misses - airports: {}, statistics: {}, travelers: {}",
                report.join_loss.airports,
                report.join_loss.statistics,
                report.join_loss.travelers
            );
        }
        if report.ambiguous_city_names > 0 {
            tracing::warn!(
                "⚠️ {} city names exist in more than one state; their temperature rows are attached to every match",
                report.ambiguous_city_names
            );
        }

        Ok(report)
    }
}

fn warehouse_error(phase: LoadPhase, label: &str, error: EtlError) -> EtlError {
    match error {
        EtlError::WarehouseError { message, .. } => EtlError::WarehouseError {
            phase: phase.to_string(),
            statement: label.to_string(),
            message,
        },
        other => EtlError::WarehouseError {
            phase: phase.to_string(),
            statement: label.to_string(),
            message: other.to_string(),
        },
    }
}
