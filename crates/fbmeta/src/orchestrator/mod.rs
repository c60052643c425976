//! Workflow coordinator: build, export and update.
//!
//! Every workflow opens exactly one connection, walks the object categories
//! in dependency order (domains, tables, procedures) and closes the
//! connection before returning. Error paths drop the connection, which
//! closes it as well.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::config::Config;
use crate::core::traits::{Connection, Connector};
use crate::drivers::firebird::FirebirdConnector;
use crate::error::{MetaError, Result};
use crate::executor::{BatchExecutor, BatchReport, CodeClassifier};
use crate::export::{export_category, ExportedFile};
use crate::script::{discover_scripts, ScriptCategory};

/// Workflow coordinator.
pub struct Orchestrator<C: Connector = FirebirdConnector> {
    config: Config,
    connector: C,
    classifier: CodeClassifier,
    strict: bool,
}

/// One script file applied by build or update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppliedFile {
    pub category: ScriptCategory,
    pub path: PathBuf,
    pub executed: usize,
    pub skipped_existing: usize,
    pub failed: usize,
}

/// Result of a build or update run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyResult {
    /// Unique run identifier.
    pub run_id: String,

    /// "build" or "update".
    pub workflow: String,

    /// Database file created by a build.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<PathBuf>,

    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_seconds: f64,

    /// Files in the order they were applied.
    pub files: Vec<AppliedFile>,

    /// Statement counters summed over all files.
    pub report: BatchReport,
}

/// Result of an export run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportResult {
    /// Unique run identifier.
    pub run_id: String,
    pub output_dir: PathBuf,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_seconds: f64,
    pub files: Vec<ExportedFile>,
}

impl Orchestrator<FirebirdConnector> {
    /// Create an orchestrator talking to Firebird.
    pub fn new(config: Config) -> Self {
        let connector = FirebirdConnector::new(config.firebird.clone());
        Self::with_connector(config, connector)
    }
}

impl<C: Connector> Orchestrator<C> {
    /// Create an orchestrator over any connector.
    pub fn with_connector(config: Config, connector: C) -> Self {
        let classifier = CodeClassifier::new(config.execution.already_exists_codes.iter().copied());
        let strict = config.execution.fail_on_statement_errors;
        Self {
            config,
            connector,
            classifier,
            strict,
        }
    }

    /// Fail runs that end with failed statements.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Create a new database in `db_dir` and apply every script in
    /// `scripts_dir` to it.
    ///
    /// Aborts without touching anything if the database file already exists.
    pub fn build(&self, db_dir: &Path, scripts_dir: &Path) -> Result<ApplyResult> {
        require_path(db_dir, "--db-dir")?;
        require_path(scripts_dir, "--scripts-dir")?;
        require_scripts_dir(scripts_dir)?;

        let started_at = Utc::now();
        let run_id = uuid::Uuid::new_v4().to_string();
        info!("Starting build run: {}", run_id);

        if !db_dir.exists() {
            fs::create_dir_all(db_dir)?;
        }
        let db_path = fs::canonicalize(db_dir)?.join(&self.config.firebird.database_file_name);
        if db_path.exists() {
            error!("Database file already exists: {:?}", db_path);
            return Err(MetaError::DatabaseExists(db_path));
        }

        let mut conn = self
            .connector
            .create_database(&db_path)
            .inspect_err(|e| error!("Error creating database: {}", e))?;

        let (files, report) = self
            .apply_scripts(&mut conn, scripts_dir)
            .inspect_err(|e| error!("Error while building database: {}", e))?;
        conn.close()?;

        self.finish_apply(run_id, "build", Some(db_path), started_at, files, report)
    }

    /// Apply every script in `scripts_dir` to an existing database.
    ///
    /// Objects that already exist are skipped, so re-running is safe.
    pub fn update(&self, connection_string: &str, scripts_dir: &Path) -> Result<ApplyResult> {
        require_text(connection_string, "--connection-string")?;
        require_path(scripts_dir, "--scripts-dir")?;
        require_scripts_dir(scripts_dir)?;

        let started_at = Utc::now();
        let run_id = uuid::Uuid::new_v4().to_string();
        info!("Starting update run: {}", run_id);

        let mut conn = self
            .connector
            .connect(connection_string)
            .inspect_err(|e| error!("Error connecting to database: {}", e))?;

        let (files, report) = self
            .apply_scripts(&mut conn, scripts_dir)
            .inspect_err(|e| error!("Error while updating database: {}", e))?;
        conn.close()?;

        self.finish_apply(run_id, "update", None, started_at, files, report)
    }

    /// Export domains, tables and procedures of an existing database into
    /// `output_dir`.
    pub fn export(&self, connection_string: &str, output_dir: &Path) -> Result<ExportResult> {
        require_text(connection_string, "--connection-string")?;
        require_path(output_dir, "--output-dir")?;

        let started_at = Utc::now();
        let run_id = uuid::Uuid::new_v4().to_string();
        info!("Starting export run: {}", run_id);

        if !output_dir.exists() {
            fs::create_dir_all(output_dir)?;
        }

        let mut conn = self
            .connector
            .connect(connection_string)
            .inspect_err(|e| error!("Error connecting to database: {}", e))?;

        let mut files = Vec::with_capacity(ScriptCategory::ALL.len());
        for category in ScriptCategory::ALL {
            let file = export_category(&mut conn, output_dir, category)
                .inspect_err(|e| error!("Error exporting {}: {}", category, e))?;
            files.push(file);
        }
        conn.close()?;

        let completed_at = Utc::now();
        info!("Export completed: {} file(s) in {:?}", files.len(), output_dir);
        Ok(ExportResult {
            run_id,
            output_dir: output_dir.to_path_buf(),
            started_at,
            completed_at,
            duration_seconds: elapsed_seconds(started_at, completed_at),
            files,
        })
    }

    fn apply_scripts(
        &self,
        conn: &mut C::Conn,
        scripts_dir: &Path,
    ) -> Result<(Vec<AppliedFile>, BatchReport)> {
        let executor = BatchExecutor::new(&self.classifier);
        let mut files = Vec::new();
        let mut total = BatchReport::default();

        for category in ScriptCategory::ALL {
            let paths = discover_scripts(scripts_dir, category)?;
            if paths.is_empty() {
                info!("No {} scripts found", category);
            }

            for path in paths {
                info!("Applying {} from {:?}", category, path);
                let report = executor.execute_file(conn, &path)?;
                files.push(AppliedFile {
                    category,
                    path,
                    executed: report.executed,
                    skipped_existing: report.skipped_existing,
                    failed: report.failed(),
                });
                total.merge(report);
            }
        }

        Ok((files, total))
    }

    fn finish_apply(
        &self,
        run_id: String,
        workflow: &str,
        database: Option<PathBuf>,
        started_at: DateTime<Utc>,
        files: Vec<AppliedFile>,
        report: BatchReport,
    ) -> Result<ApplyResult> {
        let completed_at = Utc::now();
        info!(
            "{} finished: {} executed, {} already existed, {} failed",
            workflow,
            report.executed,
            report.skipped_existing,
            report.failed()
        );

        if !report.is_clean() {
            warn!("{} statement(s) failed during {}", report.failed(), workflow);
            if self.strict {
                return Err(MetaError::StatementsFailed {
                    failed: report.failed(),
                });
            }
        }

        Ok(ApplyResult {
            run_id,
            workflow: workflow.to_string(),
            database,
            started_at,
            completed_at,
            duration_seconds: elapsed_seconds(started_at, completed_at),
            files,
            report,
        })
    }
}

impl ApplyResult {
    /// Convert to JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl ExportResult {
    /// Convert to JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn elapsed_seconds(started_at: DateTime<Utc>, completed_at: DateTime<Utc>) -> f64 {
    (completed_at - started_at).num_milliseconds() as f64 / 1000.0
}

fn require_text(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(MetaError::Usage(format!("{} must not be empty", name)));
    }
    Ok(())
}

fn require_path(value: &Path, name: &str) -> Result<()> {
    require_text(&value.to_string_lossy(), name)
}

fn require_scripts_dir(dir: &Path) -> Result<()> {
    if !dir.is_dir() {
        error!("Scripts directory not found: {:?}", dir);
        return Err(MetaError::ScriptsDirMissing(dir.to_path_buf()));
    }
    Ok(())
}
