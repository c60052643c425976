//! Best-effort statement batch execution.
//!
//! Each statement runs on its own against the open connection. There is no
//! transaction around the batch and no rollback: a statement whose object
//! already exists is skipped, any other failure is logged and recorded, and
//! execution moves on to the next statement.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::core::traits::{ErrorClassifier, StatementError, StatementExecutor};
use crate::error::Result;
use crate::script::read_script;

/// Classifier keyed on driver error codes.
#[derive(Debug, Clone, Default)]
pub struct CodeClassifier {
    codes: HashSet<i32>,
}

impl CodeClassifier {
    pub fn new(codes: impl IntoIterator<Item = i32>) -> Self {
        Self {
            codes: codes.into_iter().collect(),
        }
    }
}

impl ErrorClassifier for CodeClassifier {
    fn is_already_exists(&self, err: &StatementError) -> bool {
        err.code.is_some_and(|c| self.codes.contains(&c))
    }
}

/// A statement that failed with an error other than "already exists".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementFailure {
    /// Script file the statement came from, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Zero-based position within its batch.
    pub index: usize,

    pub statement: String,
    pub code: Option<i32>,
    pub message: String,
}

/// Outcome counters of one or more batches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    /// Statements that ran successfully.
    pub executed: usize,

    /// Statements skipped because their object already exists.
    pub skipped_existing: usize,

    /// Statements that failed for any other reason.
    pub failures: Vec<StatementFailure>,
}

impl BatchReport {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Total statements attempted.
    pub fn total(&self) -> usize {
        self.executed + self.skipped_existing + self.failures.len()
    }

    /// Add another report's counters into this one.
    pub fn merge(&mut self, other: BatchReport) {
        self.executed += other.executed;
        self.skipped_existing += other.skipped_existing;
        self.failures.extend(other.failures);
    }
}

/// Runs statement batches against a connection.
pub struct BatchExecutor<'a> {
    classifier: &'a dyn ErrorClassifier,
}

impl<'a> BatchExecutor<'a> {
    pub fn new(classifier: &'a dyn ErrorClassifier) -> Self {
        Self { classifier }
    }

    /// Execute statements in order. Never aborts on a statement error.
    pub fn execute<C, S>(&self, conn: &mut C, statements: &[S]) -> BatchReport
    where
        C: StatementExecutor + ?Sized,
        S: AsRef<str>,
    {
        let mut report = BatchReport::default();

        for (index, statement) in statements.iter().enumerate() {
            let sql = statement.as_ref().trim();
            if sql.is_empty() {
                continue;
            }

            match conn.execute_statement(sql) {
                Ok(()) => {
                    debug!("Executed statement {}", index);
                    report.executed += 1;
                }
                Err(e) if self.classifier.is_already_exists(&e) => {
                    debug!("Statement {} skipped, object already exists", index);
                    report.skipped_existing += 1;
                }
                Err(e) => {
                    warn!("Error executing statement:\n{}\n{}", sql, e.message);
                    report.failures.push(StatementFailure {
                        file: None,
                        index,
                        statement: sql.to_string(),
                        code: e.code,
                        message: e.message,
                    });
                }
            }
        }

        report
    }

    /// Read, split and execute one script file.
    ///
    /// Only reading the file can fail; statement errors land in the report.
    pub fn execute_file<C>(&self, conn: &mut C, path: &Path) -> Result<BatchReport>
    where
        C: StatementExecutor + ?Sized,
    {
        let statements = read_script(path)?;
        let mut report = self.execute(conn, &statements);

        let file = path.display().to_string();
        for failure in &mut report.failures {
            failure.file = Some(file.clone());
        }

        info!(
            "Applied {:?}: {} executed, {} already existed, {} failed",
            path,
            report.executed,
            report.skipped_existing,
            report.failed()
        );
        Ok(report)
    }
}
