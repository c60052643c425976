//! Script files: statement splitting, discovery and writing.
//!
//! A script is plain SQL text in which every statement is followed by a line
//! holding [`STATEMENT_TERMINATOR`]. The exporter writes this format and the
//! build/update workflows read it back, so the two paths stay compatible.
//! The terminator is the only statement boundary; no SQL parsing is done.

use std::fmt;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{MetaError, Result};

/// Marker line that ends every statement in a script file.
pub const STATEMENT_TERMINATOR: &str = "--@@END_OF_STATEMENT@@";

/// Split script text into trimmed, non-empty statements in file order.
pub fn split_statements(raw: &str) -> Vec<String> {
    raw.split(STATEMENT_TERMINATOR)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Join statements into script text, terminating each one.
pub fn join_statements<S: AsRef<str>>(statements: &[S]) -> String {
    let mut out = String::new();
    for statement in statements {
        out.push_str(statement.as_ref());
        out.push('\n');
        out.push_str(STATEMENT_TERMINATOR);
        out.push('\n');
    }
    out
}

/// Read a script file and split it into statements.
pub fn read_script(path: &Path) -> Result<Vec<String>> {
    let raw = fs::read_to_string(path)?;
    let statements = split_statements(&raw);
    debug!("Read {} statement(s) from {:?}", statements.len(), path);
    Ok(statements)
}

/// Object category of a script file; also the apply order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptCategory {
    Domains,
    Tables,
    Procedures,
}

impl ScriptCategory {
    /// Categories in dependency order.
    pub const ALL: [ScriptCategory; 3] = [
        ScriptCategory::Domains,
        ScriptCategory::Tables,
        ScriptCategory::Procedures,
    ];

    /// File name prefix used for discovery.
    pub fn prefix(&self) -> &'static str {
        match self {
            ScriptCategory::Domains => "domains",
            ScriptCategory::Tables => "tables",
            ScriptCategory::Procedures => "procedures",
        }
    }

    /// File written by the exporter for this category.
    pub fn export_file_name(&self) -> String {
        format!("{}.sql", self.prefix())
    }

    /// Whether a file name matches `<prefix>*.sql` (ASCII case-insensitive).
    pub fn matches(&self, file_name: &str) -> bool {
        let lower = file_name.to_ascii_lowercase();
        lower.starts_with(self.prefix()) && lower.ends_with(".sql")
    }
}

impl fmt::Display for ScriptCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Find the script files of one category, sorted by file name.
pub fn discover_scripts(dir: &Path, category: ScriptCategory) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(MetaError::ScriptsDirMissing(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        if name.to_str().is_some_and(|n| category.matches(n)) {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

/// Buffered writer for terminated statements.
pub struct ScriptWriter {
    path: PathBuf,
    out: BufWriter<fs::File>,
    statements: usize,
}

impl ScriptWriter {
    /// Create (or truncate) the script file at `path`.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = fs::File::create(&path)?;
        Ok(Self {
            path,
            out: BufWriter::new(file),
            statements: 0,
        })
    }

    /// Append one statement followed by the terminator line.
    pub fn write_statement(&mut self, statement: &str) -> Result<()> {
        writeln!(self.out, "{}", statement)?;
        writeln!(self.out, "{}", STATEMENT_TERMINATOR)?;
        self.statements += 1;
        Ok(())
    }

    /// Flush to disk and return the path and statement count.
    pub fn finish(mut self) -> Result<(PathBuf, usize)> {
        self.out.flush()?;
        Ok((self.path, self.statements))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_split_two_statements() {
        let raw = "CREATE TABLE A (...)\n--@@END_OF_STATEMENT@@\nCREATE TABLE B (...)\n--@@END_OF_STATEMENT@@";
        let statements = split_statements(raw);
        assert_eq!(statements, vec!["CREATE TABLE A (...)", "CREATE TABLE B (...)"]);
        assert!(statements.iter().all(|s| !s.contains(STATEMENT_TERMINATOR)));
    }

    #[test]
    fn test_split_drops_blank_fragments() {
        let raw = "\n  \n--@@END_OF_STATEMENT@@\r\n\t--@@END_OF_STATEMENT@@SELECT 1\n";
        assert_eq!(split_statements(raw), vec!["SELECT 1"]);
        assert!(split_statements("").is_empty());
        assert!(split_statements("   \n\t").is_empty());
    }

    #[test]
    fn test_split_without_trailing_terminator() {
        let raw = "CREATE DOMAIN D AS INTEGER\n--@@END_OF_STATEMENT@@\nCREATE DOMAIN E AS DATE\n";
        assert_eq!(
            split_statements(raw),
            vec!["CREATE DOMAIN D AS INTEGER", "CREATE DOMAIN E AS DATE"]
        );
    }

    #[test]
    fn test_split_join_round_trip() {
        let statements = vec![
            "CREATE DOMAIN D_ID AS INTEGER".to_string(),
            "CREATE TABLE T (\n  ID D_ID NOT NULL\n)".to_string(),
            "CREATE PROCEDURE P\nAS\nBEGIN\n  SUSPEND;\nEND".to_string(),
        ];
        let joined = join_statements(&statements);
        assert_eq!(split_statements(&joined), statements);
    }

    #[test]
    fn test_split_is_idempotent() {
        let raw = "  A \n--@@END_OF_STATEMENT@@\n\nB\n--@@END_OF_STATEMENT@@\n";
        let once = split_statements(raw);
        let twice: Vec<String> = once.iter().flat_map(|s| split_statements(s)).collect();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_category_matching() {
        assert!(ScriptCategory::Domains.matches("domains.sql"));
        assert!(ScriptCategory::Domains.matches("domains_02_extra.sql"));
        assert!(ScriptCategory::Tables.matches("TABLES.SQL"));
        assert!(!ScriptCategory::Tables.matches("my_tables.sql"));
        assert!(!ScriptCategory::Procedures.matches("procedures.sql.bak"));
        assert_eq!(ScriptCategory::Procedures.export_file_name(), "procedures.sql");
    }

    #[test]
    fn test_discover_scripts_sorted_by_name() {
        let dir = TempDir::new().unwrap();
        for name in ["tables_b.sql", "tables.sql", "tables_a.sql", "domains.sql", "notes.txt"] {
            fs::write(dir.path().join(name), "").unwrap();
        }
        fs::create_dir(dir.path().join("tables_dir.sql")).unwrap();

        let files = discover_scripts(dir.path(), ScriptCategory::Tables).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["tables.sql", "tables_a.sql", "tables_b.sql"]);

        let procs = discover_scripts(dir.path(), ScriptCategory::Procedures).unwrap();
        assert!(procs.is_empty());
    }

    #[test]
    fn test_discover_missing_dir() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        let err = discover_scripts(&missing, ScriptCategory::Domains).unwrap_err();
        assert!(matches!(err, MetaError::ScriptsDirMissing(_)));
    }

    #[test]
    fn test_writer_output_is_readable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("domains.sql");
        fs::write(&path, "stale content").unwrap();

        let mut writer = ScriptWriter::create(&path).unwrap();
        writer.write_statement("CREATE DOMAIN A AS INTEGER").unwrap();
        writer.write_statement("CREATE DOMAIN B AS DATE").unwrap();
        let (written, count) = writer.finish().unwrap();

        assert_eq!(written, path);
        assert_eq!(count, 2);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "CREATE DOMAIN A AS INTEGER\n--@@END_OF_STATEMENT@@\nCREATE DOMAIN B AS DATE\n--@@END_OF_STATEMENT@@\n"
        );
        assert_eq!(read_script(&path).unwrap().len(), 2);
    }
}
