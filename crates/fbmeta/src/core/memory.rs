//! In-memory database used by unit tests.
//!
//! Understands just enough of the DDL produced by the exporter to act as a
//! build target: `CREATE DOMAIN`, `CREATE TABLE` and `CREATE PROCEDURE`.
//! Creating an object twice fails with the Firebird metadata update code.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

use crate::drivers::firebird::ISC_NO_META_UPDATE;
use crate::error::{MetaError, Result};
use crate::typemap::TypeDescriptor;

use super::traits::{
    CatalogReader, ColumnRow, Connection, Connector, ParamDirection, ParamRow, StatementError,
    StatementExecutor,
};

const ISC_DSQL_ERROR: i32 = 335544569;

#[derive(Debug, Clone, Default)]
pub struct MemoryProcedure {
    pub name: String,
    pub inputs: Vec<ParamRow>,
    pub outputs: Vec<ParamRow>,
    pub source: String,
}

#[derive(Debug, Default)]
pub struct MemoryDatabase {
    pub domains: Vec<(String, TypeDescriptor)>,
    pub tables: Vec<(String, Vec<ColumnRow>)>,
    pub procedures: Vec<MemoryProcedure>,
    /// Every statement that reached the database, in order.
    pub executed: Vec<String>,
    /// Statements containing any of these fragments fail with a syntax error.
    pub failing: Vec<String>,
    pub closed: bool,
}

impl MemoryDatabase {
    pub fn shared(self) -> Rc<RefCell<MemoryDatabase>> {
        Rc::new(RefCell::new(self))
    }

    pub fn table(&self, name: &str) -> Option<&Vec<ColumnRow>> {
        self.tables.iter().find(|(n, _)| n == name).map(|(_, c)| c)
    }

    fn apply(&mut self, sql: &str) -> std::result::Result<(), StatementError> {
        if let Some(fragment) = self.failing.iter().find(|f| sql.contains(f.as_str())) {
            return Err(StatementError::new(
                Some(ISC_DSQL_ERROR),
                format!("Dynamic SQL Error\nToken unknown - {}", fragment),
            ));
        }

        if let Some(rest) = sql.strip_prefix("CREATE DOMAIN ") {
            let (name, type_sql) = rest.split_once(" AS ").unwrap_or((rest, ""));
            let name = name.trim().to_string();
            if self.domains.iter().any(|(n, _)| *n == name) {
                return Err(already_exists("DOMAIN", &name));
            }
            self.domains.push((name, parse_type(type_sql.trim())));
        } else if let Some(rest) = sql.strip_prefix("CREATE TABLE ") {
            let open = rest.find('(').unwrap_or(rest.len());
            let close = rest.rfind(')').unwrap_or(rest.len());
            let name = rest[..open].trim().to_string();
            if self.tables.iter().any(|(n, _)| *n == name) {
                return Err(already_exists("TABLE", &name));
            }
            let columns = rest
                .get(open + 1..close)
                .unwrap_or("")
                .split(',')
                .filter_map(parse_column)
                .collect();
            self.tables.push((name, columns));
        } else if let Some(rest) = sql.strip_prefix("CREATE PROCEDURE ") {
            let proc = parse_procedure(rest);
            if self.procedures.iter().any(|p| p.name == proc.name) {
                return Err(already_exists("PROCEDURE", &proc.name));
            }
            self.procedures.push(proc);
        }

        Ok(())
    }
}

fn already_exists(kind: &str, name: &str) -> StatementError {
    StatementError::new(
        Some(ISC_NO_META_UPDATE),
        format!(
            "unsuccessful metadata update\nCREATE {} {} failed\n{} {} already exists",
            kind, name, kind, name
        ),
    )
}

fn parse_type(sql: &str) -> TypeDescriptor {
    let (base, args) = match sql.split_once('(') {
        Some((base, args)) => (base, args.trim_end_matches(')')),
        None => (sql, ""),
    };
    let nums: Vec<i32> = args.split(',').filter_map(|n| n.trim().parse().ok()).collect();
    let arg = |i: usize| nums.get(i).copied().unwrap_or(0);
    match base.trim() {
        "SMALLINT" => TypeDescriptor::new(7),
        "INTEGER" => TypeDescriptor::new(8),
        "DATE" => TypeDescriptor::new(12),
        "TIMESTAMP" => TypeDescriptor::new(35),
        "BIGINT" => TypeDescriptor::new(16).with_numeric(0, 18, -1),
        "NUMERIC" => TypeDescriptor::new(16).with_numeric(1, arg(0), -arg(1)),
        "DECIMAL" => TypeDescriptor::new(16).with_numeric(2, arg(0), -arg(1)),
        "CHAR" => TypeDescriptor::new(14).with_length(arg(0)),
        "VARCHAR" => TypeDescriptor::new(37).with_length(arg(0)),
        _ => TypeDescriptor::new(0),
    }
}

fn parse_column(part: &str) -> Option<ColumnRow> {
    let mut words = part.split_whitespace();
    let name = words.next()?.to_string();
    let domain_name = words.next()?.to_string();
    Some(ColumnRow {
        name,
        domain_name,
        not_null: part.contains("NOT NULL"),
    })
}

fn parse_params(list: &str) -> Vec<ParamRow> {
    list.trim_start_matches('(')
        .trim_end_matches(')')
        .split(',')
        .filter_map(|p| {
            let mut words = p.split_whitespace();
            Some(ParamRow {
                name: words.next()?.to_string(),
                domain_name: words.next()?.to_string(),
            })
        })
        .collect()
}

fn parse_procedure(rest: &str) -> MemoryProcedure {
    let (header, source) = rest.split_once("\nAS\n").unwrap_or((rest, ""));
    let mut lines = header.lines();
    let mut proc = MemoryProcedure {
        name: lines.next().unwrap_or("").trim().to_string(),
        source: source.to_string(),
        ..MemoryProcedure::default()
    };
    for line in lines {
        if let Some(outputs) = line.strip_prefix("RETURNS ") {
            proc.outputs = parse_params(outputs);
        } else {
            proc.inputs = parse_params(line);
        }
    }
    proc
}

/// Catalog names come back blank-padded like `CHAR(63)` columns.
fn padded(name: &str) -> String {
    format!("{:<63}", name)
}

pub struct MemoryConnection {
    pub db: Rc<RefCell<MemoryDatabase>>,
}

impl CatalogReader for MemoryConnection {
    fn list_domains(&mut self) -> Result<Vec<(String, TypeDescriptor)>> {
        let db = self.db.borrow();
        Ok(db.domains.iter().map(|(n, d)| (padded(n), *d)).collect())
    }

    fn list_tables(&mut self) -> Result<Vec<String>> {
        let db = self.db.borrow();
        Ok(db.tables.iter().map(|(n, _)| padded(n)).collect())
    }

    fn list_columns(&mut self, table: &str) -> Result<Vec<ColumnRow>> {
        let db = self.db.borrow();
        let columns = db
            .table(table)
            .ok_or_else(|| MetaError::catalog(table, "no such table"))?;
        Ok(columns
            .iter()
            .map(|c| ColumnRow {
                name: padded(&c.name),
                domain_name: padded(&c.domain_name),
                not_null: c.not_null,
            })
            .collect())
    }

    fn list_procedures(&mut self) -> Result<Vec<String>> {
        let db = self.db.borrow();
        Ok(db.procedures.iter().map(|p| padded(&p.name)).collect())
    }

    fn list_params(&mut self, procedure: &str, direction: ParamDirection) -> Result<Vec<ParamRow>> {
        let db = self.db.borrow();
        let Some(proc) = db.procedures.iter().find(|p| p.name == procedure) else {
            return Ok(Vec::new());
        };
        let params = match direction {
            ParamDirection::Input => &proc.inputs,
            ParamDirection::Output => &proc.outputs,
        };
        Ok(params.clone())
    }

    fn procedure_source(&mut self, procedure: &str) -> Result<String> {
        let db = self.db.borrow();
        Ok(db
            .procedures
            .iter()
            .find(|p| p.name == procedure)
            .map(|p| p.source.clone())
            .unwrap_or_default())
    }
}

impl StatementExecutor for MemoryConnection {
    fn execute_statement(&mut self, sql: &str) -> std::result::Result<(), StatementError> {
        let mut db = self.db.borrow_mut();
        db.executed.push(sql.to_string());
        db.apply(sql)
    }
}

impl Connection for MemoryConnection {
    fn close(self) -> Result<()> {
        self.db.borrow_mut().closed = true;
        Ok(())
    }
}

/// Connector over named in-memory databases.
#[derive(Default)]
pub struct MemoryConnector {
    pub databases: RefCell<HashMap<String, Rc<RefCell<MemoryDatabase>>>>,
}

impl MemoryConnector {
    pub fn with_database(name: &str, db: MemoryDatabase) -> Self {
        let connector = Self::default();
        connector
            .databases
            .borrow_mut()
            .insert(name.to_string(), db.shared());
        connector
    }

    pub fn database(&self, name: &str) -> Option<Rc<RefCell<MemoryDatabase>>> {
        self.databases.borrow().get(name).cloned()
    }
}

impl Connector for MemoryConnector {
    type Conn = MemoryConnection;

    fn connect(&self, connection_string: &str) -> Result<MemoryConnection> {
        let db = self.database(connection_string).ok_or_else(|| {
            MetaError::connection("database not found", connection_string.to_string())
        })?;
        Ok(MemoryConnection { db })
    }

    fn create_database(&self, path: &Path) -> Result<MemoryConnection> {
        std::fs::write(path, b"")?;
        let db = MemoryDatabase::default().shared();
        self.databases
            .borrow_mut()
            .insert(path.display().to_string(), db.clone());
        Ok(MemoryConnection { db })
    }
}
