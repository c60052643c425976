//! Catalog queries and statement execution over an `rsfbclient` connection.

use rsfbclient::{prelude::*, FbError, SimpleConnection};
use tracing::debug;

use super::ISC_NO_META_UPDATE;
use crate::core::traits::{
    CatalogReader, ColumnRow, Connection, ParamDirection, ParamRow, StatementError,
    StatementExecutor,
};
use crate::error::{MetaError, Result};
use crate::typemap::TypeDescriptor;

const DOMAINS_SQL: &str = "SELECT RDB$FIELD_NAME, RDB$FIELD_TYPE, RDB$CHARACTER_LENGTH, \
     RDB$FIELD_SCALE, RDB$FIELD_SUB_TYPE, RDB$FIELD_PRECISION \
     FROM RDB$FIELDS \
     WHERE RDB$SYSTEM_FLAG = 0";

const TABLES_SQL: &str = "SELECT RDB$RELATION_NAME \
     FROM RDB$RELATIONS \
     WHERE RDB$SYSTEM_FLAG = 0 AND RDB$VIEW_BLR IS NULL";

const COLUMNS_SQL: &str = "SELECT RDB$FIELD_NAME, RDB$FIELD_SOURCE, RDB$NULL_FLAG \
     FROM RDB$RELATION_FIELDS \
     WHERE RDB$RELATION_NAME = ? \
     ORDER BY RDB$FIELD_POSITION";

const PROCEDURES_SQL: &str = "SELECT RDB$PROCEDURE_NAME \
     FROM RDB$PROCEDURES \
     WHERE RDB$SYSTEM_FLAG = 0";

const PARAMS_SQL: &str = "SELECT RDB$PARAMETER_NAME, RDB$FIELD_SOURCE \
     FROM RDB$PROCEDURE_PARAMETERS \
     WHERE RDB$PROCEDURE_NAME = ? AND RDB$PARAMETER_TYPE = ? \
     ORDER BY RDB$PARAMETER_NUMBER";

const SOURCE_SQL: &str = "SELECT RDB$PROCEDURE_SOURCE \
     FROM RDB$PROCEDURES \
     WHERE RDB$PROCEDURE_NAME = ?";

type DomainRow = (
    String,
    i64,
    Option<i64>,
    Option<i64>,
    Option<i64>,
    Option<i64>,
);

/// An open Firebird connection.
///
/// Dropping the value closes the attachment.
pub struct FirebirdConnection {
    conn: SimpleConnection,
}

impl FirebirdConnection {
    pub(super) fn new(conn: SimpleConnection) -> Self {
        Self { conn }
    }
}

fn narrow(value: i64, object: &str) -> Result<i32> {
    i32::try_from(value).map_err(|_| {
        MetaError::catalog(object, format!("catalog value {} out of range", value))
    })
}

fn narrow_opt(value: Option<i64>, object: &str) -> Result<Option<i32>> {
    value.map(|v| narrow(v, object)).transpose()
}

fn domain_descriptor(row: DomainRow) -> Result<(String, TypeDescriptor)> {
    let (name, code, length, scale, sub_type, precision) = row;
    let object = name.trim();
    let desc = TypeDescriptor::from_catalog(
        narrow(code, object)?,
        narrow_opt(length, object)?,
        narrow_opt(scale, object)?,
        narrow_opt(sub_type, object)?,
        narrow_opt(precision, object)?,
    );
    Ok((name, desc))
}

/// Convert a driver error into a statement error.
///
/// The wire protocol client reports the SQLCODE only, which is -1 for DDL
/// failures. "Already exists" errors are recognized by their message and
/// get `isc_no_meta_update` back as their code.
fn statement_error(err: FbError) -> StatementError {
    match err {
        FbError::Sql { msg, code } => {
            let code = if is_existing_object(&msg) {
                ISC_NO_META_UPDATE
            } else {
                code
            };
            StatementError::new(Some(code), msg)
        }
        other => StatementError::new(None, other.to_string()),
    }
}

fn is_existing_object(msg: &str) -> bool {
    let msg = msg.to_ascii_lowercase();
    msg.starts_with("unsuccessful metadata update") && msg.contains("already exists")
}

fn catalog_error(object: &str) -> impl FnOnce(FbError) -> MetaError + '_ {
    move |e| MetaError::catalog(object, e.to_string())
}

impl CatalogReader for FirebirdConnection {
    fn list_domains(&mut self) -> Result<Vec<(String, TypeDescriptor)>> {
        let rows: Vec<DomainRow> = self
            .conn
            .query(DOMAINS_SQL, ())
            .map_err(catalog_error("domains"))?;

        rows.into_iter().map(domain_descriptor).collect()
    }

    fn list_tables(&mut self) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = self
            .conn
            .query(TABLES_SQL, ())
            .map_err(catalog_error("tables"))?;
        Ok(rows.into_iter().map(|(name,)| name).collect())
    }

    fn list_columns(&mut self, table: &str) -> Result<Vec<ColumnRow>> {
        let rows: Vec<(String, String, Option<i64>)> = self
            .conn
            .query(COLUMNS_SQL, (table.to_string(),))
            .map_err(catalog_error(table))?;

        Ok(rows
            .into_iter()
            .map(|(name, domain_name, null_flag)| ColumnRow {
                name,
                domain_name,
                not_null: null_flag == Some(1),
            })
            .collect())
    }

    fn list_procedures(&mut self) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = self
            .conn
            .query(PROCEDURES_SQL, ())
            .map_err(catalog_error("procedures"))?;
        Ok(rows.into_iter().map(|(name,)| name).collect())
    }

    fn list_params(&mut self, procedure: &str, direction: ParamDirection) -> Result<Vec<ParamRow>> {
        let rows: Vec<(String, String)> = self
            .conn
            .query(
                PARAMS_SQL,
                (procedure.to_string(), direction.marker() as i64),
            )
            .map_err(catalog_error(procedure))?;

        Ok(rows
            .into_iter()
            .map(|(name, domain_name)| ParamRow { name, domain_name })
            .collect())
    }

    fn procedure_source(&mut self, procedure: &str) -> Result<String> {
        let row: Option<(Option<String>,)> = self
            .conn
            .query_first(SOURCE_SQL, (procedure.to_string(),))
            .map_err(catalog_error(procedure))?;
        Ok(row.and_then(|(source,)| source).unwrap_or_default())
    }
}

impl StatementExecutor for FirebirdConnection {
    fn execute_statement(&mut self, sql: &str) -> std::result::Result<(), StatementError> {
        match self.conn.execute(sql, ()) {
            Ok(affected) => {
                debug!("Statement affected {} row(s)", affected);
                Ok(())
            }
            Err(e) => Err(statement_error(e)),
        }
    }
}

impl Connection for FirebirdConnection {
    fn close(self) -> Result<()> {
        drop(self.conn);
        debug!("Firebird connection closed");
        Ok(())
    }
}
