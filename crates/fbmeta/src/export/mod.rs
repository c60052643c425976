//! Catalog export: reads definitions through a [`CatalogReader`] and writes
//! them as terminated DDL scripts.
//!
//! Each sub-export owns one output file (`domains.sql`, `tables.sql`,
//! `procedures.sql`) and overwrites it. Reader calls return owned rows, so
//! no catalog cursor is open while the next query runs.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::schema::{
    ColumnDefinition, DomainDefinition, ParamDefinition, ProcedureDefinition, TableDefinition,
};
use crate::core::traits::{CatalogReader, ParamDirection};
use crate::error::Result;
use crate::script::{ScriptCategory, ScriptWriter};

/// One script file written by an export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedFile {
    pub category: ScriptCategory,
    pub path: PathBuf,
    /// Number of objects (statements) written.
    pub objects: usize,
}

/// Read all non-system domains.
pub fn read_domains<R: CatalogReader + ?Sized>(reader: &mut R) -> Result<Vec<DomainDefinition>> {
    Ok(reader
        .list_domains()?
        .into_iter()
        .map(|(name, desc)| DomainDefinition::new(name, desc))
        .collect())
}

/// Read all non-system tables with their columns.
pub fn read_tables<R: CatalogReader + ?Sized>(reader: &mut R) -> Result<Vec<TableDefinition>> {
    let names: Vec<String> = reader
        .list_tables()?
        .iter()
        .map(|n| n.trim().to_string())
        .collect();

    let mut tables = Vec::with_capacity(names.len());
    for name in names {
        let columns = reader
            .list_columns(&name)?
            .into_iter()
            .map(|c| ColumnDefinition::new(c.name, c.domain_name, c.not_null))
            .collect();
        tables.push(TableDefinition::new(name, columns));
    }
    Ok(tables)
}

/// Read all non-system procedures with parameters and body.
pub fn read_procedures<R: CatalogReader + ?Sized>(
    reader: &mut R,
) -> Result<Vec<ProcedureDefinition>> {
    let names: Vec<String> = reader
        .list_procedures()?
        .iter()
        .map(|n| n.trim().to_string())
        .collect();

    let mut procedures = Vec::with_capacity(names.len());
    for name in names {
        let inputs = read_params(reader, &name, ParamDirection::Input)?;
        let outputs = read_params(reader, &name, ParamDirection::Output)?;
        let body = reader.procedure_source(&name)?;
        procedures.push(ProcedureDefinition::new(name, inputs, outputs, &body));
    }
    Ok(procedures)
}

fn read_params<R: CatalogReader + ?Sized>(
    reader: &mut R,
    procedure: &str,
    direction: ParamDirection,
) -> Result<Vec<ParamDefinition>> {
    Ok(reader
        .list_params(procedure, direction)?
        .into_iter()
        .map(|p| ParamDefinition::new(p.name, p.domain_name))
        .collect())
}

fn write_script(
    out_dir: &Path,
    category: ScriptCategory,
    statements: impl IntoIterator<Item = String>,
) -> Result<ExportedFile> {
    let mut writer = ScriptWriter::create(out_dir.join(category.export_file_name()))?;
    for statement in statements {
        writer.write_statement(&statement)?;
    }
    let (path, objects) = writer.finish()?;
    info!("Exported {} {} to {:?}", objects, category, path);
    Ok(ExportedFile {
        category,
        path,
        objects,
    })
}

/// Write `domains.sql`.
pub fn export_domains<R: CatalogReader + ?Sized>(
    reader: &mut R,
    out_dir: &Path,
) -> Result<ExportedFile> {
    let domains = read_domains(reader)?;
    write_script(
        out_dir,
        ScriptCategory::Domains,
        domains.iter().map(DomainDefinition::to_ddl),
    )
}

/// Write `tables.sql`.
pub fn export_tables<R: CatalogReader + ?Sized>(
    reader: &mut R,
    out_dir: &Path,
) -> Result<ExportedFile> {
    let tables = read_tables(reader)?;
    write_script(
        out_dir,
        ScriptCategory::Tables,
        tables.iter().map(TableDefinition::to_ddl),
    )
}

/// Write `procedures.sql`.
pub fn export_procedures<R: CatalogReader + ?Sized>(
    reader: &mut R,
    out_dir: &Path,
) -> Result<ExportedFile> {
    let procedures = read_procedures(reader)?;
    write_script(
        out_dir,
        ScriptCategory::Procedures,
        procedures.iter().map(ProcedureDefinition::to_ddl),
    )
}

/// Run one sub-export by category.
pub fn export_category<R: CatalogReader + ?Sized>(
    reader: &mut R,
    out_dir: &Path,
    category: ScriptCategory,
) -> Result<ExportedFile> {
    match category {
        ScriptCategory::Domains => export_domains(reader, out_dir),
        ScriptCategory::Tables => export_tables(reader, out_dir),
        ScriptCategory::Procedures => export_procedures(reader, out_dir),
    }
}
