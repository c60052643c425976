//! Schema definitions read from the catalog and their DDL rendering.
//!
//! Definitions are transient: built during one export pass, rendered to
//! script text and dropped.

use serde::{Deserialize, Serialize};

use crate::typemap::{map_type, TypeDescriptor};

/// A named, reusable column type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainDefinition {
    pub name: String,
    pub descriptor: TypeDescriptor,
}

impl DomainDefinition {
    pub fn new(name: impl AsRef<str>, descriptor: TypeDescriptor) -> Self {
        Self {
            name: name.as_ref().trim().to_string(),
            descriptor,
        }
    }

    /// Render `CREATE DOMAIN <name> AS <type>`.
    pub fn to_ddl(&self) -> String {
        format!("CREATE DOMAIN {} AS {}", self.name, map_type(&self.descriptor))
    }
}

/// Column of a table, typed by a domain name.
///
/// The domain is a weak reference and is not checked for existence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    pub name: String,
    pub domain_name: String,
    pub not_null: bool,
}

impl ColumnDefinition {
    pub fn new(name: impl AsRef<str>, domain_name: impl AsRef<str>, not_null: bool) -> Self {
        Self {
            name: name.as_ref().trim().to_string(),
            domain_name: domain_name.as_ref().trim().to_string(),
            not_null,
        }
    }

    fn to_ddl(&self) -> String {
        if self.not_null {
            format!("{} {} NOT NULL", self.name, self.domain_name)
        } else {
            format!("{} {}", self.name, self.domain_name)
        }
    }
}

/// Table metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDefinition {
    pub name: String,

    /// Columns in catalog position order.
    pub columns: Vec<ColumnDefinition>,
}

impl TableDefinition {
    pub fn new(name: impl AsRef<str>, columns: Vec<ColumnDefinition>) -> Self {
        Self {
            name: name.as_ref().trim().to_string(),
            columns,
        }
    }

    /// Render a multi-line `CREATE TABLE` statement, one column per line.
    pub fn to_ddl(&self) -> String {
        let columns: Vec<String> = self
            .columns
            .iter()
            .map(|c| format!("  {}", c.to_ddl()))
            .collect();
        format!("CREATE TABLE {} (\n{}\n)", self.name, columns.join(",\n"))
    }
}

/// Parameter of a stored procedure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamDefinition {
    pub name: String,
    pub domain_name: String,
}

impl ParamDefinition {
    pub fn new(name: impl AsRef<str>, domain_name: impl AsRef<str>) -> Self {
        Self {
            name: name.as_ref().trim().to_string(),
            domain_name: domain_name.as_ref().trim().to_string(),
        }
    }
}

/// Stored procedure metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcedureDefinition {
    pub name: String,
    pub input_params: Vec<ParamDefinition>,
    pub output_params: Vec<ParamDefinition>,

    /// Procedural SQL body, embedded verbatim.
    pub body: String,
}

impl ProcedureDefinition {
    /// Create a procedure definition, normalizing the body to LF line
    /// endings and trimming surrounding whitespace.
    pub fn new(
        name: impl AsRef<str>,
        input_params: Vec<ParamDefinition>,
        output_params: Vec<ParamDefinition>,
        body: &str,
    ) -> Self {
        Self {
            name: name.as_ref().trim().to_string(),
            input_params,
            output_params,
            body: normalize_body(body),
        }
    }

    /// Render `CREATE PROCEDURE` with optional parameter and RETURNS lists.
    pub fn to_ddl(&self) -> String {
        let mut ddl = format!("CREATE PROCEDURE {}\n", self.name);
        if !self.input_params.is_empty() {
            ddl.push_str(&format!("({})\n", param_list(&self.input_params)));
        }
        if !self.output_params.is_empty() {
            ddl.push_str(&format!("RETURNS ({})\n", param_list(&self.output_params)));
        }
        ddl.push_str("AS\n");
        ddl.push_str(&self.body);
        ddl
    }
}

fn param_list(params: &[ParamDefinition]) -> String {
    params
        .iter()
        .map(|p| format!("{} {}", p.name, p.domain_name))
        .collect::<Vec<_>>()
        .join(", ")
}

fn normalize_body(body: &str) -> String {
    body.replace("\r\n", "\n").trim().to_string()
}
