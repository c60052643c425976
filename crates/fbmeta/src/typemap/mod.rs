//! Type mapping from Firebird field descriptors to SQL type declarations.

use serde::{Deserialize, Serialize};

/// Type name emitted for field type codes outside the supported set.
pub const UNKNOWN_TYPE: &str = "UNKNOWN";

/// Low-level type metadata of a domain, as stored in `RDB$FIELDS`.
///
/// Nullable catalog columns are read as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    pub type_code: i32,
    pub character_length: i32,
    pub scale: i32,
    pub sub_type: i32,
    pub precision: i32,
}

impl TypeDescriptor {
    pub fn new(type_code: i32) -> Self {
        Self {
            type_code,
            ..Self::default()
        }
    }

    pub fn with_length(mut self, character_length: i32) -> Self {
        self.character_length = character_length;
        self
    }

    pub fn with_numeric(mut self, sub_type: i32, precision: i32, scale: i32) -> Self {
        self.sub_type = sub_type;
        self.precision = precision;
        self.scale = scale;
        self
    }

    /// Build a descriptor from raw catalog columns.
    pub fn from_catalog(
        type_code: i32,
        character_length: Option<i32>,
        scale: Option<i32>,
        sub_type: Option<i32>,
        precision: Option<i32>,
    ) -> Self {
        Self {
            type_code,
            character_length: character_length.unwrap_or(0),
            scale: scale.unwrap_or(0),
            sub_type: sub_type.unwrap_or(0),
            precision: precision.unwrap_or(0),
        }
    }

    /// The known field type for this descriptor, if any.
    pub fn field_type(&self) -> Option<FieldType> {
        FieldType::from_code(self.type_code)
    }
}

/// Closed set of `RDB$FIELD_TYPE` codes the mapper understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    SmallInt,
    Integer,
    Float,
    Date,
    Time,
    Char,
    /// 64-bit integer storage: BIGINT, NUMERIC and DECIMAL.
    Int64,
    Double,
    Timestamp,
    Varchar,
    Blob,
}

impl FieldType {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            7 => Some(FieldType::SmallInt),
            8 => Some(FieldType::Integer),
            10 => Some(FieldType::Float),
            12 => Some(FieldType::Date),
            13 => Some(FieldType::Time),
            14 => Some(FieldType::Char),
            16 => Some(FieldType::Int64),
            27 => Some(FieldType::Double),
            35 => Some(FieldType::Timestamp),
            37 => Some(FieldType::Varchar),
            261 => Some(FieldType::Blob),
            _ => None,
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            FieldType::SmallInt => 7,
            FieldType::Integer => 8,
            FieldType::Float => 10,
            FieldType::Date => 12,
            FieldType::Time => 13,
            FieldType::Char => 14,
            FieldType::Int64 => 16,
            FieldType::Double => 27,
            FieldType::Timestamp => 35,
            FieldType::Varchar => 37,
            FieldType::Blob => 261,
        }
    }
}

/// Map a field descriptor to its SQL type declaration.
///
/// Total: unknown codes (and unknown INT64 sub-types) yield [`UNKNOWN_TYPE`].
pub fn map_type(desc: &TypeDescriptor) -> String {
    let Some(field_type) = desc.field_type() else {
        return UNKNOWN_TYPE.to_string();
    };

    let scale = desc.scale.unsigned_abs();
    match field_type {
        FieldType::SmallInt => "SMALLINT".to_string(),
        FieldType::Integer => "INTEGER".to_string(),
        FieldType::Float => "FLOAT".to_string(),
        FieldType::Date => "DATE".to_string(),
        FieldType::Time => "TIME".to_string(),
        FieldType::Char => format!("CHAR({})", desc.character_length),
        FieldType::Int64 => match desc.sub_type {
            0 if desc.scale < 0 => "BIGINT".to_string(),
            0 | 1 => format!("NUMERIC({},{})", desc.precision, scale),
            2 => {
                let precision = if desc.precision > 0 {
                    desc.precision as i64
                } else {
                    scale as i64 + 1
                };
                format!("DECIMAL({},{})", precision, scale)
            }
            _ => UNKNOWN_TYPE.to_string(),
        },
        FieldType::Double => "DOUBLE PRECISION".to_string(),
        FieldType::Timestamp => "TIMESTAMP".to_string(),
        FieldType::Varchar => format!("VARCHAR({})", desc.character_length),
        FieldType::Blob => "BLOB SUB_TYPE 0".to_string(),
    }
}
