use std::fmt;

use serde::{Deserialize, Serialize};

/// Semantic type of a column, independent of the database product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticType {
    Text,
    Integer,
    Decimal,
    Float,
    Long,
    Boolean,
    Uuid,
    Date,
    DateTime,
    Unsupported,
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SemanticType::Text => "text",
            SemanticType::Integer => "integer",
            SemanticType::Decimal => "decimal",
            SemanticType::Float => "float",
            SemanticType::Long => "long",
            SemanticType::Boolean => "boolean",
            SemanticType::Uuid => "uuid",
            SemanticType::Date => "date",
            SemanticType::DateTime => "datetime",
            SemanticType::Unsupported => "unsupported",
        };
        f.write_str(name)
    }
}

/// Target of a foreign key column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyRef {
    pub table: String,
    pub column: String,
}

/// Column metadata produced by backend introspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    pub semantic_type: SemanticType,
    /// Total digits for numeric types.
    pub precision: u32,
    /// Fractional digits for numeric types.
    pub scale: u32,
    /// Maximum character length for text types.
    pub max_length: u32,
    pub is_nullable: bool,
    /// Value is assigned by the backend on insert.
    pub is_identity: bool,
    pub foreign_key: Option<ForeignKeyRef>,
    /// Participates in a primary key or unique constraint.
    pub is_unique: bool,
}

/// How the generator treats a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Treatment<'a> {
    /// Nullable or unsupported: never generated.
    Skipped,
    /// Backend assigns the value.
    Identity,
    ForeignKey(&'a ForeignKeyRef),
    /// Synthesized from the column type.
    Plain,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, semantic_type: SemanticType) -> Self {
        Self {
            name: name.into(),
            semantic_type,
            precision: 0,
            scale: 0,
            max_length: 0,
            is_nullable: false,
            is_identity: false,
            foreign_key: None,
            is_unique: false,
        }
    }

    pub fn with_precision(mut self, precision: u32, scale: u32) -> Self {
        self.precision = precision;
        self.scale = scale;
        self
    }

    pub fn with_max_length(mut self, max_length: u32) -> Self {
        self.max_length = max_length;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.is_nullable = true;
        self
    }

    pub fn identity(mut self) -> Self {
        self.is_identity = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.is_unique = true;
        self
    }

    pub fn references(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.foreign_key = Some(ForeignKeyRef {
            table: table.into(),
            column: column.into(),
        });
        self
    }

    pub fn is_foreign_key(&self) -> bool {
        self.foreign_key.is_some()
    }

    pub fn treatment(&self) -> Treatment<'_> {
        if self.is_nullable || self.semantic_type == SemanticType::Unsupported {
            return Treatment::Skipped;
        }
        if self.is_identity {
            return Treatment::Identity;
        }
        match &self.foreign_key {
            Some(fk) => Treatment::ForeignKey(fk),
            None => Treatment::Plain,
        }
    }
}
