use rowforge_core::{ColumnDescriptor, SemanticType};

use super::queries::RawColumn;
use super::sql::TableRef;
use crate::options::PostgresOptions;

const DEFAULT_DECIMAL_PRECISION: u32 = 18;
const DEFAULT_DECIMAL_SCALE: u32 = 2;

pub fn map_columns(raw: Vec<RawColumn>, options: &PostgresOptions) -> Vec<ColumnDescriptor> {
    raw.into_iter()
        .map(|column| map_column(column, options))
        .collect()
}

fn map_column(raw: RawColumn, options: &PostgresOptions) -> ColumnDescriptor {
    let semantic_type = semantic_type(&raw.type_name);
    let mut column = ColumnDescriptor::new(raw.name, semantic_type);

    match semantic_type {
        SemanticType::Integer => {
            let precision = if raw.type_name == "int2" { 5 } else { 10 };
            column = column.with_precision(precision, 0);
        }
        SemanticType::Long => column = column.with_precision(19, 0),
        SemanticType::Decimal => {
            let precision = positive(raw.numeric_precision).unwrap_or(DEFAULT_DECIMAL_PRECISION);
            let scale = raw
                .numeric_scale
                .and_then(|scale| u32::try_from(scale).ok())
                .unwrap_or(DEFAULT_DECIMAL_SCALE.min(precision));
            column = column.with_precision(precision, scale);
        }
        SemanticType::Float => {
            let (precision, scale) = if raw.type_name == "float4" { (6, 2) } else { (15, 4) };
            column = column.with_precision(precision, scale);
        }
        SemanticType::Text => {
            let length = positive(raw.character_max_length)
                .map_or(options.text_length_cap, |length| length.min(options.text_length_cap));
            column = column.with_max_length(length);
        }
        _ => {}
    }

    if raw.is_nullable {
        column = column.nullable();
    }
    if raw.is_identity {
        column = column.identity();
    }
    if raw.is_unique {
        column = column.unique();
    }
    if let (Some(schema), Some(table), Some(referenced)) = (
        raw.referenced_schema,
        raw.referenced_table,
        raw.referenced_column,
    ) {
        let target = TableRef { schema, name: table };
        column = column.references(target.canonical(&options.default_schema), referenced);
    }
    column
}

fn positive(value: Option<i32>) -> Option<u32> {
    value
        .and_then(|value| u32::try_from(value).ok())
        .filter(|value| *value > 0)
}

/// Semantic type for a Postgres `typname`.
pub fn semantic_type(type_name: &str) -> SemanticType {
    match type_name {
        "int2" | "int4" => SemanticType::Integer,
        "int8" => SemanticType::Long,
        "numeric" => SemanticType::Decimal,
        "float4" | "float8" => SemanticType::Float,
        "bool" => SemanticType::Boolean,
        "uuid" => SemanticType::Uuid,
        "date" => SemanticType::Date,
        "timestamp" | "timestamptz" => SemanticType::DateTime,
        "varchar" | "bpchar" | "text" | "name" | "citext" => SemanticType::Text,
        _ => SemanticType::Unsupported,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(name: &str, type_name: &str) -> RawColumn {
        RawColumn {
            name: name.to_string(),
            type_name: type_name.to_string(),
            is_nullable: false,
            is_identity: false,
            character_max_length: None,
            numeric_precision: None,
            numeric_scale: None,
            is_unique: false,
            referenced_schema: None,
            referenced_table: None,
            referenced_column: None,
        }
    }

    #[test]
    fn integer_widths_follow_storage_size() {
        let options = PostgresOptions::default();
        let small = map_column(raw("a", "int2"), &options);
        let regular = map_column(raw("b", "int4"), &options);
        let big = map_column(raw("c", "int8"), &options);

        assert_eq!((small.semantic_type, small.precision), (SemanticType::Integer, 5));
        assert_eq!((regular.semantic_type, regular.precision), (SemanticType::Integer, 10));
        assert_eq!((big.semantic_type, big.precision), (SemanticType::Long, 19));
    }

    #[test]
    fn numeric_keeps_declared_precision_or_defaults() {
        let options = PostgresOptions::default();
        let mut declared = raw("total", "numeric");
        declared.numeric_precision = Some(10);
        declared.numeric_scale = Some(3);

        let declared = map_column(declared, &options);
        let open = map_column(raw("amount", "numeric"), &options);

        assert_eq!((declared.precision, declared.scale), (10, 3));
        assert_eq!((open.precision, open.scale), (18, 2));
    }

    #[test]
    fn text_length_is_capped() {
        let options = PostgresOptions {
            text_length_cap: 64,
            ..PostgresOptions::default()
        };
        let mut short = raw("code", "bpchar");
        short.character_max_length = Some(3);
        let mut long = raw("title", "varchar");
        long.character_max_length = Some(4000);

        assert_eq!(map_column(short, &options).max_length, 3);
        assert_eq!(map_column(long, &options).max_length, 64);
        assert_eq!(map_column(raw("body", "text"), &options).max_length, 64);
    }

    #[test]
    fn unknown_types_are_unsupported() {
        let options = PostgresOptions::default();
        assert_eq!(
            map_column(raw("doc", "jsonb"), &options).semantic_type,
            SemanticType::Unsupported
        );
        assert_eq!(semantic_type("timestamptz"), SemanticType::DateTime);
    }

    #[test]
    fn foreign_keys_drop_the_default_schema() {
        let options = PostgresOptions::default();
        let mut local = raw("customer_id", "int4");
        local.referenced_schema = Some("public".to_string());
        local.referenced_table = Some("customers".to_string());
        local.referenced_column = Some("id".to_string());
        let mut remote = raw("region_id", "int4");
        remote.referenced_schema = Some("geo".to_string());
        remote.referenced_table = Some("regions".to_string());
        remote.referenced_column = Some("id".to_string());

        let local = map_column(local, &options);
        let remote = map_column(remote, &options);

        assert_eq!(local.foreign_key.map(|fk| fk.table), Some("customers".to_string()));
        assert_eq!(remote.foreign_key.map(|fk| fk.table), Some("geo.regions".to_string()));
    }

    #[test]
    fn flags_are_carried_over() {
        let options = PostgresOptions::default();
        let mut column = raw("id", "int8");
        column.is_identity = true;
        column.is_unique = true;
        let mut note = raw("note", "text");
        note.is_nullable = true;

        let column = map_column(column, &options);
        assert!(column.is_identity && column.is_unique && !column.is_nullable);
        assert!(map_column(note, &options).is_nullable);
    }
}
