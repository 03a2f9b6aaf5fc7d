//! Random values for a single column, dispatched on its semantic type.

use chrono::{NaiveDateTime, Utc};
use rand::Rng;

use rowforge_core::{ColumnDescriptor, Error, Result, SemanticType, Value};

use crate::any;

/// Generate a value for `column` using the current time as the date window's end.
pub fn synthesize<R: Rng + ?Sized>(column: &ColumnDescriptor, rng: &mut R) -> Result<Value> {
    synthesize_at(column, Utc::now().naive_utc(), rng)
}

/// Generate a value for `column`, with dates drawn from the months before `now`.
pub fn synthesize_at<R: Rng + ?Sized>(
    column: &ColumnDescriptor,
    now: NaiveDateTime,
    rng: &mut R,
) -> Result<Value> {
    generate(column, now, rng).map_err(|reason| Error::ValueSynthesisFailed {
        column: column.name.clone(),
        column_type: column.semantic_type.to_string(),
        reason,
    })
}

fn generate<R: Rng + ?Sized>(
    column: &ColumnDescriptor,
    now: NaiveDateTime,
    rng: &mut R,
) -> std::result::Result<Value, String> {
    let value = match column.semantic_type {
        SemanticType::Text => {
            if column.max_length == 0 {
                return Err("max length must be positive".to_string());
            }
            Value::Text(any::string(column.max_length as usize, rng))
        }
        SemanticType::Integer => {
            let bound = integer_bound(column.precision)?;
            match i32::try_from(bound) {
                Ok(bound) => Value::Int(any::int(1, bound, rng).map_err(|err| err.to_string())?),
                Err(_) => Value::Long(any::long(1, bound, rng).map_err(|err| err.to_string())?),
            }
        }
        SemanticType::Long => {
            let bound = integer_bound(column.precision)?;
            Value::Long(any::long(1, bound, rng).map_err(|err| err.to_string())?)
        }
        SemanticType::Decimal => Value::Decimal(
            any::decimal(column.precision, column.scale, rng).map_err(|err| err.to_string())?,
        ),
        SemanticType::Float => Value::Float(
            any::double(column.precision, column.scale, rng).map_err(|err| err.to_string())?,
        ),
        SemanticType::Boolean => Value::Bool(any::boolean(rng)),
        SemanticType::Uuid => Value::Uuid(any::uuid(rng)),
        SemanticType::Date => Value::Date(any::date(now.date(), rng)),
        SemanticType::DateTime => Value::DateTime(any::date_time(now, rng)),
        SemanticType::Unsupported => return Err("unsupported column type".to_string()),
    };
    Ok(value)
}

/// Exclusive upper bound `10^(precision - 1)`, saturating at `i64::MAX` and never below 2.
fn integer_bound(precision: u32) -> std::result::Result<i64, String> {
    if precision == 0 {
        return Err("precision must be positive".to_string());
    }
    let bound = 10i64.checked_pow(precision - 1).unwrap_or(i64::MAX);
    Ok(bound.max(2))
}
