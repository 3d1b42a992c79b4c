//! Record <-> property bag conversion.
//!
//! Records travel through `serde_json::Value`: a record is serialized, each
//! mapped member is encoded to the declared [`DataKind`], and the reverse
//! direction overlays the bag's columns on the serialized `T::default()`.

use chrono::{DateTime, Utc};
use serde_json::{Map, Number, Value};
use tableset_model::{DataKind, EntityValue, PropertyBag};
use uuid::Uuid;

use super::cache::{TableEntity, schema_for};
use super::mapping::{ColumnMapping, ReservedRole};
use crate::error::{Result, TableError};

/// Serialize `record` into a property bag.
///
/// Ignored members and absent optional members are skipped.
///
/// # Errors
///
/// `Unsupported` when a serialized member is not declared in the mapping,
/// its value has no encoding as the declared kind, or a member that is never
/// `null` by default serializes to `null` (non-finite doubles do).
pub fn to_bag<T: TableEntity>(record: &T) -> Result<PropertyBag> {
    let schema = schema_for::<T>()?;
    let members = serialize_members(&schema, record)?;
    let mut defaults: Option<Map<String, Value>> = None;

    let mut bag = PropertyBag::with_capacity(members.len());
    for (name, json) in members {
        let Some(field) = schema.field(&name) else {
            return Err(TableError::unsupported(format!(
                "member `{name}` of {} has no storage mapping",
                schema.type_name()
            )));
        };
        if field.ignored {
            continue;
        }
        if json.is_null() {
            if defaults.is_none() {
                defaults = Some(serialize_members(&schema, &T::default())?);
            }
            let optional = defaults
                .as_ref()
                .and_then(|d| d.get(&name))
                .is_none_or(Value::is_null);
            if optional {
                continue;
            }
            return Err(TableError::unsupported(format!(
                "member `{name}` of {} has no storage encoding for its value",
                schema.type_name()
            )));
        }
        let Some(kind) = field.data_kind else {
            continue;
        };
        let value = encode(kind, &json).ok_or_else(|| {
            TableError::unsupported(format!(
                "member `{name}` of {} cannot be stored as {kind}",
                schema.type_name()
            ))
        })?;
        bag.insert(field.column_name.clone(), value);
    }
    Ok(bag)
}

/// Deserialize a property bag into a record.
///
/// Columns absent from the bag leave their field at `T::default()`; columns
/// the mapping does not know are ignored.
///
/// # Errors
///
/// `MappingIntegrity` when the partition or row key column is missing or a
/// column value does not fit its field.
pub fn to_record<T: TableEntity>(bag: &PropertyBag) -> Result<T> {
    let schema = schema_for::<T>()?;
    for role in [ReservedRole::PartitionKey, ReservedRole::RowKey] {
        if !bag.contains_key(role.column_name()) {
            return Err(TableError::mapping_integrity(
                schema.type_name(),
                format!("row has no {role} column"),
            ));
        }
    }

    let mut members = serialize_members(&schema, &T::default())?;
    for field in schema.stored_fields() {
        if let Some(value) = bag.get(&field.column_name) {
            let json = decode_column(&schema, &field.column_name, value)?;
            members.insert(field.field_name.clone(), json);
        }
    }

    serde_json::from_value(Value::Object(members))
        .map_err(|e| TableError::mapping_integrity(schema.type_name(), e.to_string()))
}

/// Overlay the mapped columns present in `bag` onto `record`.
///
/// Used after a write so server-assigned columns (timestamp, concurrency
/// token) reach the caller while ignored members keep their values.
///
/// # Errors
///
/// `MappingIntegrity` when a column value does not fit its field.
pub fn overlay<T: TableEntity>(record: &T, bag: &PropertyBag) -> Result<T> {
    let schema = schema_for::<T>()?;
    let mut members = serialize_members(&schema, record)?;
    for field in schema.stored_fields() {
        if let Some(value) = bag.get(&field.column_name) {
            let json = decode_column(&schema, &field.column_name, value)?;
            members.insert(field.field_name.clone(), json);
        }
    }
    serde_json::from_value(Value::Object(members))
        .map_err(|e| TableError::mapping_integrity(schema.type_name(), e.to_string()))
}

fn serialize_members<T: TableEntity>(schema: &ColumnMapping, record: &T) -> Result<Map<String, Value>> {
    match serde_json::to_value(record) {
        Ok(Value::Object(members)) => Ok(members),
        Ok(other) => Err(TableError::mapping_integrity(
            schema.type_name(),
            format!("record serializes to {other}, not a struct"),
        )),
        Err(e) => Err(TableError::mapping_integrity(schema.type_name(), e.to_string())),
    }
}

fn encode(kind: DataKind, json: &Value) -> Option<EntityValue> {
    match kind {
        DataKind::String => json.as_str().map(EntityValue::from),
        DataKind::Int32 => json
            .as_i64()
            .and_then(|n| i32::try_from(n).ok())
            .map(EntityValue::Int32),
        DataKind::Int64 => json.as_i64().map(EntityValue::Int64),
        DataKind::Double => json.as_f64().map(EntityValue::Double),
        DataKind::Boolean => json.as_bool().map(EntityValue::Boolean),
        DataKind::Binary => {
            let bytes = json
                .as_array()?
                .iter()
                .map(|b| b.as_u64().and_then(|b| u8::try_from(b).ok()))
                .collect::<Option<Vec<u8>>>()?;
            Some(EntityValue::from(bytes))
        }
        DataKind::DateTime => DateTime::parse_from_rfc3339(json.as_str()?)
            .ok()
            .map(|dt| EntityValue::DateTime(dt.with_timezone(&Utc))),
        DataKind::Guid => Uuid::parse_str(json.as_str()?).ok().map(EntityValue::Guid),
    }
}

fn decode_column(schema: &ColumnMapping, column: &str, value: &EntityValue) -> Result<Value> {
    decode(value).ok_or_else(|| {
        TableError::mapping_integrity(
            schema.type_name(),
            format!("column `{column}` holds a non-finite number"),
        )
    })
}

fn decode(value: &EntityValue) -> Option<Value> {
    Some(match value {
        EntityValue::String(s) => Value::String(s.clone()),
        EntityValue::Int32(n) => Value::from(*n),
        EntityValue::Int64(n) => Value::from(*n),
        EntityValue::Double(f) => Value::Number(Number::from_f64(*f)?),
        EntityValue::Boolean(b) => Value::Bool(*b),
        EntityValue::Binary(bytes) => Value::Array(bytes.iter().map(|b| Value::from(*b)).collect()),
        EntityValue::DateTime(dt) => Value::String(dt.to_rfc3339()),
        EntityValue::Guid(id) => Value::String(id.to_string()),
    })
}
