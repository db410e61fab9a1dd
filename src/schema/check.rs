//! Offline mirror of the server-side `$jsonSchema` evaluation.
//!
//! Only the keywords used by the auth collections are supported: `bsonType`,
//! `required`, `properties`, `pattern`, `minimum`, `enum` and `items`.
//! Unknown fields are accepted, as the server does without
//! `additionalProperties: false`.

use super::{FieldOrder, field::Field};
use mongodb::bson::{Bson, Document};
use regex::Regex;

pub(crate) fn check_object(field: &Field, doc: &Document, prefix: &str, out: &mut Vec<String>) {
    for name in &field.required {
        if !doc.contains_key(name) {
            out.push(format!("{}: required field is missing", join(prefix, name)));
        }
    }

    for (name, property) in &field.properties {
        if let Some(value) = doc.get(name) {
            check_value(property, value, &join(prefix, name), out);
        }
    }
}

fn check_value(field: &Field, value: &Bson, path: &str, out: &mut Vec<String>) {
    if let Some(bson_type) = field.bson_type
        && !bson_type.matches(value)
    {
        out.push(format!(
            "{path}: expected {bson_type}, found {}",
            type_name(value)
        ));
        return;
    }

    if !field.allowed.is_empty() {
        let allowed = matches!(value, Bson::String(s) if field.allowed.iter().any(|a| *a == s.as_str()));
        if !allowed {
            out.push(format!(
                "{path}: value is not one of [{}]",
                field.allowed.join(", ")
            ));
        }
    }

    if let (Some(pattern), Bson::String(text)) = (field.pattern, value) {
        match Regex::new(pattern) {
            Ok(re) if re.is_match(text) => {}
            Ok(_) => out.push(format!("{path}: does not match pattern {pattern}")),
            Err(e) => out.push(format!("{path}: invalid pattern {pattern}: {e}")),
        }
    }

    if let (Some(minimum), Some(number)) = (field.minimum, as_number(value))
        && number < f64::from(minimum)
    {
        out.push(format!("{path}: must be greater than or equal to {minimum}"));
    }

    match value {
        Bson::Document(inner) => check_object(field, inner, path, out),
        Bson::Array(items) => {
            if let Some(item_field) = &field.items {
                for (index, item) in items.iter().enumerate() {
                    check_value(item_field, item, &format!("{path}.{index}"), out);
                }
            }
        }
        _ => {}
    }
}

/// `later` must be strictly after `earlier` when both are dates. Missing or
/// mistyped fields are reported by the schema pass instead.
pub(crate) fn check_order(order: &FieldOrder, doc: &Document, out: &mut Vec<String>) {
    if let (Some(Bson::DateTime(earlier)), Some(Bson::DateTime(later))) =
        (doc.get(order.earlier), doc.get(order.later))
        && later.timestamp_millis() <= earlier.timestamp_millis()
    {
        out.push(format!(
            "{}: must be later than {}",
            order.later, order.earlier
        ));
    }
}

#[allow(clippy::cast_precision_loss)]
fn as_number(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(n) => Some(f64::from(*n)),
        Bson::Int64(n) => Some(*n as f64),
        Bson::Double(n) => Some(*n),
        _ => None,
    }
}

fn type_name(value: &Bson) -> &'static str {
    match value {
        Bson::String(_) => "string",
        Bson::Boolean(_) => "bool",
        Bson::DateTime(_) => "date",
        Bson::Int32(_) => "int",
        Bson::Int64(_) => "long",
        Bson::Double(_) => "double",
        Bson::Decimal128(_) => "decimal",
        Bson::Document(_) => "object",
        Bson::Array(_) => "array",
        Bson::Null => "null",
        Bson::ObjectId(_) => "objectId",
        Bson::Timestamp(_) => "timestamp",
        _ => "other",
    }
}

fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}
