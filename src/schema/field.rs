use mongodb::bson::{Bson, Document};
use std::fmt;

/// BSON types understood by the `$jsonSchema` `bsonType` keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BsonType {
    String,
    Bool,
    Date,
    Int,
    Double,
    Object,
    Array,
}

impl BsonType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Bool => "bool",
            Self::Date => "date",
            Self::Int => "int",
            Self::Double => "double",
            Self::Object => "object",
            Self::Array => "array",
        }
    }

    /// Whether `value` satisfies this `bsonType`. `int` only accepts 32-bit
    /// integers and `double` only accepts doubles, as on the server.
    #[must_use]
    pub const fn matches(self, value: &Bson) -> bool {
        matches!(
            (self, value),
            (Self::String, Bson::String(_))
                | (Self::Bool, Bson::Boolean(_))
                | (Self::Date, Bson::DateTime(_))
                | (Self::Int, Bson::Int32(_))
                | (Self::Double, Bson::Double(_))
                | (Self::Object, Bson::Document(_))
                | (Self::Array, Bson::Array(_))
        )
    }
}

impl fmt::Display for BsonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One node of a `$jsonSchema` validator.
///
/// A `Field` is either a leaf constraint (type, pattern, minimum, enum) or an
/// object/array with nested fields. The collection-level schema is itself an
/// object `Field`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Field {
    pub(crate) bson_type: Option<BsonType>,
    pub(crate) description: Option<&'static str>,
    pub(crate) pattern: Option<&'static str>,
    pub(crate) minimum: Option<i32>,
    pub(crate) allowed: Vec<&'static str>,
    pub(crate) required: Vec<&'static str>,
    pub(crate) properties: Vec<(&'static str, Field)>,
    pub(crate) items: Option<Box<Field>>,
}

impl Field {
    #[must_use]
    pub fn of(bson_type: BsonType) -> Self {
        Self {
            bson_type: Some(bson_type),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn string() -> Self {
        Self::of(BsonType::String)
    }

    #[must_use]
    pub fn bool() -> Self {
        Self::of(BsonType::Bool)
    }

    #[must_use]
    pub fn date() -> Self {
        Self::of(BsonType::Date)
    }

    #[must_use]
    pub fn int() -> Self {
        Self::of(BsonType::Int)
    }

    #[must_use]
    pub fn double() -> Self {
        Self::of(BsonType::Double)
    }

    #[must_use]
    pub fn object() -> Self {
        Self::of(BsonType::Object)
    }

    #[must_use]
    pub fn array(items: Self) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::of(BsonType::Array)
        }
    }

    /// Enumeration without a `bsonType`, matching any of `values`.
    #[must_use]
    pub fn one_of(values: &[&'static str]) -> Self {
        Self {
            allowed: values.to_vec(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn describe(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }

    #[must_use]
    pub fn pattern(mut self, pattern: &'static str) -> Self {
        self.pattern = Some(pattern);
        self
    }

    #[must_use]
    pub fn minimum(mut self, minimum: i32) -> Self {
        self.minimum = Some(minimum);
        self
    }

    /// Add an optional nested field.
    #[must_use]
    pub fn field(mut self, name: &'static str, field: Self) -> Self {
        self.properties.push((name, field));
        self
    }

    /// Add a nested field and list it under `required`.
    #[must_use]
    pub fn required_field(mut self, name: &'static str, field: Self) -> Self {
        self.required.push(name);
        self.field(name, field)
    }

    #[must_use]
    pub const fn bson_type(&self) -> Option<BsonType> {
        self.bson_type
    }

    #[must_use]
    pub fn allowed(&self) -> &[&'static str] {
        &self.allowed
    }

    #[must_use]
    pub fn required(&self) -> &[&'static str] {
        &self.required
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Self> {
        self.properties
            .iter()
            .find(|(property, _)| *property == name)
            .map(|(_, field)| field)
    }

    /// Render this node as a `$jsonSchema` document.
    #[must_use]
    pub fn to_document(&self) -> Document {
        let mut doc = Document::new();

        if let Some(bson_type) = self.bson_type {
            doc.insert("bsonType", bson_type.as_str());
        }

        if !self.required.is_empty() {
            doc.insert("required", self.required.clone());
        }

        if !self.allowed.is_empty() {
            doc.insert("enum", self.allowed.clone());
        }

        if let Some(pattern) = self.pattern {
            doc.insert("pattern", pattern);
        }

        if let Some(minimum) = self.minimum {
            doc.insert("minimum", minimum);
        }

        if !self.properties.is_empty() {
            let mut properties = Document::new();
            for (name, field) in &self.properties {
                properties.insert(*name, field.to_document());
            }
            doc.insert("properties", properties);
        }

        if let Some(items) = &self.items {
            doc.insert("items", items.to_document());
        }

        if let Some(description) = self.description {
            doc.insert("description", description);
        }

        doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{DateTime, doc};

    #[test]
    fn int_and_double_are_distinct() {
        assert!(BsonType::Int.matches(&Bson::Int32(3)));
        assert!(!BsonType::Int.matches(&Bson::Int64(3)));
        assert!(!BsonType::Int.matches(&Bson::Double(3.0)));
        assert!(BsonType::Double.matches(&Bson::Double(3.0)));
        assert!(BsonType::Date.matches(&Bson::DateTime(DateTime::now())));
        assert!(!BsonType::Date.matches(&Bson::String("2024-01-01".to_string())));
    }

    #[test]
    fn renders_nested_schema() {
        let field = Field::object()
            .required_field("code", Field::string())
            .required_field("used", Field::bool())
            .field("usedAt", Field::date());

        assert_eq!(
            field.to_document(),
            doc! {
                "bsonType": "object",
                "required": ["code", "used"],
                "properties": {
                    "code": { "bsonType": "string" },
                    "used": { "bsonType": "bool" },
                    "usedAt": { "bsonType": "date" },
                },
            }
        );
    }

    #[test]
    fn renders_enum_without_bson_type() {
        let field = Field::one_of(&["TOTP", "EMAIL"]).describe("2FA method");
        assert_eq!(
            field.to_document(),
            doc! { "enum": ["TOTP", "EMAIL"], "description": "2FA method" }
        );
        assert_eq!(field.bson_type(), None);
    }

    #[test]
    fn renders_bounded_int_and_array_items() {
        let field = Field::array(Field::int().minimum(0));
        assert_eq!(
            field.to_document(),
            doc! {
                "bsonType": "array",
                "items": { "bsonType": "int", "minimum": 0 },
            }
        );
    }

    #[test]
    fn get_finds_declared_properties() {
        let field = Field::object().field("otp", Field::string().pattern("^[0-9]{6}$"));
        assert!(field.get("otp").is_some());
        assert!(field.get("token").is_none());
    }
}
