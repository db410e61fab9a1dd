pub mod collections;
pub mod field;
pub mod index;

mod check;

pub use self::field::{BsonType, Field};
pub use self::index::{Direction, IndexSpec};

use crate::{Error, Result};
use mongodb::bson::{Bson, Document, doc};

pub const VALIDATION_LEVEL: &str = "strict";
pub const VALIDATION_ACTION: &str = "error";

/// Cross-field constraint: the date in `later` must be strictly after the date
/// in `earlier`. Rendered as a `$expr` clause next to `$jsonSchema`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldOrder {
    pub earlier: &'static str,
    pub later: &'static str,
}

impl FieldOrder {
    #[must_use]
    pub fn to_expr(&self) -> Document {
        doc! { "$gt": [format!("${}", self.later), format!("${}", self.earlier)] }
    }
}

/// Everything the server needs to know about one collection: its validator
/// and its indexes.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionSpec {
    pub name: &'static str,
    pub schema: Option<Field>,
    pub ordering: Vec<FieldOrder>,
    pub indexes: Vec<IndexSpec>,
}

impl CollectionSpec {
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            schema: None,
            ordering: Vec::new(),
            indexes: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_schema(mut self, schema: Field) -> Self {
        self.schema = Some(schema);
        self
    }

    #[must_use]
    pub fn with_ordering(mut self, earlier: &'static str, later: &'static str) -> Self {
        self.ordering.push(FieldOrder { earlier, later });
        self
    }

    #[must_use]
    pub fn with_index(mut self, index: IndexSpec) -> Self {
        self.indexes.push(index);
        self
    }

    /// TTL indexes of this collection.
    pub fn ttl_indexes(&self) -> impl Iterator<Item = &IndexSpec> {
        self.indexes.iter().filter(|index| index.ttl().is_some())
    }

    /// Validator document: `$jsonSchema` plus a `$expr` for field ordering.
    #[must_use]
    pub fn validator(&self) -> Option<Document> {
        let schema = self.schema.as_ref()?;

        let mut validator = doc! { "$jsonSchema": schema.to_document() };

        match self.ordering.as_slice() {
            [] => {}
            [order] => {
                validator.insert("$expr", order.to_expr());
            }
            orders => {
                let clauses: Vec<Bson> = orders
                    .iter()
                    .map(|order| Bson::Document(order.to_expr()))
                    .collect();
                validator.insert("$expr", doc! { "$and": clauses });
            }
        }

        Some(validator)
    }

    /// `create` command for a collection that does not exist yet.
    #[must_use]
    pub fn create_command(&self) -> Document {
        let mut command = doc! { "create": self.name };
        if let Some(validator) = self.validator() {
            command.insert("validator", validator);
            command.insert("validationLevel", VALIDATION_LEVEL);
            command.insert("validationAction", VALIDATION_ACTION);
        }
        command
    }

    /// `collMod` command replacing the validator of an existing collection.
    #[must_use]
    pub fn modify_command(&self) -> Option<Document> {
        self.validator().map(|validator| {
            doc! {
                "collMod": self.name,
                "validator": validator,
                "validationLevel": VALIDATION_LEVEL,
                "validationAction": VALIDATION_ACTION,
            }
        })
    }

    #[must_use]
    pub fn create_indexes_command(&self) -> Option<Document> {
        self.missing_indexes_command(&[])
    }

    /// `createIndexes` for the indexes not already in `existing` (the
    /// `listIndexes` entries), or `None` when nothing is missing.
    ///
    /// An index with the same keys and options under another name counts as
    /// present: the server rejects a second one with `IndexOptionsConflict`.
    #[must_use]
    pub fn missing_indexes_command(&self, existing: &[Document]) -> Option<Document> {
        let indexes: Vec<Bson> = self
            .indexes
            .iter()
            .filter(|index| !existing.iter().any(|found| index.matches(found)))
            .map(|index| Bson::Document(index.to_document()))
            .collect();

        if indexes.is_empty() {
            return None;
        }

        Some(doc! { "createIndexes": self.name, "indexes": indexes })
    }

    /// Every rule `doc` breaks, in schema order.
    #[must_use]
    pub fn violations(&self, doc: &Document) -> Vec<String> {
        let mut out = Vec::new();

        if let Some(schema) = &self.schema {
            check::check_object(schema, doc, "", &mut out);
        }

        for order in &self.ordering {
            check::check_order(order, doc, &mut out);
        }

        out
    }

    /// Check `doc` against this collection's validator without a server.
    ///
    /// # Errors
    /// Returns [`Error::SchemaViolation`] listing every broken rule.
    pub fn check(&self, doc: &Document) -> Result<()> {
        let violations = self.violations(doc);

        if violations.is_empty() {
            Ok(())
        } else {
            Err(Error::SchemaViolation {
                collection: self.name.to_string(),
                violations,
            })
        }
    }
}
