use mongodb::bson::{Bson, Document, doc};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    #[must_use]
    pub const fn value(self) -> i32 {
        match self {
            Self::Ascending => 1,
            Self::Descending => -1,
        }
    }
}

/// Index definition rendered into a `createIndexes` entry.
///
/// Names follow the server convention (`userId_1_sessionId_1`) unless set
/// with [`IndexSpec::named`], so running `createIndexes` again with the same
/// definition is a no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSpec {
    keys: Vec<(&'static str, Direction)>,
    name: Option<&'static str>,
    unique: bool,
    expire_after: Option<Duration>,
}

impl IndexSpec {
    #[must_use]
    pub fn ascending(field: &'static str) -> Self {
        Self::compound(&[(field, Direction::Ascending)])
    }

    #[must_use]
    pub fn descending(field: &'static str) -> Self {
        Self::compound(&[(field, Direction::Descending)])
    }

    #[must_use]
    pub fn compound(keys: &[(&'static str, Direction)]) -> Self {
        Self {
            keys: keys.to_vec(),
            name: None,
            unique: false,
            expire_after: None,
        }
    }

    #[must_use]
    pub fn named(mut self, name: &'static str) -> Self {
        self.name = Some(name);
        self
    }

    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Make this a TTL index: documents are removed `after` the date stored
    /// in the (single) indexed field.
    #[must_use]
    pub fn expire_after(mut self, after: Duration) -> Self {
        self.expire_after = Some(after);
        self
    }

    #[must_use]
    pub const fn is_unique(&self) -> bool {
        self.unique
    }

    #[must_use]
    pub const fn ttl(&self) -> Option<Duration> {
        self.expire_after
    }

    #[must_use]
    pub fn fields(&self) -> Vec<&'static str> {
        self.keys.iter().map(|(field, _)| *field).collect()
    }

    #[must_use]
    pub fn name(&self) -> String {
        if let Some(name) = self.name {
            return name.to_string();
        }

        self.keys
            .iter()
            .map(|(field, direction)| format!("{field}_{}", direction.value()))
            .collect::<Vec<_>>()
            .join("_")
    }

    #[must_use]
    pub fn keys(&self) -> Document {
        let mut keys = Document::new();
        for (field, direction) in &self.keys {
            keys.insert(*field, direction.value());
        }
        keys
    }

    /// Whether `existing`, an entry of `listIndexes`, has the same keys and
    /// options as this spec, whatever its name.
    #[must_use]
    pub fn matches(&self, existing: &Document) -> bool {
        let Ok(keys) = existing.get_document("key") else {
            return false;
        };

        let same_keys = keys.len() == self.keys.len()
            && keys
                .iter()
                .zip(&self.keys)
                .all(|((field, value), (want, direction))| {
                    field == want && as_i64(value) == Some(i64::from(direction.value()))
                });

        let unique = existing.get_bool("unique").unwrap_or(false);
        let ttl = existing.get("expireAfterSeconds").and_then(as_i64);
        let want_ttl = self
            .expire_after
            .map(|after| i64::try_from(after.as_secs()).unwrap_or(i64::MAX));

        same_keys && unique == self.unique && ttl == want_ttl
    }

    #[must_use]
    pub fn to_document(&self) -> Document {
        let mut index = doc! {
            "key": self.keys(),
            "name": self.name(),
        };

        if self.unique {
            index.insert("unique", true);
        }

        if let Some(after) = self.expire_after {
            index.insert(
                "expireAfterSeconds",
                i32::try_from(after.as_secs()).unwrap_or(i32::MAX),
            );
        }

        index
    }
}

#[allow(clippy::cast_possible_truncation)]
fn as_i64(value: &Bson) -> Option<i64> {
    match value {
        Bson::Int32(v) => Some(i64::from(*v)),
        Bson::Int64(v) => Some(*v),
        Bson::Double(v) if v.fract() == 0.0 => Some(*v as i64),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compound_index_name_follows_server_convention() {
        let index = IndexSpec::compound(&[
            ("userId", Direction::Ascending),
            ("sessionId", Direction::Ascending),
        ])
        .unique();

        assert_eq!(index.name(), "userId_1_sessionId_1");
        assert_eq!(
            index.to_document(),
            doc! {
                "key": { "userId": 1, "sessionId": 1 },
                "name": "userId_1_sessionId_1",
                "unique": true,
            }
        );
    }

    #[test]
    fn descending_index() {
        let index = IndexSpec::descending("createdAt");
        assert_eq!(index.name(), "createdAt_-1");
        assert_eq!(index.keys(), doc! { "createdAt": -1 });
        assert!(!index.is_unique());
    }

    #[test]
    fn ttl_index_expires_at_the_stored_date() {
        let index = IndexSpec::ascending("expiresAt").expire_after(Duration::ZERO);
        assert_eq!(index.ttl(), Some(Duration::ZERO));
        assert_eq!(
            index.to_document(),
            doc! {
                "key": { "expiresAt": 1 },
                "name": "expiresAt_1",
                "expireAfterSeconds": 0,
            }
        );
    }

    #[test]
    fn named_index_keeps_its_name() {
        let index = IndexSpec::ascending("expiresAt")
            .expire_after(Duration::ZERO)
            .named("expiresAt_ttl");
        assert_eq!(index.name(), "expiresAt_ttl");
        assert_eq!(index.to_document().get_str("name").ok(), Some("expiresAt_ttl"));
    }

    #[test]
    fn matches_ignores_the_name() {
        let index = IndexSpec::ascending("expiresAt")
            .expire_after(Duration::ZERO)
            .named("expiresAt_ttl");

        let legacy = doc! {
            "v": 2,
            "key": { "expiresAt": 1 },
            "name": "expiresAt_1",
            "expireAfterSeconds": 0_i64,
        };
        assert!(index.matches(&legacy));

        let double = doc! { "key": { "expiresAt": 1.0 }, "name": "x", "expireAfterSeconds": 0.0 };
        assert!(index.matches(&double));
    }

    #[test]
    fn matches_compares_keys_and_options() {
        let index = IndexSpec::compound(&[
            ("userId", Direction::Ascending),
            ("sessionId", Direction::Ascending),
        ])
        .unique();

        assert!(index.matches(&doc! {
            "key": { "userId": 1, "sessionId": 1 },
            "name": "userId_1_sessionId_1",
            "unique": true,
        }));

        for existing in [
            doc! { "key": { "userId": 1, "sessionId": 1 }, "name": "a" },
            doc! { "key": { "sessionId": 1, "userId": 1 }, "name": "b", "unique": true },
            doc! { "key": { "userId": 1, "sessionId": -1 }, "name": "c", "unique": true },
            doc! { "key": { "userId": 1 }, "name": "d", "unique": true },
            doc! { "key": { "userId": 1, "sessionId": 1 }, "name": "e", "unique": true, "expireAfterSeconds": 0 },
        ] {
            assert!(!index.matches(&existing), "{existing}");
        }
    }
}
