use crate::{
    Error, Result,
    error::server_code,
    schema::CollectionSpec,
};
use mongodb::{
    Client, Database,
    bson::{Document, doc},
    options::ClientOptions,
};
use tracing::{debug, info, instrument};

/// Server code returned by `create` when the collection already exists.
pub const NAMESPACE_EXISTS: i32 = 48;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionOutcome {
    Created,
    Updated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionReport {
    pub name: &'static str,
    pub outcome: CollectionOutcome,
    pub indexes: Vec<String>,
}

/// Connect to `uri` and make sure the deployment answers a `ping`.
///
/// # Errors
/// Returns an error if the URI is invalid or the server is unreachable.
#[instrument(skip(uri))]
pub async fn connect(uri: &str) -> Result<Client> {
    let mut options = ClientOptions::parse(uri).await?;
    options.app_name = Some(crate::APP_USER_AGENT.to_string());

    let client = Client::with_options(options)?;
    client.database("admin").run_command(doc! { "ping": 1 }).await?;

    debug!("connected");

    Ok(client)
}

/// Commands `Provisioner::apply_all` would run against an empty database.
#[must_use]
pub fn plan(specs: &[CollectionSpec]) -> Vec<Document> {
    specs
        .iter()
        .flat_map(|spec| std::iter::once(spec.create_command()).chain(spec.create_indexes_command()))
        .collect()
}

/// Applies collection definitions to one database. Every operation can be
/// repeated: existing collections get their validator replaced and existing
/// indexes with the same definition are left alone.
#[derive(Debug, Clone)]
pub struct Provisioner {
    db: Database,
}

impl Provisioner {
    #[must_use]
    pub const fn new(db: Database) -> Self {
        Self { db }
    }

    #[must_use]
    pub const fn database(&self) -> &Database {
        &self.db
    }

    /// Create the collection with its validator, or replace the validator if
    /// the collection already exists.
    ///
    /// # Errors
    /// Returns an error if the server rejects `create` or `collMod`.
    #[instrument(skip(self, spec), fields(collection = spec.name))]
    pub async fn ensure_collection(&self, spec: &CollectionSpec) -> Result<CollectionOutcome> {
        let existing = self.db.list_collection_names().await?;

        if !existing.iter().any(|name| name == spec.name) {
            match self.db.run_command(spec.create_command()).await {
                Ok(_) => {
                    info!("collection created");
                    return Ok(CollectionOutcome::Created);
                }
                // created concurrently by someone else, fall through to collMod
                Err(err) if server_code(&err) == Some(NAMESPACE_EXISTS) => {}
                Err(err) => return Err(err.into()),
            }
        }

        if let Some(command) = spec.modify_command() {
            self.db.run_command(command).await?;
            info!("validator replaced");
        }

        Ok(CollectionOutcome::Updated)
    }

    /// Create the indexes of `spec` that are not already defined, returning
    /// the name each one has on the server.
    ///
    /// # Errors
    /// Returns an error if an index with the same name but different options
    /// already exists, or the server rejects `createIndexes`.
    #[instrument(skip(self, spec), fields(collection = spec.name))]
    pub async fn ensure_indexes(&self, spec: &CollectionSpec) -> Result<Vec<String>> {
        if spec.indexes.is_empty() {
            return Ok(Vec::new());
        }

        let existing = self.list_indexes(spec.name).await?;

        if let Some(command) = spec.missing_indexes_command(&existing) {
            let reply = self.db.run_command(command).await?;
            debug!(?reply, "createIndexes");
        } else {
            debug!("indexes already present");
        }

        Ok(spec
            .indexes
            .iter()
            .map(|index| {
                existing
                    .iter()
                    .find(|found| index.matches(found))
                    .and_then(|found| found.get_str("name").ok())
                    .map_or_else(|| index.name(), str::to_string)
            })
            .collect())
    }

    /// Raw `listIndexes` entries of `collection`.
    async fn list_indexes(&self, collection: &str) -> Result<Vec<Document>> {
        let reply = self
            .db
            .run_command(doc! { "listIndexes": collection })
            .await?;

        Ok(reply
            .get_document("cursor")
            .and_then(|cursor| cursor.get_array("firstBatch"))
            .map(|batch| {
                batch
                    .iter()
                    .filter_map(|entry| entry.as_document().cloned())
                    .collect()
            })
            .unwrap_or_default())
    }

    /// # Errors
    /// Returns an error if the collection or one of its indexes cannot be provisioned.
    pub async fn apply(&self, spec: &CollectionSpec) -> Result<CollectionReport> {
        let outcome = self.ensure_collection(spec).await?;
        let indexes = self.ensure_indexes(spec).await?;

        Ok(CollectionReport {
            name: spec.name,
            outcome,
            indexes,
        })
    }

    /// Apply `specs` in order, stopping at the first failure.
    ///
    /// # Errors
    /// Returns the first provisioning error.
    pub async fn apply_all(&self, specs: &[CollectionSpec]) -> Result<Vec<CollectionReport>> {
        let mut reports = Vec::with_capacity(specs.len());
        for spec in specs {
            reports.push(self.apply(spec).await?);
        }
        Ok(reports)
    }

    /// Names of the indexes currently defined on `collection`.
    ///
    /// # Errors
    /// Returns an error if the server cannot list the indexes.
    pub async fn index_names(&self, collection: &str) -> Result<Vec<String>> {
        Ok(self
            .db
            .collection::<Document>(collection)
            .list_index_names()
            .await?)
    }

    /// Insert one document, classifying duplicate keys and validator rejections.
    ///
    /// # Errors
    /// Returns [`Error::DuplicateKey`], [`Error::DocumentValidation`] or the raw driver error.
    pub async fn insert(&self, collection: &str, doc: Document) -> Result<()> {
        self.db
            .collection::<Document>(collection)
            .insert_one(doc)
            .await
            .map_err(|err| Error::from_write(collection, err))?;
        Ok(())
    }
}
