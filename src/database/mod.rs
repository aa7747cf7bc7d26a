pub mod memory;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, Bson, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::IndexOptions;
use mongodb::{Client, Database, IndexModel};

use crate::models::{RECIPES_COLLECTION, SATELLITES, USERS_COLLECTION};
use crate::utils::AppError;

pub use memory::MemoryStore;

/// Result of a `$set` update against a single document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdateOutcome {
    pub matched: u64,
    pub modified: u64,
}

/// Document-level access to the catalog collections.
///
/// Filters use the MongoDB query shape. Backends must support top-level
/// equality plus the `$lte` and `$in` operators.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn find(&self, collection: &str, filter: Document) -> Result<Vec<Document>, AppError>;

    async fn find_one(
        &self,
        collection: &str,
        filter: Document,
    ) -> Result<Option<Document>, AppError>;

    /// Inserts one document and returns its store `_id`.
    /// Unique-key violations are reported as `AppError::Conflict`.
    async fn insert_one(&self, collection: &str, document: Document) -> Result<Bson, AppError>;

    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        set: Document,
    ) -> Result<UpdateOutcome, AppError>;

    async fn delete_one(&self, collection: &str, filter: Document) -> Result<u64, AppError>;

    async fn delete_many(&self, collection: &str, filter: Document) -> Result<u64, AppError>;

    async fn ping(&self) -> Result<(), AppError>;
}

#[derive(Clone)]
pub struct MongoDB {
    db: Database,
}

impl MongoDB {
    pub async fn new(uri: &str, db_name: &str) -> Result<Self, AppError> {
        let mut client_options = mongodb::options::ClientOptions::parse(uri).await?;

        client_options.app_name = Some("recipe-catalog".to_string());
        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(2);
        client_options.max_idle_time = Some(std::time::Duration::from_secs(300));

        client_options.connect_timeout = Some(std::time::Duration::from_secs(5));
        client_options.server_selection_timeout = Some(std::time::Duration::from_secs(5));

        let client = Client::with_options(client_options)?;
        let db = client.database(db_name);

        let mongodb = Self { db };
        mongodb.ping().await?;
        mongodb.ensure_indexes().await;

        Ok(mongodb)
    }

    /// Creates lookup indexes. Failures are logged, not fatal: a pre-existing
    /// collection with duplicate `recipeID`s cannot take the unique index.
    async fn ensure_indexes(&self) {
        log::info!("🔧 Creating database indexes...");

        let unique = || Some(IndexOptions::builder().unique(true).build());

        let mut indexes = vec![
            (RECIPES_COLLECTION, doc! { "recipeID": 1 }, unique()),
            (RECIPES_COLLECTION, doc! { "name": 1 }, None),
            (USERS_COLLECTION, doc! { "email": 1 }, unique()),
        ];
        for satellite in SATELLITES {
            indexes.push((satellite.collection, doc! { "recipeID": 1 }, None));
        }

        for (collection, keys, options) in indexes {
            let label = format!("{}({})", collection, keys.keys().cloned().collect::<Vec<_>>().join(", "));
            let model = IndexModel::builder().keys(keys).options(options).build();

            match self.db.collection::<Document>(collection).create_index(model).await {
                Ok(_) => log::info!("   ✅ Index ready: {}", label),
                Err(e) => log::warn!("   ⚠️  Index {} not created: {}", label, e),
            }
        }

        log::info!("✅ Database indexes ready");
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == 11000
    )
}

#[async_trait]
impl DocumentStore for MongoDB {
    async fn find(&self, collection: &str, filter: Document) -> Result<Vec<Document>, AppError> {
        let cursor = self.db.collection::<Document>(collection).find(filter).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: Document,
    ) -> Result<Option<Document>, AppError> {
        Ok(self.db.collection::<Document>(collection).find_one(filter).await?)
    }

    async fn insert_one(&self, collection: &str, document: Document) -> Result<Bson, AppError> {
        match self.db.collection::<Document>(collection).insert_one(document).await {
            Ok(result) => Ok(result.inserted_id),
            Err(e) if is_duplicate_key(&e) => Err(AppError::Conflict(format!(
                "Duplicate key in collection {}",
                collection
            ))),
            Err(e) => Err(e.into()),
        }
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        set: Document,
    ) -> Result<UpdateOutcome, AppError> {
        let result = match self
            .db
            .collection::<Document>(collection)
            .update_one(filter, doc! { "$set": set })
            .await
        {
            Ok(result) => result,
            Err(e) if is_duplicate_key(&e) => {
                return Err(AppError::Conflict(format!(
                    "Duplicate key in collection {}",
                    collection
                )))
            }
            Err(e) => return Err(e.into()),
        };

        Ok(UpdateOutcome {
            matched: result.matched_count,
            modified: result.modified_count,
        })
    }

    async fn delete_one(&self, collection: &str, filter: Document) -> Result<u64, AppError> {
        let result = self.db.collection::<Document>(collection).delete_one(filter).await?;
        Ok(result.deleted_count)
    }

    async fn delete_many(&self, collection: &str, filter: Document) -> Result<u64, AppError> {
        let result = self.db.collection::<Document>(collection).delete_many(filter).await?;
        Ok(result.deleted_count)
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.db.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }
}
