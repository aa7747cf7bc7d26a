//! In-process document store.
//!
//! Mirrors the subset of MongoDB behavior the catalog relies on: top-level
//! equality, `$lte` and `$in` filters, generated `ObjectId`s, unique keys and
//! `modified` counts that ignore no-op `$set`s. Used with `STORE_BACKEND=memory`
//! and by the test suites.

use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, Bson, Document};
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{DocumentStore, UpdateOutcome};
use crate::models::{RECIPES_COLLECTION, RECIPE_ID_FIELD, USERS_COLLECTION};
use crate::utils::AppError;

pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
    unique_keys: Vec<(&'static str, &'static str)>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            unique_keys: vec![
                (RECIPES_COLLECTION, RECIPE_ID_FIELD),
                (USERS_COLLECTION, "email"),
            ],
        }
    }

    /// Number of documents currently held in `collection`
    #[cfg(test)]
    pub async fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, Vec::len)
    }
}

fn as_number(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(n) => Some(f64::from(*n)),
        Bson::Int64(n) => Some(*n as f64),
        Bson::Double(n) => Some(*n),
        _ => None,
    }
}

/// Equality with MongoDB's numeric semantics: `5` (int32), `5` (int64) and
/// `5.0` (double) are the same value.
fn values_equal(left: &Bson, right: &Bson) -> bool {
    match (as_number(left), as_number(right)) {
        (Some(l), Some(r)) => l == r,
        _ => left == right,
    }
}

fn condition_matches(value: Option<&Bson>, condition: &Bson) -> bool {
    if let Bson::Document(operators) = condition {
        if operators.keys().next().is_some_and(|key| key.starts_with('$')) {
            return operators.iter().all(|(operator, operand)| match operator.as_str() {
                "$lte" => match (value.and_then(as_number), as_number(operand)) {
                    (Some(v), Some(bound)) => v <= bound,
                    _ => false,
                },
                "$in" => match (value, operand) {
                    (Some(v), Bson::Array(candidates)) => {
                        candidates.iter().any(|candidate| values_equal(v, candidate))
                    }
                    _ => false,
                },
                other => {
                    log::warn!("Unsupported filter operator in memory store: {}", other);
                    false
                }
            });
        }
    }

    value.is_some_and(|v| values_equal(v, condition))
}

pub(crate) fn matches(document: &Document, filter: &Document) -> bool {
    filter
        .iter()
        .all(|(field, condition)| condition_matches(document.get(field), condition))
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find(&self, collection: &str, filter: Document) -> Result<Vec<Document>, AppError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| docs.iter().filter(|d| matches(d, &filter)).cloned().collect())
            .unwrap_or_default())
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: Document,
    ) -> Result<Option<Document>, AppError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| matches(d, &filter)).cloned()))
    }

    async fn insert_one(&self, collection: &str, mut document: Document) -> Result<Bson, AppError> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();

        for (unique_collection, key) in &self.unique_keys {
            if *unique_collection != collection {
                continue;
            }
            if let Some(value) = document.get(*key) {
                if docs.iter().any(|d| d.get(*key).is_some_and(|v| values_equal(v, value))) {
                    return Err(AppError::Conflict(format!(
                        "Duplicate key in collection {}",
                        collection
                    )));
                }
            }
        }

        let id = document
            .get("_id")
            .cloned()
            .unwrap_or_else(|| Bson::ObjectId(ObjectId::new()));
        document.insert("_id", id.clone());
        docs.push(document);

        Ok(id)
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        set: Document,
    ) -> Result<UpdateOutcome, AppError> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(UpdateOutcome::default());
        };
        let Some(index) = docs.iter().position(|d| matches(d, &filter)) else {
            return Ok(UpdateOutcome::default());
        };

        for (unique_collection, key) in &self.unique_keys {
            if *unique_collection != collection {
                continue;
            }
            if let Some(value) = set.get(*key) {
                let taken = docs.iter().enumerate().any(|(i, d)| {
                    i != index && d.get(*key).is_some_and(|v| values_equal(v, value))
                });
                if taken {
                    return Err(AppError::Conflict(format!(
                        "Duplicate key in collection {}",
                        collection
                    )));
                }
            }
        }

        let document = &mut docs[index];
        let mut changed = false;
        for (field, value) in set {
            let same = document.get(&field).is_some_and(|current| current == &value);
            if !same {
                document.insert(field, value);
                changed = true;
            }
        }

        Ok(UpdateOutcome {
            matched: 1,
            modified: u64::from(changed),
        })
    }

    async fn delete_one(&self, collection: &str, filter: Document) -> Result<u64, AppError> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(0);
        };

        match docs.iter().position(|d| matches(d, &filter)) {
            Some(index) => {
                docs.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_many(&self, collection: &str, filter: Document) -> Result<u64, AppError> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(0);
        };

        let before = docs.len();
        docs.retain(|d| !matches(d, &filter));
        Ok((before - docs.len()) as u64)
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    #[test]
    fn test_equality_is_numeric_across_types() {
        let document = doc! { "serve_size": 4_i32, "name": "Flan" };

        assert!(matches(&document, &doc! { "serve_size": 4_i64 }));
        assert!(matches(&document, &doc! { "serve_size": 4.0 }));
        assert!(!matches(&document, &doc! { "serve_size": "4" }));
        assert!(matches(&document, &doc! {}));
    }

    #[test]
    fn test_missing_field_never_matches() {
        let document = doc! { "name": "Flan" };
        assert!(!matches(&document, &doc! { "origin": "Spain" }));
        assert!(!matches(&document, &doc! { "calories": { "$lte": 500_i64 } }));
    }

    #[test]
    fn test_lte_and_in_operators() {
        let document = doc! { "calories": 320.5, "recipeID": 7_i32 };

        assert!(matches(&document, &doc! { "calories": { "$lte": 321_i64 } }));
        assert!(!matches(&document, &doc! { "calories": { "$lte": 320_i64 } }));
        assert!(matches(&document, &doc! { "recipeID": { "$in": ["7", 7_i64] } }));
        assert!(!matches(&document, &doc! { "recipeID": { "$in": ["7"] } }));
    }

    #[tokio::test]
    async fn test_insert_assigns_object_id_and_preserves_order() {
        let store = MemoryStore::new();
        let first = store.insert_one("Picture", doc! { "recipeID": "r1", "n": 1 }).await.unwrap();
        store.insert_one("Picture", doc! { "recipeID": "r1", "n": 2 }).await.unwrap();

        assert!(matches!(first, Bson::ObjectId(_)));
        let found = store.find("Picture", doc! { "recipeID": "r1" }).await.unwrap();
        let order: Vec<i32> = found.iter().map(|d| d.get_i32("n").unwrap()).collect();
        assert_eq!(order, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_unique_recipe_id() {
        let store = MemoryStore::new();
        store.insert_one(RECIPES_COLLECTION, doc! { "recipeID": "r1" }).await.unwrap();

        let err = store
            .insert_one(RECIPES_COLLECTION, doc! { "recipeID": "r1" })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(store.count(RECIPES_COLLECTION).await, 1);

        // Satellites have no unique constraint
        store.insert_one("Video", doc! { "recipeID": "r1" }).await.unwrap();
        store.insert_one("Video", doc! { "recipeID": "r1" }).await.unwrap();
        assert_eq!(store.count("Video").await, 2);
    }

    #[tokio::test]
    async fn test_update_reports_noop_as_unmodified() {
        let store = MemoryStore::new();
        store
            .insert_one(RECIPES_COLLECTION, doc! { "name": "Flan", "difficulty": "easy" })
            .await
            .unwrap();

        let same = store
            .update_one(RECIPES_COLLECTION, doc! { "name": "Flan" }, doc! { "difficulty": "easy" })
            .await
            .unwrap();
        assert_eq!(same, UpdateOutcome { matched: 1, modified: 0 });

        let changed = store
            .update_one(RECIPES_COLLECTION, doc! { "name": "Flan" }, doc! { "difficulty": "hard" })
            .await
            .unwrap();
        assert_eq!(changed, UpdateOutcome { matched: 1, modified: 1 });

        let missing = store
            .update_one(RECIPES_COLLECTION, doc! { "name": "Pavlova" }, doc! { "x": 1 })
            .await
            .unwrap();
        assert_eq!(missing, UpdateOutcome::default());
    }

    #[tokio::test]
    async fn test_delete_one_and_many() {
        let store = MemoryStore::new();
        for n in 0..3 {
            store.insert_one("Author", doc! { "recipeID": "r1", "n": n }).await.unwrap();
        }

        assert_eq!(store.delete_one("Author", doc! { "recipeID": "r1" }).await.unwrap(), 1);
        assert_eq!(store.delete_many("Author", doc! { "recipeID": "r1" }).await.unwrap(), 2);
        assert_eq!(store.delete_many("Author", doc! { "recipeID": "r1" }).await.unwrap(), 0);
        assert_eq!(store.delete_one("Nope", doc! {}).await.unwrap(), 0);
    }
}
