//! In-process document store
//!
//! Same semantics as the PostgreSQL backend, held in one `RwLock`. Used by
//! tests and by `sisuo serve --memory`. Contents are lost on restart.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{check_identifier, Document, DocumentStore, Filter, FindOptions, StoreError, Update, UpdateResult};

#[derive(Default)]
struct Inner {
    collections: HashMap<String, Vec<Document>>,
    unique: HashMap<String, Vec<String>>,
}

impl Inner {
    fn violates_unique(&self, collection: &str, candidate: &Document, skip: Option<usize>) -> bool {
        let Some(fields) = self.unique.get(collection) else {
            return false;
        };
        let Some(docs) = self.collections.get(collection) else {
            return false;
        };
        fields.iter().any(|field| {
            let Some(value) = candidate.get(field) else {
                return false;
            };
            docs.iter()
                .enumerate()
                .filter(|(i, _)| Some(*i) != skip)
                .any(|(_, doc)| doc.get(field) == Some(value))
        })
    }
}

/// Document store kept in memory
#[derive(Default)]
pub struct MemoryDocumentStore {
    inner: RwLock<Inner>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in `collection`.
    pub async fn count(&self, collection: &str) -> usize {
        self.inner
            .read()
            .await
            .collections
            .get(collection)
            .map_or(0, Vec::len)
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn ensure_unique(&self, collection: &str, field: &str) -> Result<(), StoreError> {
        check_identifier(collection)?;
        check_identifier(field)?;

        let mut inner = self.inner.write().await;
        let fields = inner.unique.entry(collection.to_owned()).or_default();
        if !fields.iter().any(|f| f == field) {
            fields.push(field.to_owned());
        }
        Ok(())
    }

    async fn insert_one(&self, collection: &str, document: Document) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if inner.violates_unique(collection, &document, None) {
            return Err(StoreError::Duplicate {
                collection: collection.to_owned(),
            });
        }
        inner
            .collections
            .entry(collection.to_owned())
            .or_default()
            .push(document);
        Ok(())
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> Result<Option<Document>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| filter.matches(d)))
            .map(|d| options.project(d.clone())))
    }

    async fn find_many(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> Result<Vec<Document>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|d| filter.matches(d))
                    .map(|d| options.project(d.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        update: &Update,
    ) -> Result<UpdateResult, StoreError> {
        let mut inner = self.inner.write().await;
        let Some(index) = inner
            .collections
            .get(collection)
            .and_then(|docs| docs.iter().position(|d| filter.matches(d)))
        else {
            return Ok(UpdateResult::default());
        };

        // Apply to a copy so a failed update or unique violation leaves the original intact
        let mut updated = inner.collections[collection][index].clone();
        let modified = update.apply(&mut updated)?;
        if modified {
            if inner.violates_unique(collection, &updated, Some(index)) {
                return Err(StoreError::Duplicate {
                    collection: collection.to_owned(),
                });
            }
            if let Some(docs) = inner.collections.get_mut(collection) {
                docs[index] = updated;
            }
        }

        Ok(UpdateResult {
            matched: 1,
            modified: u64::from(modified),
        })
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        let mut inner = self.inner.write().await;
        let Some(docs) = inner.collections.get_mut(collection) else {
            return Ok(0);
        };
        match docs.iter().position(|d| filter.matches(d)) {
            Some(index) => {
                docs.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[tokio::test]
    async fn insert_find_in_order() {
        let store = MemoryDocumentStore::new();
        store.insert_one("c", doc(json!({ "k": 1, "o": "a" }))).await.unwrap();
        store.insert_one("c", doc(json!({ "k": 2, "o": "b" }))).await.unwrap();
        store.insert_one("c", doc(json!({ "k": 3, "o": "a" }))).await.unwrap();

        let found = store
            .find_many("c", &Filter::by("o", "a"), &FindOptions::new())
            .await
            .unwrap();
        let keys: Vec<_> = found.iter().map(|d| d["k"].clone()).collect();
        assert_eq!(keys, vec![json!(1), json!(3)]);

        let one = store
            .find_one("c", &Filter::by("k", 2), &FindOptions::new().exclude("o"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(Value::Object(one), json!({ "k": 2 }));

        assert!(store
            .find_one("other", &Filter::new(), &FindOptions::new())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn unique_fields_reject_duplicates() {
        let store = MemoryDocumentStore::new();
        store.ensure_unique("account", "account").await.unwrap();
        store.ensure_unique("account", "account").await.unwrap();

        store.insert_one("account", doc(json!({ "account": "alice" }))).await.unwrap();
        let err = store
            .insert_one("account", doc(json!({ "account": "alice" })))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { .. }));
        assert_eq!(store.count("account").await, 1);

        store.insert_one("account", doc(json!({ "account": "bob" }))).await.unwrap();
        let err = store
            .update_one("account", &Filter::by("account", "bob"), &Update::set("account", "alice"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { .. }));
    }

    #[tokio::test]
    async fn update_and_delete_first_match_only() {
        let store = MemoryDocumentStore::new();
        store.insert_one("c", doc(json!({ "o": "a", "n": 1 }))).await.unwrap();
        store.insert_one("c", doc(json!({ "o": "a", "n": 2 }))).await.unwrap();

        let res = store
            .update_one("c", &Filter::by("o", "a"), &Update::set("n", 10))
            .await
            .unwrap();
        assert_eq!(res, UpdateResult { matched: 1, modified: 1 });

        let none = store
            .update_one("c", &Filter::by("o", "z"), &Update::set("n", 10))
            .await
            .unwrap();
        assert_eq!(none, UpdateResult::default());

        assert_eq!(store.delete_one("c", &Filter::by("o", "a")).await.unwrap(), 1);
        let left = store.find_many("c", &Filter::new(), &FindOptions::new()).await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0]["n"], 2);

        assert_eq!(store.delete_one("c", &Filter::by("o", "z")).await.unwrap(), 0);
        assert_eq!(store.delete_one("missing", &Filter::new()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn failed_update_leaves_document_untouched() {
        let store = MemoryDocumentStore::new();
        store.insert_one("c", doc(json!({ "id": "x", "items": 5 }))).await.unwrap();
        let err = store
            .update_one("c", &Filter::by("id", "x"), &Update::push("items", 1))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidUpdate(_)));
        let d = store
            .find_one("c", &Filter::by("id", "x"), &FindOptions::new())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(d["items"], 5);
    }
}
