//! PostgreSQL-backed document store
//!
//! All collections share one `documents` table; each row holds one JSONB
//! document. Filters become JSONB containment (`body @> $filter`), field
//! exclusion becomes `body - $fields::text[]`, and insertion order is `seq`.

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;

use super::{
    check_identifier, Document, DocumentStore, Filter, FindOptions, RetryPolicy, StoreError, Update,
    UpdateResult,
};

/// Document store over a PostgreSQL pool
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
    policy: RetryPolicy,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool, policy: RetryPolicy) -> Self {
        Self { pool, policy }
    }

    /// Insert `body`. On a replayed attempt, a duplicate-key failure caused by
    /// the identical document already being stored counts as success.
    async fn insert_once(&self, collection: &str, body: &Document, replay: bool) -> Result<(), StoreError> {
        let inserted = sqlx::query("INSERT INTO documents (collection, body) VALUES ($1, $2)")
            .bind(collection)
            .bind(Json(body))
            .execute(&self.pool)
            .await
            .map_err(|e| classify(collection, e));

        match inserted {
            Ok(_) => Ok(()),
            Err(StoreError::Duplicate { .. }) if replay => {
                if self.contains_exact(collection, body).await? {
                    tracing::debug!(collection, "insert already applied by an earlier attempt");
                    Ok(())
                } else {
                    Err(StoreError::Duplicate {
                        collection: collection.to_owned(),
                    })
                }
            }
            Err(e) => Err(e),
        }
    }

    async fn contains_exact(&self, collection: &str, body: &Document) -> Result<bool, StoreError> {
        let (found,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM documents WHERE collection = $1 AND body = $2)",
        )
        .bind(collection)
        .bind(Json(body))
        .fetch_one(&self.pool)
        .await?;
        Ok(found)
    }

    async fn find_once(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
        limit: Option<i64>,
    ) -> Result<Vec<Document>, StoreError> {
        let rows: Vec<(Json<Document>,)> = sqlx::query_as(
            r#"
            SELECT body - $3::text[] AS body
            FROM documents
            WHERE collection = $1 AND body @> $2
            ORDER BY seq
            LIMIT $4
            "#,
        )
        .bind(collection)
        .bind(Json(filter.to_value()))
        .bind(options.excluded().to_vec())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|(Json(body),)| body).collect())
    }

    async fn update_once(
        &self,
        collection: &str,
        filter: &Filter,
        update: &Update,
    ) -> Result<UpdateResult, StoreError> {
        let mut tx = self.pool.begin().await?;

        let row: Option<(i64, Json<Document>)> = sqlx::query_as(
            r#"
            SELECT seq, body
            FROM documents
            WHERE collection = $1 AND body @> $2
            ORDER BY seq
            LIMIT 1
            FOR UPDATE
            "#,
        )
        .bind(collection)
        .bind(Json(filter.to_value()))
        .fetch_optional(&mut *tx)
        .await?;

        let Some((seq, Json(mut body))) = row else {
            tx.commit().await?;
            return Ok(UpdateResult::default());
        };

        let modified = update.apply(&mut body)?;
        if modified {
            sqlx::query("UPDATE documents SET body = $1 WHERE seq = $2")
                .bind(Json(&body))
                .bind(seq)
                .execute(&mut *tx)
                .await
                .map_err(|e| classify(collection, e))?;
        }
        tx.commit().await?;

        Ok(UpdateResult {
            matched: 1,
            modified: u64::from(modified),
        })
    }
}

/// Unique index violations become `Duplicate`; everything else passes through.
fn classify(collection: &str, err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Duplicate {
            collection: collection.to_owned(),
        },
        _ => StoreError::Sqlx(err),
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn ensure_unique(&self, collection: &str, field: &str) -> Result<(), StoreError> {
        check_identifier(collection)?;
        check_identifier(field)?;

        // Both names passed the identifier check, so interpolation is safe here
        let ddl = format!(
            "CREATE UNIQUE INDEX IF NOT EXISTS uq_documents_{collection}_{field} \
             ON documents ((body->>'{field}')) WHERE collection = '{collection}'"
        );
        let (pool, ddl) = (&self.pool, ddl.as_str());
        self.policy
            .run("ensure_unique", move || async move {
                sqlx::query(ddl).execute(pool).await?;
                Ok(())
            })
            .await?;

        tracing::debug!(collection, field, "unique index ensured");
        Ok(())
    }

    async fn insert_one(&self, collection: &str, document: Document) -> Result<(), StoreError> {
        let (this, body) = (self, &document);
        self.policy
            .run_numbered("insert_one", StoreError::is_transient, move |attempt| {
                this.insert_once(collection, body, attempt > 1)
            })
            .await
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> Result<Option<Document>, StoreError> {
        let this = self;
        let docs = self
            .policy
            .run("find_one", move || this.find_once(collection, filter, options, Some(1)))
            .await?;
        Ok(docs.into_iter().next())
    }

    async fn find_many(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> Result<Vec<Document>, StoreError> {
        let this = self;
        self.policy
            .run("find_many", move || this.find_once(collection, filter, options, None))
            .await
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        update: &Update,
    ) -> Result<UpdateResult, StoreError> {
        let this = self;
        let attempt = move || this.update_once(collection, filter, update);
        if update.is_idempotent() {
            self.policy.run("update_one", attempt).await
        } else {
            self.policy.run_unrepeatable("update_one", attempt).await
        }
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        let filter = filter.to_value();
        let (pool, filter) = (&self.pool, &filter);
        self.policy
            .run_unrepeatable("delete_one", move || async move {
                let result = sqlx::query(
                    r#"
                    DELETE FROM documents
                    WHERE seq = (
                        SELECT seq FROM documents
                        WHERE collection = $1 AND body @> $2
                        ORDER BY seq
                        LIMIT 1
                    )
                    "#,
                )
                .bind(collection)
                .bind(Json(filter))
                .execute(pool)
                .await?;
                Ok(result.rows_affected())
            })
            .await
    }
}
