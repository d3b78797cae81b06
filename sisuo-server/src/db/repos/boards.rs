//! Board repository
//!
//! One document per board in the `kanban` collection. Components are
//! embedded in `componentList`, so component writes are single-document
//! updates on the owning board:
//! - add: push onto the array
//! - update: replace the first element with the same id (no-op when absent)
//! - delete: remove the first element with the same id

use serde_json::Value;
use uuid::Uuid;

use super::DbError;
use crate::models::{Board, BoardSummary, BoardTitle, Component};
use crate::store::{from_document, to_document, DocumentStore, Filter, FindOptions, Update};

/// Collection holding board documents
pub const KANBAN_COLLECTION: &str = "kanban";

const ID_FIELD: &str = "kanbanId";
const OWNER_FIELD: &str = "userId";
const TITLE_FIELD: &str = "title";
const COMPONENTS_FIELD: &str = "componentList";
const COMPONENT_ID_FIELD: &str = "id";

/// Input for board creation. The id is always assigned here.
#[derive(Debug, Clone)]
pub struct NewBoard {
    pub user_id: String,
    pub title: BoardTitle,
    pub component_list: Vec<Component>,
}

/// Board repository
pub struct BoardRepo<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> BoardRepo<'a> {
    pub fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Declare the unique board id index. Run once at startup.
    pub async fn ensure_indexes(&self) -> Result<(), DbError> {
        self.store.ensure_unique(KANBAN_COLLECTION, ID_FIELD).await?;
        Ok(())
    }

    fn by_id(kanban_id: &str) -> Filter {
        Filter::by(ID_FIELD, kanban_id)
    }

    /// Boards owned by `user_id`, without their components.
    pub async fn list(&self, user_id: &str) -> Result<Vec<BoardSummary>, DbError> {
        let docs = self
            .store
            .find_many(
                KANBAN_COLLECTION,
                &Filter::by(OWNER_FIELD, user_id),
                &FindOptions::new().exclude(COMPONENTS_FIELD),
            )
            .await?;

        docs.into_iter()
            .map(|doc| from_document(doc).map_err(DbError::from))
            .collect()
    }

    /// Insert a new board under a fresh id and return that id.
    pub async fn create(&self, board: NewBoard) -> Result<String, DbError> {
        let board = Board {
            kanban_id: Uuid::new_v4().to_string(),
            user_id: board.user_id,
            title: board.title.into_string(),
            component_list: board.component_list,
        };

        self.store
            .insert_one(KANBAN_COLLECTION, to_document(&board)?)
            .await?;

        tracing::debug!(kanban_id = %board.kanban_id, user_id = %board.user_id, "board created");
        Ok(board.kanban_id)
    }

    /// Full board with every component and link.
    pub async fn get(&self, kanban_id: &str) -> Result<Board, DbError> {
        let doc = self
            .store
            .find_one(KANBAN_COLLECTION, &Self::by_id(kanban_id), &FindOptions::new())
            .await?
            .ok_or_else(|| DbError::NotFound {
                resource: "board",
                id: kanban_id.to_owned(),
            })?;

        Ok(from_document(doc)?)
    }

    /// Set the title. Succeeds without effect when the board does not exist.
    pub async fn update_title(&self, kanban_id: &str, title: BoardTitle) -> Result<(), DbError> {
        let result = self
            .store
            .update_one(
                KANBAN_COLLECTION,
                &Self::by_id(kanban_id),
                &Update::set(TITLE_FIELD, title.into_string()),
            )
            .await?;

        if result.matched == 0 {
            tracing::debug!(kanban_id, "title update on missing board ignored");
        }
        Ok(())
    }

    /// Remove the board and, with it, its components. No-op when absent.
    pub async fn delete(&self, kanban_id: &str) -> Result<(), DbError> {
        let deleted = self
            .store
            .delete_one(KANBAN_COLLECTION, &Self::by_id(kanban_id))
            .await?;

        tracing::debug!(kanban_id, deleted, "board delete");
        Ok(())
    }

    /// Append a component. Ids are not checked for duplicates.
    ///
    /// Returns whether a board was modified.
    pub async fn add_component(&self, kanban_id: &str, component: &Component) -> Result<bool, DbError> {
        let value = component_value(component)?;
        let result = self
            .store
            .update_one(
                KANBAN_COLLECTION,
                &Self::by_id(kanban_id),
                &Update::push(COMPONENTS_FIELD, value),
            )
            .await?;

        Ok(result.modified > 0)
    }

    /// Replace the component with the same id, keeping its position in the
    /// sequence. When no component matches nothing is written.
    ///
    /// Returns whether a component was replaced with different content.
    pub async fn update_component(&self, kanban_id: &str, component: &Component) -> Result<bool, DbError> {
        let value = component_value(component)?;
        let result = self
            .store
            .update_one(
                KANBAN_COLLECTION,
                &Self::by_id(kanban_id),
                &Update::set_element(COMPONENTS_FIELD, COMPONENT_ID_FIELD, component.id.as_str(), value),
            )
            .await?;

        Ok(result.modified > 0)
    }

    /// Remove the first component with `component_id`. No-op when absent.
    pub async fn delete_component(&self, kanban_id: &str, component_id: &str) -> Result<bool, DbError> {
        let result = self
            .store
            .update_one(
                KANBAN_COLLECTION,
                &Self::by_id(kanban_id),
                &Update::pull_first(COMPONENTS_FIELD, COMPONENT_ID_FIELD, component_id),
            )
            .await?;

        Ok(result.modified > 0)
    }
}

fn component_value(component: &Component) -> Result<Value, DbError> {
    Ok(Value::Object(to_document(component)?))
}
