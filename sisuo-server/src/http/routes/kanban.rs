//! Kanban board and component endpoints

use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::db::{BoardRepo, NewBoard};
use crate::http::error::ApiError;
use crate::http::extractors::{JsonBody, PathParam, QueryParams};
use crate::http::response::{success, Envelope};
use crate::http::server::AppState;
use crate::models::{require, Board, BoardSummary, BoardTitle, Component, ValidationError};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub user_id: Option<String>,
}

/// Board fields accepted on creation. A client-supplied `kanbanId` is ignored.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBoardBody {
    pub user_id: Option<String>,
    pub title: Option<String>,
    #[serde(default)]
    pub component_list: Vec<Component>,
}

#[derive(Deserialize)]
pub struct AddBoardRequest {
    pub kanban: Option<NewBoardBody>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitleBody {
    pub kanban_id: Option<String>,
    pub title: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateBoardRequest {
    pub kanban: Option<TitleBody>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteBoardRequest {
    pub kanban_id: Option<String>,
}

/// Body for component add/update
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentRequest {
    pub kanban_id: Option<String>,
    pub component: Option<Component>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteComponentRequest {
    pub kanban_id: Option<String>,
    pub component_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Created {
    pub kanban_id: String,
}

/// Whether a component write changed the board
#[derive(Debug, Serialize, Deserialize)]
pub struct Modified {
    pub modified: bool,
}

impl ComponentRequest {
    fn into_parts(self) -> Result<(String, Component), ValidationError> {
        let kanban_id = require(self.kanban_id, "kanbanId")?;
        let component = self
            .component
            .ok_or(ValidationError::Empty { field: "component" })?;
        component.validate()?;
        Ok((kanban_id, component))
    }
}

/// GET /kanban/list?userId=
async fn list_boards(
    State(state): State<Arc<AppState>>,
    QueryParams(params): QueryParams<ListParams>,
) -> Result<Json<Envelope<Vec<BoardSummary>>>, ApiError> {
    let user_id = require(params.user_id, "userId")?;
    let boards = BoardRepo::new(state.store()).list(&user_id).await?;
    Ok(success(boards))
}

/// GET /kanban/{kanban_id}
async fn get_board(
    State(state): State<Arc<AppState>>,
    PathParam(kanban_id): PathParam<String>,
) -> Result<Json<Envelope<Board>>, ApiError> {
    let board = BoardRepo::new(state.store()).get(&kanban_id).await?;
    Ok(success(board))
}

/// POST /kanban/add
async fn add_board(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<AddBoardRequest>,
) -> Result<Json<Envelope<Created>>, ApiError> {
    let body = req.kanban.ok_or(ValidationError::Empty { field: "kanban" })?;
    let user_id = require(body.user_id, "userId")?;
    let title = BoardTitle::new(body.title.as_deref().unwrap_or_default())?;
    for component in &body.component_list {
        component.validate()?;
    }

    let kanban_id = BoardRepo::new(state.store())
        .create(NewBoard {
            user_id,
            title,
            component_list: body.component_list,
        })
        .await?;
    Ok(success(Created { kanban_id }))
}

/// POST /kanban/update - title only
async fn update_board(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<UpdateBoardRequest>,
) -> Result<Json<Envelope<()>>, ApiError> {
    let body = req.kanban.ok_or(ValidationError::Empty { field: "kanban" })?;
    let kanban_id = require(body.kanban_id, "kanbanId")?;
    let title = BoardTitle::new(body.title.as_deref().unwrap_or_default())?;

    BoardRepo::new(state.store()).update_title(&kanban_id, title).await?;
    Ok(success(()))
}

/// POST /kanban/delete
async fn delete_board(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<DeleteBoardRequest>,
) -> Result<Json<Envelope<()>>, ApiError> {
    let kanban_id = require(req.kanban_id, "kanbanId")?;
    BoardRepo::new(state.store()).delete(&kanban_id).await?;
    Ok(success(()))
}

/// POST /kanban/component/add
async fn add_component(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<ComponentRequest>,
) -> Result<Json<Envelope<Modified>>, ApiError> {
    let (kanban_id, component) = req.into_parts()?;
    let modified = BoardRepo::new(state.store())
        .add_component(&kanban_id, &component)
        .await?;
    Ok(success(Modified { modified }))
}

/// POST /kanban/component/update - replaces the matching component, no-op without a match
async fn update_component(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<ComponentRequest>,
) -> Result<Json<Envelope<Modified>>, ApiError> {
    let (kanban_id, component) = req.into_parts()?;
    let modified = BoardRepo::new(state.store())
        .update_component(&kanban_id, &component)
        .await?;
    Ok(success(Modified { modified }))
}

/// POST /kanban/component/delete
async fn delete_component(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<DeleteComponentRequest>,
) -> Result<Json<Envelope<Modified>>, ApiError> {
    let kanban_id = require(req.kanban_id, "kanbanId")?;
    let component_id = require(req.component_id, "componentId")?;
    let modified = BoardRepo::new(state.store())
        .delete_component(&kanban_id, &component_id)
        .await?;
    Ok(success(Modified { modified }))
}

/// Kanban routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/kanban/list", get(list_boards))
        .route("/kanban/add", post(add_board))
        .route("/kanban/update", post(update_board))
        .route("/kanban/delete", post(delete_board))
        .route("/kanban/component/add", post(add_component))
        .route("/kanban/component/update", post(update_component))
        .route("/kanban/component/delete", post(delete_component))
        .route("/kanban/{kanban_id}", get(get_board))
}
