//! CRUD and reorder handlers for sections, links, widgets and settings.
//!
//! Every handler performs a whole-document read, an in-memory mutation and a
//! whole-document rewrite. Not found maps to 404; store I/O errors to 500.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::server::AppState;
use crate::store::{Section, Settings};

type ApiResult<T> = Result<Json<T>, (StatusCode, String)>;

fn store_error(e: anyhow::Error) -> (StatusCode, String) {
    tracing::error!("Store error: {}", e);
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

fn not_found(what: &str) -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, format!("{} not found", what))
}

#[derive(Deserialize)]
pub struct IdQuery {
    pub id: String,
}

// === Settings ===

pub async fn get_settings(State(state): State<Arc<AppState>>) -> ApiResult<Settings> {
    let data = state.store.load().map_err(store_error)?;
    Ok(Json(data.settings))
}

pub async fn put_settings(
    State(state): State<Arc<AppState>>,
    Json(settings): Json<Settings>,
) -> ApiResult<Value> {
    let mut data = state.store.load().map_err(store_error)?;
    data.settings = settings;
    state.store.save(&data).map_err(store_error)?;
    Ok(Json(json!({ "success": true })))
}

// === Sections ===

#[derive(Deserialize)]
pub struct CreateSection {
    pub title: String,
    pub icon: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateSection {
    pub id: String,
    pub title: String,
    pub icon: Option<String>,
}

#[derive(Deserialize)]
pub struct ReorderSections {
    pub order: Vec<String>,
}

pub async fn list_sections(State(state): State<Arc<AppState>>) -> ApiResult<Vec<Section>> {
    let data = state.store.load().map_err(store_error)?;
    Ok(Json(data.sections))
}

pub async fn create_section(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateSection>,
) -> ApiResult<Section> {
    let mut data = state.store.load().map_err(store_error)?;
    let section = data.add_section(body.title, body.icon);
    state.store.save(&data).map_err(store_error)?;
    info!("Section added, now {} section(s)", data.sections.len());
    Ok(Json(section))
}

pub async fn update_section(
    State(state): State<Arc<AppState>>,
    Json(body): Json<UpdateSection>,
) -> ApiResult<Section> {
    let mut data = state.store.load().map_err(store_error)?;
    let section = data
        .update_section(&body.id, body.title, body.icon)
        .ok_or_else(|| not_found("Section"))?;
    state.store.save(&data).map_err(store_error)?;
    Ok(Json(section))
}

pub async fn delete_section(
    State(state): State<Arc<AppState>>,
    Query(query): Query<IdQuery>,
) -> ApiResult<Value> {
    let mut data = state.store.load().map_err(store_error)?;
    data.remove_section(&query.id);
    state.store.save(&data).map_err(store_error)?;
    info!("Section removed, now {} section(s)", data.sections.len());
    Ok(Json(json!({ "success": true })))
}

pub async fn reorder_sections(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ReorderSections>,
) -> ApiResult<Value> {
    let mut data = state.store.load().map_err(store_error)?;
    data.reorder_sections(&body.order);
    state.store.save(&data).map_err(store_error)?;
    Ok(Json(json!({ "success": true })))
}

// === Links ===

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLink {
    pub section_id: String,
    pub label: String,
    pub url: String,
    pub icon: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateLink {
    pub id: String,
    pub label: Option<String>,
    pub url: Option<String>,
    pub icon: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderInSection {
    pub section_id: String,
    pub order: Vec<String>,
}

pub async fn create_link(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateLink>,
) -> ApiResult<crate::store::Link> {
    let mut data = state.store.load().map_err(store_error)?;
    let link = data
        .add_link(&body.section_id, body.label, body.url, body.icon)
        .ok_or_else(|| not_found("Section"))?;
    state.store.save(&data).map_err(store_error)?;
    Ok(Json(link))
}

pub async fn update_link(
    State(state): State<Arc<AppState>>,
    Json(body): Json<UpdateLink>,
) -> ApiResult<crate::store::Link> {
    let mut data = state.store.load().map_err(store_error)?;
    let link = data
        .update_link(&body.id, body.label, body.url, body.icon)
        .ok_or_else(|| not_found("Link"))?;
    state.store.save(&data).map_err(store_error)?;
    Ok(Json(link))
}

pub async fn delete_link(
    State(state): State<Arc<AppState>>,
    Query(query): Query<IdQuery>,
) -> ApiResult<Value> {
    let mut data = state.store.load().map_err(store_error)?;
    data.remove_link(&query.id);
    state.store.save(&data).map_err(store_error)?;
    Ok(Json(json!({ "success": true })))
}

pub async fn reorder_links(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ReorderInSection>,
) -> ApiResult<Value> {
    let mut data = state.store.load().map_err(store_error)?;
    if !data.reorder_links(&body.section_id, &body.order) {
        return Err(not_found("Section"));
    }
    state.store.save(&data).map_err(store_error)?;
    Ok(Json(json!({ "success": true })))
}

// === Widgets ===

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWidget {
    pub section_id: String,
    pub name: String,
    pub props: Option<Value>,
}

pub async fn create_widget(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateWidget>,
) -> ApiResult<crate::store::Widget> {
    let mut data = state.store.load().map_err(store_error)?;
    let widget = data
        .add_widget(&body.section_id, body.name, body.props)
        .ok_or_else(|| not_found("Section"))?;
    state.store.save(&data).map_err(store_error)?;
    Ok(Json(widget))
}

pub async fn delete_widget(
    State(state): State<Arc<AppState>>,
    Query(query): Query<IdQuery>,
) -> ApiResult<Value> {
    let mut data = state.store.load().map_err(store_error)?;
    data.remove_widget(&query.id);
    state.store.save(&data).map_err(store_error)?;
    Ok(Json(json!({ "success": true })))
}

pub async fn reorder_widgets(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ReorderInSection>,
) -> ApiResult<Value> {
    let mut data = state.store.load().map_err(store_error)?;
    if !data.reorder_widgets(&body.section_id, &body.order) {
        return Err(not_found("Section"));
    }
    state.store.save(&data).map_err(store_error)?;
    Ok(Json(json!({ "success": true })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_link_body_uses_camel_case() {
        let body: CreateLink = serde_json::from_str(
            r#"{ "sectionId": "s1", "label": "Grafana", "url": "http://g" }"#,
        )
        .unwrap();
        assert_eq!(body.section_id, "s1");
        assert!(body.icon.is_none());
    }

    #[test]
    fn test_update_link_partial_body() {
        let body: UpdateLink =
            serde_json::from_str(r#"{ "id": "l1", "url": "http://new" }"#).unwrap();
        assert_eq!(body.id, "l1");
        assert!(body.label.is_none());
        assert_eq!(body.url.as_deref(), Some("http://new"));
    }

    #[test]
    fn test_reorder_body_shape() {
        let body: ReorderInSection =
            serde_json::from_str(r#"{ "sectionId": "s1", "order": ["b", "a"] }"#).unwrap();
        assert_eq!(body.order, ["b", "a"]);
    }
}
