use std::sync::Arc;

use axum::{
    Form, Router,
    extract::{OriginalUri, Path, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use weather_core::{LocationId, Workflows};

use crate::{
    error::{ErrorPage, PageResult},
    render,
};

#[derive(Clone)]
pub struct WebState {
    pub workflows: Arc<Workflows>,
}

pub fn router(state: WebState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/index", get(index))
        .route("/search", get(search_form).post(search_execute))
        .route("/add/:gid", get(add))
        .route("/delete/:id", get(delete))
        .route("/forecast/:id", get(forecast))
        .fallback(not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// `302 Found` back to the location list.
#[derive(Debug, Clone, Copy)]
pub struct ToIndex;

impl IntoResponse for ToIndex {
    fn into_response(self) -> Response {
        (StatusCode::FOUND, [(header::LOCATION, "/index")]).into_response()
    }
}

async fn root() -> ToIndex {
    ToIndex
}

async fn index(State(state): State<WebState>) -> PageResult<Html<String>> {
    let locations = state.workflows.list_with_weather().await?;
    Ok(Html(render::index_page(&locations)))
}

async fn search_form(State(state): State<WebState>) -> Html<String> {
    Html(render::search_page(&state.workflows.search_form()))
}

#[derive(Debug, Deserialize)]
struct SearchForm {
    #[serde(default)]
    query: String,
}

async fn search_execute(
    State(state): State<WebState>,
    Form(form): Form<SearchForm>,
) -> PageResult<Html<String>> {
    let page = state.workflows.search_execute(&form.query).await?;
    Ok(Html(render::search_page(&page)))
}

async fn add(State(state): State<WebState>, Path(gid): Path<String>) -> PageResult<ToIndex> {
    state.workflows.add_location(&gid).await?;
    Ok(ToIndex)
}

async fn delete(State(state): State<WebState>, Path(id): Path<String>) -> PageResult<ToIndex> {
    state
        .workflows
        .delete_location(&LocationId::from(id))
        .await?;
    Ok(ToIndex)
}

async fn forecast(
    State(state): State<WebState>,
    Path(id): Path<String>,
) -> PageResult<Html<String>> {
    let data = state.workflows.forecast(&LocationId::from(id)).await?;
    Ok(Html(render::forecast_page(&data)))
}

async fn not_found(OriginalUri(uri): OriginalUri) -> ErrorPage {
    ErrorPage::not_found(uri.path())
}
