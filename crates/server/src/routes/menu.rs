//! Menu route handlers.
//!
//! The catalog is immutable, so these handlers never touch a store and never
//! fail except on malformed input.

use axum::{
    extract::{Path, Query, State},
    response::Response,
};
use serde::{Deserialize, Serialize};

use enzi_core::{Category, MenuItem, MenuItemId};

use crate::error::{AppError, ErrorCode, Result};
use crate::state::AppState;

use super::ApiResponse;

/// Longest accepted search query, in characters.
const MAX_QUERY_LENGTH: usize = 50;

#[derive(Serialize)]
struct ItemsData<'a> {
    items: Vec<&'a MenuItem>,
    total: usize,
}

impl<'a> ItemsData<'a> {
    fn new(items: Vec<&'a MenuItem>) -> Self {
        let total = items.len();
        Self { items, total }
    }
}

#[derive(Serialize)]
struct CategoryData<'a> {
    category: Category,
    #[serde(flatten)]
    items: ItemsData<'a>,
}

#[derive(Serialize)]
struct SearchData<'a> {
    query: String,
    #[serde(flatten)]
    items: ItemsData<'a>,
}

/// Query string for `/search`.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    q: Option<String>,
}

/// All available items.
pub async fn index(State(state): State<AppState>) -> Response {
    ApiResponse::ok(
        "Menu items retrieved successfully",
        ItemsData::new(state.catalog().all_available()),
    )
}

/// All available items.
pub async fn available(State(state): State<AppState>) -> Response {
    ApiResponse::ok(
        "Available menu items retrieved successfully",
        ItemsData::new(state.catalog().all_available()),
    )
}

/// Distinct categories in menu order.
pub async fn categories(State(state): State<AppState>) -> Response {
    ApiResponse::ok(
        "Menu categories retrieved successfully",
        serde_json::json!({ "categories": state.catalog().categories() }),
    )
}

/// Available items in one category.
pub async fn by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Response> {
    let category: Category = category.parse().map_err(|_| {
        AppError::bad_request(ErrorCode::InvalidCategory, "Invalid category parameter")
    })?;

    Ok(ApiResponse::ok(
        format!("Menu items for category '{category}' retrieved successfully"),
        CategoryData {
            category,
            items: ItemsData::new(state.catalog().by_category(category)),
        },
    ))
}

/// One available item by id.
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response> {
    let id = parse_item_id(&id)
        .ok_or_else(|| AppError::bad_request(ErrorCode::InvalidItemId, "Invalid item ID"))?;

    let item = state
        .catalog()
        .get(id)
        .ok_or_else(|| AppError::not_found(ErrorCode::ItemNotFound, "Menu item not found"))?;

    Ok(ApiResponse::ok(
        "Menu item retrieved successfully",
        serde_json::json!({ "item": item }),
    ))
}

/// Case-insensitive name search over available items.
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Response> {
    let query = params
        .q
        .filter(|q| !q.is_empty() && q.chars().count() <= MAX_QUERY_LENGTH)
        .ok_or_else(|| {
            AppError::bad_request(ErrorCode::InvalidSearchQuery, "Invalid search query")
        })?;

    let items = ItemsData::new(state.catalog().search(&query));
    Ok(ApiResponse::ok(
        format!("Search results for '{query}'"),
        SearchData { query, items },
    ))
}

/// Positive integer item id, or `None`.
fn parse_item_id(raw: &str) -> Option<MenuItemId> {
    raw.parse::<i32>()
        .ok()
        .filter(|id| *id > 0)
        .map(MenuItemId::new)
}
