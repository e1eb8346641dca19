//! Order route handlers. Every handler requires a bearer token.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    response::Response,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use enzi_core::{MenuItemId, OrderId, ProposedOrder, ProposedOrderLine, Quantity};

use crate::error::{AppError, ErrorCode, Result};
use crate::middleware::RequireAuth;
use crate::models::{DailySummary, Identity, Order, OrderView, Pagination};
use crate::state::AppState;

use super::ApiResponse;

const DEFAULT_PAGE: u32 = 1;
const DEFAULT_LIMIT: u32 = 10;
const MAX_LIMIT: u32 = 100;

/// One line of a submitted order, as the cart sends it.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OrderItemRequest {
    pub id: i64,
    pub quantity: i64,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

/// Body of `POST /api/orders`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateOrderRequest {
    pub items: Vec<OrderItemRequest>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    pub item_count: i64,
}

impl TryFrom<CreateOrderRequest> for ProposedOrder {
    type Error = Vec<String>;

    /// Shape checks only; catalog agreement is decided by reconciliation.
    fn try_from(req: CreateOrderRequest) -> std::result::Result<Self, Self::Error> {
        let mut problems = Vec::new();

        if req.items.is_empty() {
            problems.push("Order must contain at least one item".to_owned());
        }

        let mut lines = Vec::with_capacity(req.items.len());
        for (index, item) in req.items.into_iter().enumerate() {
            let item_id = i32::try_from(item.id).ok().filter(|id| *id > 0);
            if item_id.is_none() {
                problems.push(format!("items[{index}].id must be a positive integer"));
            }
            let quantity = Quantity::new(item.quantity)
                .map_err(|e| problems.push(format!("items[{index}].quantity: {e}")))
                .ok();
            if item.name.is_empty() {
                problems.push(format!("items[{index}].name must not be empty"));
            }
            if item.price <= Decimal::ZERO {
                problems.push(format!("items[{index}].price must be positive"));
            }

            if let (Some(item_id), Some(quantity)) = (item_id, quantity) {
                lines.push(ProposedOrderLine {
                    item_id: MenuItemId::new(item_id),
                    quantity,
                    claimed_name: item.name,
                    claimed_price: item.price,
                });
            }
        }

        if req.total_amount <= Decimal::ZERO {
            problems.push("totalAmount must be positive".to_owned());
        }
        let claimed_item_count = i32::try_from(req.item_count).ok().filter(|n| *n > 0);
        if claimed_item_count.is_none() {
            problems.push("itemCount must be a positive integer".to_owned());
        }

        match claimed_item_count {
            Some(claimed_item_count) if problems.is_empty() => Ok(Self {
                lines,
                claimed_total: req.total_amount,
                claimed_item_count,
            }),
            _ => Err(problems),
        }
    }
}

/// Query string for the order listing. Values are parsed leniently.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    page: Option<String>,
    limit: Option<String>,
}

impl ListParams {
    /// `(page, limit)`; missing, non-numeric or non-positive values fall back
    /// to the defaults and `limit` is capped.
    fn resolve(&self) -> (u32, u32) {
        let positive = |raw: Option<&String>| {
            raw.and_then(|s| s.trim().parse::<u32>().ok())
                .filter(|n| *n > 0)
        };
        let page = positive(self.page.as_ref()).unwrap_or(DEFAULT_PAGE);
        let limit = positive(self.limit.as_ref())
            .unwrap_or(DEFAULT_LIMIT)
            .min(MAX_LIMIT);
        (page, limit)
    }
}

#[derive(Serialize)]
struct OrderData {
    order: OrderView,
}

#[derive(Serialize)]
struct OrderListData {
    orders: Vec<OrderView>,
    pagination: Pagination,
}

#[derive(Serialize)]
struct DailyData {
    orders: Vec<OrderView>,
    summary: DailySummary,
}

fn views(orders: Vec<Order>, owner: &Identity) -> Vec<OrderView> {
    orders.into_iter().map(|o| o.view(owner)).collect()
}

fn invalid_order(errors: Vec<String>) -> AppError {
    AppError::BadRequest {
        code: ErrorCode::InvalidOrderData,
        message: "Invalid order data".to_owned(),
        errors: Some(errors),
    }
}

/// Place an order for the caller.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(identity): RequireAuth,
    payload: std::result::Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<Response> {
    let Json(request) = payload
        .map_err(|e| AppError::from_json_rejection(&e, |text| invalid_order(vec![text])))?;
    let proposed = ProposedOrder::try_from(request).map_err(invalid_order)?;

    let order = state.orders().place(&identity, &proposed).await?;

    Ok(ApiResponse::created(
        "Order created successfully",
        OrderData {
            order: order.view(&identity),
        },
    ))
}

/// The caller's orders, newest first.
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(identity): RequireAuth,
    Query(params): Query<ListParams>,
) -> Result<Response> {
    let (page, limit) = params.resolve();
    let (orders, pagination) = state.orders().list(&identity, page, limit).await?;

    Ok(ApiResponse::ok(
        "User orders retrieved successfully",
        OrderListData {
            orders: views(orders, &identity),
            pagination,
        },
    ))
}

/// The caller's orders for the current server-local day.
pub async fn daily(
    State(state): State<AppState>,
    RequireAuth(identity): RequireAuth,
) -> Result<Response> {
    let (orders, summary) = state.orders().today(&identity).await?;

    Ok(ApiResponse::ok(
        "Today's orders retrieved successfully",
        DailyData {
            orders: views(orders, &identity),
            summary,
        },
    ))
}

/// One of the caller's orders. Unknown, malformed and foreign ids all 404.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(identity): RequireAuth,
    Path(id): Path<String>,
) -> Result<Response> {
    let not_found = || AppError::not_found(ErrorCode::OrderNotFound, "Order not found");

    let id: OrderId = id.parse().map_err(|_| not_found())?;
    let order = state
        .orders()
        .find(&identity, id)
        .await?
        .ok_or_else(not_found)?;

    Ok(ApiResponse::ok(
        "Order retrieved successfully",
        OrderData {
            order: order.view(&identity),
        },
    ))
}
