//! Simple REST API server example for the inventory engine.
//!
//! Run with: `cargo run --example server`
//!
//! ## Endpoints
//!
//! - `POST /deposits` - Record a deposit lot
//! - `POST /withdrawals` - Record a withdrawal (response lists the lots that
//!   funded it and any shortfall)
//! - `GET /stock` - Current stock levels with low-stock flags
//! - `GET /products` - Product key suggestions
//! - `GET /withdrawals/:id/allocations` - Which lots funded a withdrawal
//!
//! ## Example Usage
//!
//! ```bash
//! # Deposit
//! curl -X POST http://localhost:3000/deposits \
//!   -H "Content-Type: application/json" \
//!   -d '{"stock_code": "STK-1", "product_name": "Widget", "unit": "pcs", "quantity": "10.00"}'
//!
//! # Withdrawal
//! curl -X POST http://localhost:3000/withdrawals \
//!   -H "Content-Type: application/json" \
//!   -d '{"stock_code": "STK-1", "product_name": "Widget", "unit": "pcs", "quantity": "7.00", "shop": "Main Street"}'
//!
//! # Stock overview
//! curl http://localhost:3000/stock
//! ```

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{Local, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use stocklot::{Engine, LedgerError, WithdrawalId, parse_timestamp};
use tokio::net::TcpListener;

// === Request/Response DTOs ===

/// Request body for recording a deposit lot.
#[derive(Debug, Deserialize)]
pub struct DepositRequest {
    stock_code: String,
    product_name: String,
    unit: String,
    quantity: Decimal,
    /// `YYYY-MM-DD HH:MM:SS`; defaults to now.
    date: Option<String>,
    notes: Option<String>,
}

/// Request body for recording a withdrawal.
#[derive(Debug, Deserialize)]
pub struct WithdrawalRequest {
    stock_code: String,
    product_name: String,
    unit: String,
    quantity: Decimal,
    shop: String,
    date: Option<String>,
    notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DepositResponse {
    pub deposit_id: u64,
}

#[derive(Debug, Serialize)]
pub struct ShareResponse {
    pub deposit_id: u64,
    pub deposit_date: String,
    pub quantity: Decimal,
}

#[derive(Debug, Serialize)]
pub struct WithdrawalResponse {
    pub withdrawal_id: u64,
    pub shares: Vec<ShareResponse>,
    pub shortfall: Decimal,
}

#[derive(Debug, Serialize)]
pub struct StockResponse {
    pub stock_code: String,
    pub product_name: String,
    pub unit: String,
    pub on_hand: Decimal,
    pub last_month_consumption: Decimal,
    pub reorder_needed: bool,
}

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub stock_code: String,
    pub product_name: String,
    pub unit: String,
}

/// Response body for errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

// === Application State ===

/// Shared application state containing the ledger engine.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
}

// === Error Handling ===

/// Wrapper for converting `LedgerError` into HTTP responses.
pub struct AppError(LedgerError);

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        AppError(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self.0 {
            LedgerError::InvalidQuantity => (StatusCode::BAD_REQUEST, "INVALID_QUANTITY"),
            LedgerError::InvalidDate => (StatusCode::BAD_REQUEST, "INVALID_DATE"),
            LedgerError::EmptyOrder => (StatusCode::BAD_REQUEST, "EMPTY_ORDER"),
            LedgerError::UnknownDeposit(_) => (StatusCode::NOT_FOUND, "DEPOSIT_NOT_FOUND"),
            LedgerError::UnknownWithdrawal(_) => (StatusCode::NOT_FOUND, "WITHDRAWAL_NOT_FOUND"),
            LedgerError::UnknownOrder(_) => (StatusCode::NOT_FOUND, "ORDER_NOT_FOUND"),
            LedgerError::DepositInUse { .. } => (StatusCode::CONFLICT, "DEPOSIT_IN_USE"),
            LedgerError::DuplicateOrderNumber(_) => {
                (StatusCode::CONFLICT, "DUPLICATE_ORDER_NUMBER")
            }
            LedgerError::Unavailable => (StatusCode::SERVICE_UNAVAILABLE, "STORAGE_UNAVAILABLE"),
            LedgerError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR"),
        };

        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
                code: code.to_string(),
            }),
        )
            .into_response()
    }
}

fn parse_date_or_now(date: Option<String>) -> Result<NaiveDateTime, AppError> {
    match date {
        Some(value) => parse_timestamp(&value).map_err(AppError::from),
        None => Ok(Local::now().naive_local()),
    }
}

// === Handlers ===

/// POST /deposits - Record a deposit lot.
async fn create_deposit(
    State(state): State<AppState>,
    Json(request): Json<DepositRequest>,
) -> Result<(StatusCode, Json<DepositResponse>), AppError> {
    let key = stocklot::ProductKey::new(request.stock_code, request.product_name, request.unit);
    let date = parse_date_or_now(request.date)?;
    let id = state
        .engine
        .record_deposit(key, request.quantity, date, request.notes)?;
    Ok((StatusCode::CREATED, Json(DepositResponse { deposit_id: id.0 })))
}

/// POST /withdrawals - Record a withdrawal and allocate it.
async fn create_withdrawal(
    State(state): State<AppState>,
    Json(request): Json<WithdrawalRequest>,
) -> Result<(StatusCode, Json<WithdrawalResponse>), AppError> {
    let key = stocklot::ProductKey::new(request.stock_code, request.product_name, request.unit);
    let date = parse_date_or_now(request.date)?;
    let receipt = state.engine.record_withdrawal(
        key,
        request.quantity,
        &request.shop,
        date,
        request.notes,
    )?;

    let shares = receipt
        .shares
        .iter()
        .map(|share| ShareResponse {
            deposit_id: share.deposit_id.0,
            deposit_date: share.deposit_date.format("%Y-%m-%d %H:%M:%S").to_string(),
            quantity: share.quantity,
        })
        .collect();
    Ok((
        StatusCode::CREATED,
        Json(WithdrawalResponse {
            withdrawal_id: receipt.withdrawal_id.0,
            shares,
            shortfall: receipt.shortfall,
        }),
    ))
}

/// GET /stock - Stock levels with low-stock flags.
async fn list_stock(State(state): State<AppState>) -> Result<Json<Vec<StockResponse>>, AppError> {
    let levels = state.engine.stock_levels(Local::now().date_naive())?;
    Ok(Json(
        levels
            .into_iter()
            .map(|level| StockResponse {
                stock_code: level.key.stock_code,
                product_name: level.key.product_name,
                unit: level.key.unit,
                on_hand: level.on_hand,
                last_month_consumption: level.previous_month_consumption,
                reorder_needed: level.reorder_needed,
            })
            .collect(),
    ))
}

/// GET /products - Product key suggestions.
async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProductResponse>>, AppError> {
    let keys = state.engine.suggest_products()?;
    Ok(Json(
        keys.into_iter()
            .map(|key| ProductResponse {
                stock_code: key.stock_code,
                product_name: key.product_name,
                unit: key.unit,
            })
            .collect(),
    ))
}

/// GET /withdrawals/:id/allocations - Which lots funded a withdrawal.
async fn withdrawal_allocations(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Vec<ShareResponse>>, AppError> {
    let shares = state.engine.allocation_detail(WithdrawalId(id))?;
    Ok(Json(
        shares
            .iter()
            .map(|share| ShareResponse {
                deposit_id: share.deposit_id.0,
                deposit_date: share.deposit_date.format("%Y-%m-%d %H:%M:%S").to_string(),
                quantity: share.quantity,
            })
            .collect(),
    ))
}

// === Router ===

fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/deposits", post(create_deposit))
        .route("/withdrawals", post(create_withdrawal))
        .route("/stock", get(list_stock))
        .route("/products", get(list_products))
        .route("/withdrawals/{id}/allocations", get(withdrawal_allocations))
        .with_state(state)
}

// === Main ===

#[tokio::main]
async fn main() {
    let state = AppState {
        engine: Arc::new(Engine::new()),
    };

    let app = create_router(state);

    let listener = TcpListener::bind("127.0.0.1:3000").await.unwrap();
    println!("Inventory API server running on http://127.0.0.1:3000");
    println!();
    println!("Endpoints:");
    println!("  POST /deposits                     - Record a deposit lot");
    println!("  POST /withdrawals                  - Record a withdrawal");
    println!("  GET  /stock                        - Stock levels");
    println!("  GET  /products                     - Product suggestions");
    println!("  GET  /withdrawals/:id/allocations  - Allocation detail");

    axum::serve(listener, app).await.unwrap();
}
