//! HTTP API Layer
//!
//! This crate exposes the settlement engine over REST using Axum. It is
//! stateless: every request carries the group's expenses and gets back the
//! computed settlement.
//!
//! # Architecture
//!
//! - **Handlers**: health and settlement endpoints
//! - **Middleware**: request logging and tracing
//! - **DTOs**: Request/Response data transfer objects
//! - **Error Handling**: Consistent error responses
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState};
//!
//! let state = AppState::new(config)?;
//! axum::serve(listener, create_router(state)).await?;
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod handlers;
pub mod dto;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use domain_settlement::{CalculatorConfig, SettlementCalculator, SettlementError};

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::handlers::{health, settlement};
use crate::middleware::request_logging_middleware;

/// Application state shared across handlers
#[derive(Debug, Clone)]
pub struct AppState {
    pub calculator: SettlementCalculator,
    pub config: ApiConfig,
}

impl AppState {
    /// Builds the state, validating the default calculator settings
    pub fn new(config: ApiConfig) -> Result<Self, SettlementError> {
        let calculator = SettlementCalculator::new(config.settlement)?;
        Ok(Self { calculator, config })
    }

    /// Returns the calculator to use for a request
    pub fn calculator_for(
        &self,
        options: Option<CalculatorConfig>,
    ) -> Result<SettlementCalculator, SettlementError> {
        match options {
            Some(options) => SettlementCalculator::new(options),
            None => Ok(self.calculator.clone()),
        }
    }

    pub fn check_expense_limit(&self, count: usize) -> Result<(), ApiError> {
        let limit = self.config.max_expenses;
        if count > limit {
            return Err(ApiError::TooManyExpenses { count, limit });
        }
        Ok(())
    }
}

/// Creates the main API router
pub fn create_router(state: AppState) -> Router {
    // Public routes
    let public_routes = Router::new().route("/health", get(health::health_check));

    let api_routes = Router::new()
        .route("/balances", post(settlement::calculate_balances))
        .route("/settlements", post(settlement::settle_group))
        .layer(axum_middleware::from_fn(request_logging_middleware));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(
            ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            ),
        )
        .with_state(state)
}
