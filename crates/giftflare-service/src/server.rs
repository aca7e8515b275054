//! HTTP server for the Giftflare coordinator API.
//!
//! Exposes the five coordinator operations under /api. Handlers stay
//! thin: they deserialize, call the coordinator, and map errors onto the
//! shared API error vocabulary.

use axum::{
	extract::{Path, State},
	http::StatusCode,
	response::Json,
	routing::{get, post},
	Router,
};
use giftflare_config::ApiConfig;
use giftflare_core::OrderCoordinator;
use giftflare_types::{ApiError, NewOrder, Order, TransitionRequest};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::apis::orders::{api_error_from_booking, api_error_from_lifecycle};

/// Shared application state for the API server.
#[derive(Clone)]
pub struct AppState {
	/// Reference to the coordinator processing requests.
	pub coordinator: Arc<OrderCoordinator>,
}

/// Starts the HTTP server for the API.
pub async fn start_server(
	api_config: ApiConfig,
	coordinator: Arc<OrderCoordinator>,
) -> Result<(), Box<dyn std::error::Error>> {
	let app_state = AppState { coordinator };

	let app = Router::new()
		.nest(
			"/api",
			Router::new()
				.route("/orders", post(handle_create_order))
				.route("/orders/{id}", get(handle_get_order))
				.route("/orders/{id}/transition", post(handle_transition))
				.route("/orders/{id}/book-delivery", post(handle_book_delivery))
				.route("/buyers/{id}/orders", get(handle_list_buyer_orders)),
		)
		.layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
		.with_state(app_state);

	let bind_address = format!("{}:{}", api_config.host, api_config.port);
	let listener = TcpListener::bind(&bind_address).await?;

	tracing::info!("Giftflare API server starting on {}", bind_address);

	axum::serve(listener, app).await?;

	Ok(())
}

/// Handles POST /api/orders requests.
async fn handle_create_order(
	State(state): State<AppState>,
	Json(input): Json<NewOrder>,
) -> Result<(StatusCode, Json<Order>), ApiError> {
	match state.coordinator.create_order(input).await {
		Ok(order) => Ok((StatusCode::CREATED, Json(order))),
		Err(e) => {
			tracing::warn!("Order creation failed: {}", e);
			Err(api_error_from_lifecycle(e))
		}
	}
}

/// Handles GET /api/orders/{id} requests.
async fn handle_get_order(
	Path(id): Path<String>,
	State(state): State<AppState>,
) -> Result<Json<Order>, ApiError> {
	match state.coordinator.get_order(&id).await {
		Ok(order) => Ok(Json(order)),
		Err(e) => {
			tracing::warn!("Order retrieval failed: {}", e);
			Err(api_error_from_lifecycle(e))
		}
	}
}

/// Handles GET /api/buyers/{id}/orders requests.
async fn handle_list_buyer_orders(
	Path(id): Path<String>,
	State(state): State<AppState>,
) -> Result<Json<Vec<Order>>, ApiError> {
	match state.coordinator.list_orders_for_buyer(&id).await {
		Ok(orders) => Ok(Json(orders)),
		Err(e) => {
			tracing::warn!("Order listing failed: {}", e);
			Err(api_error_from_lifecycle(e))
		}
	}
}

/// Handles POST /api/orders/{id}/transition requests.
async fn handle_transition(
	Path(id): Path<String>,
	State(state): State<AppState>,
	Json(request): Json<TransitionRequest>,
) -> Result<Json<Order>, ApiError> {
	match state
		.coordinator
		.transition(&id, request.status, request.tracking_number)
		.await
	{
		Ok(order) => Ok(Json(order)),
		Err(e) => {
			tracing::warn!("Order transition failed: {}", e);
			Err(api_error_from_lifecycle(e))
		}
	}
}

/// Handles POST /api/orders/{id}/book-delivery requests.
async fn handle_book_delivery(
	Path(id): Path<String>,
	State(state): State<AppState>,
) -> Result<Json<Order>, ApiError> {
	match state.coordinator.book_delivery(&id).await {
		Ok(order) => Ok(Json(order)),
		Err(e) => {
			tracing::warn!("Delivery booking failed: {}", e);
			Err(api_error_from_booking(e))
		}
	}
}
