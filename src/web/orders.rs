use anyhow::anyhow;
use axum::{extract::State, http::StatusCode, Extension, Json};
use tracing::info;

use super::{ApiError, AppState};
use crate::entities::TacoOrder;
use crate::repository::OrderRepository;
use crate::security::Principal;

/// POST /orders - place an order for already-designed tacos
///
/// Tacos only need their id; the response carries them as stored.
pub async fn post_order(
    State(state): State<AppState>,
    principal: Option<Extension<Principal>>,
    Json(order): Json<TacoOrder>,
) -> Result<(StatusCode, Json<TacoOrder>), ApiError> {
    let conn = state.db.lock();
    let repo = OrderRepository::new(&conn);

    let saved = repo.save(order)?;
    let stored = match saved.id {
        Some(id) => repo.find_by_id(id)?,
        None => None,
    }
    .ok_or_else(|| anyhow!("order {:?} missing after save", saved.id))?;

    info!(
        order_id = ?stored.id,
        user = principal.as_ref().map(|Extension(p)| p.username.as_str()).unwrap_or("-"),
        "order received"
    );
    Ok((StatusCode::CREATED, Json(stored)))
}
