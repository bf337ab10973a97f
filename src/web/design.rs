// Design API: recent tacos, taco creation, ingredient listing

use anyhow::anyhow;
use axum::{extract::State, http::StatusCode, Json};
use tracing::info;

use super::{ApiError, AppState};
use crate::entities::{Ingredient, Taco};
use crate::repository::taco::RECENT_PAGE_SIZE;
use crate::repository::{IngredientRepository, TacoRepository};

/// GET /design/recent - newest tacos first, one fixed-size page
pub async fn recent_tacos(State(state): State<AppState>) -> Result<Json<Vec<Taco>>, ApiError> {
    let conn = state.db.lock();
    let tacos = TacoRepository::new(&conn).find_recent(RECENT_PAGE_SIZE)?;
    Ok(Json(tacos))
}

/// POST /design - store a taco, answer with the row as read back
pub async fn post_taco(
    State(state): State<AppState>,
    Json(taco): Json<Taco>,
) -> Result<(StatusCode, Json<Taco>), ApiError> {
    let conn = state.db.lock();
    let repo = TacoRepository::new(&conn);

    let saved = repo.save(taco)?;
    let stored = match saved.id {
        Some(id) => repo.find_by_id(id)?,
        None => None,
    }
    .ok_or_else(|| anyhow!("taco {:?} missing after save", saved.id))?;

    info!(taco_id = ?stored.id, name = %stored.name, "taco designed");
    Ok((StatusCode::CREATED, Json(stored)))
}

/// GET /ingredients - every known ingredient, ordered by id
pub async fn all_ingredients(
    State(state): State<AppState>,
) -> Result<Json<Vec<Ingredient>>, ApiError> {
    let conn = state.db.lock();
    let ingredients = IngredientRepository::new(&conn).find_all()?;
    Ok(Json(ingredients))
}
