//! Cost sheet handlers.
//!
//! The summary is recomputed server-side on every save; the client never
//! submits totals. Versioning semantics live in the repository.

use axum::extract::{Path, State};
use axum::Json;
use tracing::info;

use meridian_core::costsheet::{aggregate, CostSheet};
use meridian_core::validation::validate_price_paise;
use meridian_core::Money;
use meridian_db::repository::cost_sheet::CostSheetDraft;

use crate::auth::AuthUser;
use crate::dto::SaveCostSheetBody;
use crate::error::ApiError;
use crate::AppState;

/// PUT /api/cost-sheets/deal/{deal_id}
///
/// Saves the deal's cost sheet: in place by default, as a new version when
/// `create_new_version` is set.
pub async fn save(
    State(state): State<AppState>,
    actor: AuthUser,
    Path(deal_id): Path<String>,
    Json(body): Json<SaveCostSheetBody>,
) -> Result<Json<CostSheet>, ApiError> {
    state
        .db
        .deals()
        .get_by_id(&deal_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Deal", &deal_id))?;

    validate_price_paise("revenue", body.revenue_paise)?;

    let summary = aggregate(
        Money::from_paise(body.revenue_paise),
        &body.products,
        &body.manpower,
        &body.overheads,
        &body.custom_charges,
    );

    let draft = CostSheetDraft {
        revenue_paise: body.revenue_paise,
        products: body.products,
        manpower: body.manpower,
        overheads: body.overheads,
        custom_charges: body.custom_charges,
        summary,
    };

    let sheet = state
        .db
        .cost_sheets()
        .save(&deal_id, draft, body.create_new_version)
        .await?;

    info!(
        deal_id = %deal_id,
        version = sheet.version,
        branched = body.create_new_version,
        saved_by = %actor.id,
        "Cost sheet saved"
    );

    Ok(Json(sheet))
}

/// GET /api/cost-sheets/deal/{deal_id}
pub async fn get_latest(
    State(state): State<AppState>,
    _actor: AuthUser,
    Path(deal_id): Path<String>,
) -> Result<Json<CostSheet>, ApiError> {
    let sheet = state
        .db
        .cost_sheets()
        .get_latest(&deal_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Cost sheet for deal", &deal_id))?;
    Ok(Json(sheet))
}

/// GET /api/cost-sheets/deal/{deal_id}/versions
pub async fn list_versions(
    State(state): State<AppState>,
    _actor: AuthUser,
    Path(deal_id): Path<String>,
) -> Result<Json<Vec<CostSheet>>, ApiError> {
    Ok(Json(state.db.cost_sheets().list_versions(&deal_id).await?))
}
