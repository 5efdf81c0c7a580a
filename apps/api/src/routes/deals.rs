//! Deal handlers: pipeline CRUD.
//!
//! Deletion is deliberately absent; deals only move through stages.

use axum::extract::{Path, Query, State};
use axum::Json;
use tracing::info;

use meridian_core::validation::{validate_customer_name, validate_price_paise};
use meridian_core::Deal;
use meridian_db::repository::deal::NewDeal;

use crate::auth::AuthUser;
use crate::dto::{CreateDealBody, DealListQuery, UpdateDealStageBody};
use crate::error::ApiError;
use crate::AppState;

/// Creates a deal with a generated `OPP-YYMMDD-NNNN` number.
pub async fn create(
    State(state): State<AppState>,
    actor: AuthUser,
    Json(body): Json<CreateDealBody>,
) -> Result<Json<Deal>, ApiError> {
    validate_customer_name(&body.customer_name)?;
    validate_price_paise("expected_revenue", body.expected_revenue_paise)?;

    let assigned_to = body.assigned_to.unwrap_or_else(|| actor.id.clone());

    let deal = state
        .db
        .deals()
        .create(NewDeal {
            customer_name: body.customer_name.trim().to_string(),
            contact_name: body.contact_name,
            contact_email: body.contact_email,
            contact_phone: body.contact_phone,
            address: body.address,
            oem: body.oem,
            expected_revenue_paise: body.expected_revenue_paise,
            expected_margin_paise: body.expected_margin_paise,
            stage: body.stage,
            assigned_to,
        })
        .await?;

    info!(deal_id = %deal.id, deal_number = %deal.deal_number, created_by = %actor.id, "Deal created");

    Ok(Json(deal))
}

/// Lists deals, optionally filtered by stage and/or assignee.
pub async fn list(
    State(state): State<AppState>,
    _actor: AuthUser,
    Query(query): Query<DealListQuery>,
) -> Result<Json<Vec<Deal>>, ApiError> {
    let deals = state
        .db
        .deals()
        .list(query.stage, query.assigned_to.as_deref())
        .await?;
    Ok(Json(deals))
}

/// Fetches one deal.
pub async fn get(
    State(state): State<AppState>,
    _actor: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Deal>, ApiError> {
    let deal = state
        .db
        .deals()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Deal", &id))?;
    Ok(Json(deal))
}

/// Moves a deal to a new pipeline stage.
pub async fn update_stage(
    State(state): State<AppState>,
    actor: AuthUser,
    Path(id): Path<String>,
    Json(body): Json<UpdateDealStageBody>,
) -> Result<Json<Deal>, ApiError> {
    state.db.deals().update_stage(&id, body.stage).await?;

    info!(deal_id = %id, stage = ?body.stage, moved_by = %actor.id, "Deal stage updated");

    let deal = state
        .db
        .deals()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Deal", &id))?;
    Ok(Json(deal))
}
