//! Quotation handlers: thin adapters over the workflow.
//!
//! All authorization and business rules live in
//! [`crate::workflow::QuotationWorkflow`]; handlers only extract and shape.

use axum::extract::{Path, Query, State};
use axum::Json;

use meridian_core::Quotation;

use crate::auth::AuthUser;
use crate::dto::{
    ApproveQuotationBody, MarkReadBody, MarkReadResponse, NotificationsResponse,
    PendingCountResponse, QuotationDetail, QuotationListQuery, RejectQuotationBody,
    RequestQuotationBody, SetMarginBody, UpdateQuotationBody,
};
use crate::error::ApiError;
use crate::AppState;

/// POST /api/quotations/request
pub async fn request(
    State(state): State<AppState>,
    actor: AuthUser,
    Json(body): Json<RequestQuotationBody>,
) -> Result<Json<QuotationDetail>, ApiError> {
    Ok(Json(state.workflow.request(&actor, body).await?))
}

/// POST /api/quotations/{id}/approve
pub async fn approve(
    State(state): State<AppState>,
    actor: AuthUser,
    Path(id): Path<String>,
    Json(body): Json<ApproveQuotationBody>,
) -> Result<Json<QuotationDetail>, ApiError> {
    Ok(Json(state.workflow.approve(&actor, &id, body).await?))
}

/// POST /api/quotations/{id}/reject
pub async fn reject(
    State(state): State<AppState>,
    actor: AuthUser,
    Path(id): Path<String>,
    Json(body): Json<RejectQuotationBody>,
) -> Result<Json<QuotationDetail>, ApiError> {
    Ok(Json(state.workflow.reject(&actor, &id, body).await?))
}

/// PUT /api/quotations/{id}
pub async fn update(
    State(state): State<AppState>,
    actor: AuthUser,
    Path(id): Path<String>,
    Json(body): Json<UpdateQuotationBody>,
) -> Result<Json<QuotationDetail>, ApiError> {
    Ok(Json(state.workflow.update_pending(&actor, &id, body).await?))
}

/// PUT /api/quotations/{id}/margin
pub async fn set_margin(
    State(state): State<AppState>,
    actor: AuthUser,
    Path(id): Path<String>,
    Json(body): Json<SetMarginBody>,
) -> Result<Json<QuotationDetail>, ApiError> {
    Ok(Json(state.workflow.set_margin(&actor, &id, body).await?))
}

/// GET /api/quotations
pub async fn list(
    State(state): State<AppState>,
    actor: AuthUser,
    Query(query): Query<QuotationListQuery>,
) -> Result<Json<Vec<Quotation>>, ApiError> {
    Ok(Json(state.workflow.list(&actor, query.status).await?))
}

/// GET /api/quotations/deal/{deal_id}
pub async fn list_for_deal(
    State(state): State<AppState>,
    _actor: AuthUser,
    Path(deal_id): Path<String>,
) -> Result<Json<Vec<Quotation>>, ApiError> {
    Ok(Json(state.workflow.list_for_deal(&deal_id).await?))
}

/// GET /api/quotations/{id}
pub async fn get(
    State(state): State<AppState>,
    _actor: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<QuotationDetail>, ApiError> {
    Ok(Json(state.workflow.get_detail(&id).await?))
}

/// GET /api/quotations/stats/pending-count
pub async fn pending_count(
    State(state): State<AppState>,
    actor: AuthUser,
) -> Result<Json<PendingCountResponse>, ApiError> {
    let pending = state.workflow.pending_count(&actor).await?;
    Ok(Json(PendingCountResponse { pending }))
}

/// GET /api/quotations/stats/notifications
pub async fn notifications(
    State(state): State<AppState>,
    actor: AuthUser,
) -> Result<Json<NotificationsResponse>, ApiError> {
    Ok(Json(state.workflow.notifications(&actor).await?))
}

/// PUT /api/quotations/stats/mark-read
pub async fn mark_read(
    State(state): State<AppState>,
    actor: AuthUser,
    Json(body): Json<MarkReadBody>,
) -> Result<Json<MarkReadResponse>, ApiError> {
    Ok(Json(state.workflow.mark_read(&actor, body).await?))
}
