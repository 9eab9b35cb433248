//! Campaign API endpoints.
//!
//! Each mutating handler loads the whole document, applies one lifecycle
//! operation, and saves the document back. Nothing is saved when the
//! operation fails.

use crate::auth::middleware::{AppState, AuthSession};
use crate::campaign;
use crate::error::AppError;
use crate::models::{
    CampaignInput, CampaignListResponse, CampaignMutationResponse, CampaignResponse,
    MessageResponse,
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{NaiveDate, Utc};

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// GET /campaigns — List all campaigns in stored order
pub async fn list_campaigns(
    _session: AuthSession,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let campaigns = state.campaigns.load().await?;
    Ok(Json(CampaignListResponse { campaigns }))
}

/// GET /campaigns/{id} — Fetch a single campaign
pub async fn get_campaign(
    _session: AuthSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let campaign = state
        .campaigns
        .load()
        .await?
        .into_iter()
        .find(|c| c.id == id)
        .ok_or_else(|| AppError::NotFound(format!("Campaign '{}' not found", id)))?;

    Ok(Json(CampaignResponse { campaign }))
}

/// POST /campaigns — Create a campaign
pub async fn create_campaign(
    session: AuthSession,
    State(state): State<AppState>,
    payload: Result<Json<CampaignInput>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(input) = payload?;
    let mut campaigns = state.campaigns.load().await?;
    let created = campaign::create(&input, &mut campaigns)?;
    state.campaigns.save(&campaigns).await?;

    tracing::info!(
        action = "campaign_created",
        campaign_id = %created.id,
        address = %session.address,
        "Campaign created"
    );

    Ok((
        StatusCode::CREATED,
        Json(CampaignMutationResponse {
            campaign: created,
            message: "Campaign created successfully".to_string(),
        }),
    ))
}

/// PUT /campaigns/{id} — Update a campaign within its lifecycle rules
pub async fn update_campaign(
    session: AuthSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<CampaignInput>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(input) = payload?;
    let mut campaigns = state.campaigns.load().await?;
    let updated = campaign::update(&id, &input, &mut campaigns, today())?;
    state.campaigns.save(&campaigns).await?;

    tracing::info!(
        action = "campaign_updated",
        campaign_id = %updated.id,
        status = %updated.status,
        address = %session.address,
        "Campaign updated"
    );

    Ok(Json(CampaignMutationResponse {
        campaign: updated,
        message: "Campaign updated successfully".to_string(),
    }))
}

/// DELETE /campaigns/{id} — Delete a campaign that has not started
pub async fn delete_campaign(
    session: AuthSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let mut campaigns = state.campaigns.load().await?;
    let removed = campaign::delete(&id, &mut campaigns, today())?;
    state.campaigns.save(&campaigns).await?;

    tracing::info!(
        action = "campaign_deleted",
        campaign_id = %removed.id,
        address = %session.address,
        "Campaign deleted"
    );

    Ok(Json(MessageResponse {
        message: "Campaign deleted successfully".to_string(),
    }))
}
