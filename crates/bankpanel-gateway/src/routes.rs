//! API route handlers for the gateway.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use bankpanel_core::types::{BankDetail, BankDetailInput, Profile, Role, StaffFilter};
use bankpanel_platform::{AdminOverview, Caller, NewStaff, Session, StaffDashboard};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::{ApiError, ApiResult};
use crate::extract::Authenticated;
use crate::server::AppState;

/// Health check endpoint.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "bankpanel-gateway",
        "version": env!("CARGO_PKG_VERSION"),
        "backend": state.backend_name,
        "uptime_secs": state.start_time.elapsed().as_secs(),
    }))
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::method_not_allowed()
}

// ── Provisioning ────────────────────────────────────

/// Create a staff member: identity first, then the linked profile.
pub async fn create_staff(
    State(state): State<Arc<AppState>>,
    auth: Authenticated,
    payload: Result<Json<NewStaff>, JsonRejection>,
) -> ApiResult<Json<serde_json::Value>> {
    auth.require(Role::Admin)?;
    let Json(req) = payload?;
    let done = state.admin.create_staff(req).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": done.message,
        "userId": done.user_id,
    })))
}

// ── Sessions ────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<Session>> {
    let Json(req) = payload?;
    Ok(Json(state.sessions.sign_in(&req.email, &req.password).await?))
}

/// Current profile and the dashboard it should see.
pub async fn me(Authenticated(caller): Authenticated) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "profile": caller.profile,
        "view": caller.view(),
    }))
}

// ── Admin dashboard ────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct StaffQuery {
    pub staff_id: Option<String>,
}

pub async fn admin_staff(
    State(state): State<Arc<AppState>>,
    auth: Authenticated,
) -> ApiResult<Json<Vec<Profile>>> {
    auth.require(Role::Admin)?;
    Ok(Json(state.admin.staff().await?))
}

pub async fn admin_bank_details(
    State(state): State<Arc<AppState>>,
    auth: Authenticated,
    query: Result<Query<StaffQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<BankDetail>>> {
    auth.require(Role::Admin)?;
    let Query(q) = query?;
    let filter = StaffFilter::from_param(q.staff_id.as_deref());
    Ok(Json(state.admin.bank_details(&filter).await?))
}

pub async fn admin_overview(
    State(state): State<Arc<AppState>>,
    auth: Authenticated,
    query: Result<Query<StaffQuery>, QueryRejection>,
) -> ApiResult<Json<AdminOverview>> {
    auth.require(Role::Admin)?;
    let Query(q) = query?;
    let filter = StaffFilter::from_param(q.staff_id.as_deref());
    Ok(Json(state.admin.overview(&filter).await?))
}

// ── Staff dashboard ────────────────────────────────────

fn staff_dashboard(state: &AppState, caller: Caller) -> StaffDashboard {
    StaffDashboard::new(state.store.clone(), caller.profile)
}

pub async fn list_bank_details(
    State(state): State<Arc<AppState>>,
    auth: Authenticated,
) -> ApiResult<Json<Vec<BankDetail>>> {
    let caller = auth.require(Role::Staff)?;
    Ok(Json(staff_dashboard(&state, caller).list().await?))
}

pub async fn create_bank_detail(
    State(state): State<Arc<AppState>>,
    auth: Authenticated,
    payload: Result<Json<BankDetailInput>, JsonRejection>,
) -> ApiResult<Json<Vec<BankDetail>>> {
    let caller = auth.require(Role::Staff)?;
    let Json(input) = payload?;
    Ok(Json(staff_dashboard(&state, caller).create(input).await?))
}

pub async fn update_bank_detail(
    State(state): State<Arc<AppState>>,
    auth: Authenticated,
    path: Result<Path<String>, PathRejection>,
    payload: Result<Json<BankDetailInput>, JsonRejection>,
) -> ApiResult<Json<Vec<BankDetail>>> {
    let caller = auth.require(Role::Staff)?;
    let Path(id) = path?;
    let Json(input) = payload?;
    Ok(Json(staff_dashboard(&state, caller).update(&id, input).await?))
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteQuery {
    #[serde(default)]
    pub confirm: bool,
}

pub async fn delete_bank_detail(
    State(state): State<Arc<AppState>>,
    auth: Authenticated,
    path: Result<Path<String>, PathRejection>,
    query: Result<Query<DeleteQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<BankDetail>>> {
    let caller = auth.require(Role::Staff)?;
    let Path(id) = path?;
    let Query(q) = query?;
    Ok(Json(staff_dashboard(&state, caller).delete(&id, q.confirm).await?))
}
