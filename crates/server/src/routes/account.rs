//! The administrator's own data: system settings, profile and UI preferences.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde::Deserialize;

use models::preferences::UiPreferences;
use models::profile::{PasswordChangeInput, ProfileUpdateInput, UserProfile};
use models::settings::{SettingsPatch, SystemSettings};
use service::auth::domain::Claims;

use crate::errors::ApiError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/settings", get(get_settings).put(save_settings))
        .route("/settings/reset", post(reset_settings))
        .route("/profile", get(get_profile).put(update_profile))
        .route("/profile/avatar", put(update_avatar))
        .route("/profile/password", post(change_password))
        .route("/preferences", get(get_preferences).put(set_preferences))
        .route("/preferences/theme/toggle", post(toggle_theme))
}

async fn get_settings(State(state): State<AppState>) -> Json<SystemSettings> {
    Json(state.settings.get().await)
}

async fn save_settings(
    State(state): State<AppState>,
    Json(patch): Json<SettingsPatch>,
) -> Result<Json<SystemSettings>, ApiError> {
    Ok(Json(state.settings.save(patch).await?))
}

async fn reset_settings(State(state): State<AppState>) -> Result<Json<SystemSettings>, ApiError> {
    Ok(Json(state.settings.reset().await?))
}

async fn get_profile(State(state): State<AppState>) -> Json<UserProfile> {
    Json(state.profile.get().await)
}

async fn update_profile(
    State(state): State<AppState>,
    Json(input): Json<ProfileUpdateInput>,
) -> Result<Json<UserProfile>, ApiError> {
    Ok(Json(state.profile.update(input).await?))
}

#[derive(Debug, Deserialize)]
pub struct AvatarInput {
    #[serde(default)]
    pub avatar: Option<String>,
}

async fn update_avatar(
    State(state): State<AppState>,
    Json(input): Json<AvatarInput>,
) -> Result<Json<UserProfile>, ApiError> {
    Ok(Json(state.profile.update_avatar(input.avatar).await?))
}

async fn change_password(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(input): Json<PasswordChangeInput>,
) -> Result<StatusCode, ApiError> {
    state.profile.change_password(claims.uid, input).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_preferences(State(state): State<AppState>) -> Json<UiPreferences> {
    Json(state.preferences.get().await)
}

async fn set_preferences(
    State(state): State<AppState>,
    Json(prefs): Json<UiPreferences>,
) -> Result<Json<UiPreferences>, ApiError> {
    Ok(Json(state.preferences.set(prefs).await?))
}

async fn toggle_theme(State(state): State<AppState>) -> Result<Json<UiPreferences>, ApiError> {
    Ok(Json(state.preferences.toggle_theme().await?))
}
