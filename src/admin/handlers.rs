use std::path::PathBuf;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::config::loader::save_site_mode;
use crate::config::validation::validate_site_mode;
use crate::config::{SessionScheme, SiteModeConfig};
use crate::error::AppError;
use crate::gate::SiteState;
use crate::http::server::AppState;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub site_state: &'static str,
    pub site_mode_available: bool,
    pub session_scheme: SessionScheme,
    pub active_sessions: usize,
    pub rate_limited_clients: usize,
}

/// Current site mode as seen by the gate.
#[derive(Debug, Serialize, Deserialize)]
pub struct SiteModeView {
    /// False when the configuration could not be read; the gate then runs
    /// in normal mode.
    pub available: bool,
    pub state: String,
    pub mode: Option<SiteModeConfig>,
}

/// Partial site-mode update; absent fields keep their current value.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SiteModeUpdate {
    pub enabled: Option<bool>,
    pub redirect_path: Option<String>,
    pub allowed_prefixes: Option<Vec<String>>,
}

impl SiteModeUpdate {
    fn apply(self, mut mode: SiteModeConfig) -> SiteModeConfig {
        if let Some(enabled) = self.enabled {
            mode.enabled = enabled;
        }
        if let Some(redirect_path) = self.redirect_path {
            mode.redirect_path = redirect_path;
        }
        if let Some(prefixes) = self.allowed_prefixes {
            mode.allowed_prefixes = prefixes;
        }
        mode
    }
}

fn state_name(state: SiteState) -> &'static str {
    match state {
        SiteState::Normal => "normal",
        SiteState::Construction => "construction",
    }
}

fn site_mode_view(state: &AppState) -> SiteModeView {
    match state.site_mode.snapshot() {
        Ok(snapshot) => SiteModeView {
            available: true,
            state: state_name(SiteState::of(&snapshot)).to_string(),
            mode: Some(snapshot.mode.clone()),
        },
        Err(_) => SiteModeView {
            available: false,
            state: state_name(SiteState::Normal).to_string(),
            mode: None,
        },
    }
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    let (site_state, available) = match state.site_mode.snapshot() {
        Ok(snapshot) => (SiteState::of(&snapshot), true),
        Err(_) => (SiteState::Normal, false),
    };
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        site_state: state_name(site_state),
        site_mode_available: available,
        session_scheme: state.sessions.scheme(),
        active_sessions: state.sessions.active_sessions(),
        rate_limited_clients: state.login_limiter.tracked_clients(),
    })
}

pub async fn get_site_mode(State(state): State<AppState>) -> Json<SiteModeView> {
    Json(site_mode_view(&state))
}

pub async fn update_site_mode(
    State(state): State<AppState>,
    payload: Result<Json<SiteModeUpdate>, JsonRejection>,
) -> Result<Json<SiteModeView>, AppError> {
    let Json(update) = payload.map_err(|e| AppError::MalformedRequest(e.body_text()))?;

    let current = state
        .site_mode
        .snapshot()
        .map(|snapshot| snapshot.mode.clone())
        .unwrap_or_default();
    let next = update.apply(current);

    validate_site_mode(&next).map_err(|errors| {
        AppError::MalformedRequest(
            errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", "),
        )
    })?;

    if let Some(path) = &state.config.site_mode_file {
        let path = PathBuf::from(path);
        let to_save = next.clone();
        tokio::task::spawn_blocking(move || save_site_mode(&path, &to_save))
            .await
            .map_err(|e| AppError::Internal(format!("site mode save task failed: {e}")))?
            .map_err(|e| AppError::Internal(format!("failed to save site mode: {e}")))?;
    }

    state.site_mode.replace(next);
    Ok(Json(site_mode_view(&state)))
}
