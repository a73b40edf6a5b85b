use axum::{Form, Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::constants::{ACTION_UPDATE_USER_LISTINGS, MSG_SINGLE_FAILED, MSG_SINGLE_UPDATED};
use crate::error::{AppError, Result};
use crate::models::{Capability, coerce_int, parse_user_id};

use super::session::Viewer;

/// Form body posted by the inline updater
#[derive(Debug, Deserialize)]
pub struct AjaxRequest {
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub count: String,
    #[serde(default)]
    pub nonce: String,
}

#[derive(Debug, Serialize)]
pub struct AjaxResponse {
    pub success: bool,
    pub data: String,
}

impl AjaxResponse {
    fn success(message: &str) -> Self {
        Self {
            success: true,
            data: message.to_string(),
        }
    }

    fn error(message: &str) -> Self {
        Self {
            success: false,
            data: message.to_string(),
        }
    }
}

/// POST /admin/ajax
///
/// Dispatches on `action`. Only `update_user_listings` is registered.
pub async fn ajax_dispatch(
    State(state): State<AppState>,
    viewer: Viewer,
    Form(request): Form<AjaxRequest>,
) -> Result<Json<AjaxResponse>> {
    match request.action.as_str() {
        ACTION_UPDATE_USER_LISTINGS => update_user_listings(&state, &viewer, &request).await,
        other => {
            tracing::warn!("Unknown AJAX action {:?}", other);
            Err(AppError::InvalidInput(format!("Unknown action: {}", other)))
        }
    }
}

/// Update one user's quota from the management page
///
/// Requires `manage_options` and a token for this action; otherwise the
/// request ends with the generic denial and nothing is written.
pub async fn update_user_listings(
    state: &AppState,
    viewer: &Viewer,
    request: &AjaxRequest,
) -> Result<Json<AjaxResponse>> {
    if !viewer.verify_nonce(&request.nonce, ACTION_UPDATE_USER_LISTINGS, state)
        || !viewer.can(Capability::ManageOptions, state)
    {
        tracing::warn!("Quick update denied for user {}", viewer.user.id);
        return Err(AppError::Forbidden);
    }

    let stored = match parse_user_id(&request.user_id) {
        Some(user_id) => state.store.set(user_id, coerce_int(&request.count)).await,
        None => {
            tracing::warn!("Quick update with invalid user id {:?}", request.user_id);
            false
        }
    };

    if stored {
        Ok(Json(AjaxResponse::success(MSG_SINGLE_UPDATED)))
    } else {
        Ok(Json(AjaxResponse::error(MSG_SINGLE_FAILED)))
    }
}
