//! Listings field on the per-user profile page.
//!
//! The profile page and its save flow belong to the host; the listings
//! section plugs into them through [`render_profile_field`] and
//! [`save_profile_field`].

use axum::{
    Form,
    extract::{Path, Query, State},
    response::{Html, Redirect},
};
use serde::Deserialize;

use crate::AppState;
use crate::constants::{ERR_PROFILE_MISSING_COUNT, profile_update_action};
use crate::error::{AppError, Result};
use crate::models::{Capability, UserId, coerce_int};
use crate::views::{self, Notice, ProfilePage};

use super::session::Viewer;

#[derive(Debug, Deserialize)]
pub struct ProfileQuery {
    pub updated: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProfileForm {
    #[serde(rename = "_nonce", default)]
    pub nonce: String,
    pub listings_count: Option<String>,
}

/// Render hook: the listings section, or `None` for viewers without `manage_options`
pub async fn render_profile_field(
    state: &AppState,
    viewer: &Viewer,
    target: UserId,
) -> Result<Option<String>> {
    if !viewer.can(Capability::ManageOptions, state) {
        return Ok(None);
    }

    let count = state.store.get(target).await?;
    Ok(Some(views::profile_field(count)))
}

/// Save hook: store the submitted listings count
///
/// A viewer without `manage_options` is ignored. A missing field is ignored
/// too unless validation errors are reported.
pub async fn save_profile_field(
    state: &AppState,
    viewer: &Viewer,
    target: UserId,
    form: &ProfileForm,
) -> Result<()> {
    if !viewer.can(Capability::ManageOptions, state) {
        return Ok(());
    }

    let Some(raw) = form.listings_count.as_deref() else {
        if state.config.report_validation_errors {
            return Err(AppError::InvalidInput(ERR_PROFILE_MISSING_COUNT.to_string()));
        }
        return Ok(());
    };

    if !state.store.set(target, coerce_int(raw)).await {
        tracing::warn!("Profile save could not store listings count for user {}", target);
    }
    Ok(())
}

/// Viewers may open their own profile, or anyone's with `manage_options`
fn ensure_can_edit(state: &AppState, viewer: &Viewer, target: UserId) -> Result<()> {
    if viewer.user.id == target {
        return Ok(());
    }
    viewer.require(Capability::ManageOptions, state)
}

/// GET /admin/users/:id
pub async fn profile_page(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(user_id): Path<UserId>,
    Query(query): Query<ProfileQuery>,
) -> Result<Html<String>> {
    ensure_can_edit(&state, &viewer, user_id)?;

    let user = super::lookup_user(&state, user_id)
        .await?
        .ok_or(AppError::UserNotFound)?;

    let listings_field = render_profile_field(&state, &viewer, user_id).await?;
    let nonce = viewer.nonce(&profile_update_action(user_id), &state);
    let notice = query.updated.map(|_| Notice::success("User updated."));

    Ok(Html(views::profile_page(&ProfilePage {
        user: &user,
        listings_field: listings_field.as_deref(),
        nonce: &nonce,
        notice: notice.as_ref(),
    })))
}

/// POST /admin/users/:id
pub async fn profile_submit(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(user_id): Path<UserId>,
    Form(form): Form<ProfileForm>,
) -> Result<Redirect> {
    ensure_can_edit(&state, &viewer, user_id)?;

    if !viewer.verify_nonce(&form.nonce, &profile_update_action(user_id), &state) {
        return Err(AppError::Forbidden);
    }

    if super::lookup_user(&state, user_id).await?.is_none() {
        return Err(AppError::UserNotFound);
    }

    save_profile_field(&state, &viewer, user_id, &form).await?;

    Ok(Redirect::to(&format!("/admin/users/{}?updated=1", user_id)))
}
