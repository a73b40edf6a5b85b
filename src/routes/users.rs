use axum::{extract::State, response::Html};

use crate::AppState;
use crate::error::Result;
use crate::models::Capability;
use crate::views;

use super::session::Viewer;

/// GET /admin/users
///
/// User list with the "Available Listings" column.
pub async fn users_page(State(state): State<AppState>, viewer: Viewer) -> Result<Html<String>> {
    viewer.require(Capability::ManageOptions, &state)?;

    let users = super::list_users(&state).await?;
    let quotas = state
        .store
        .get_many(users.iter().map(|user| user.id).collect())
        .await?;

    Ok(Html(views::users_page(&users, &quotas)))
}
