pub mod ajax;
pub mod health;
pub mod listings;
pub mod profile;
pub mod session;
pub mod users;

pub use ajax::ajax_dispatch;
pub use health::health_check;
pub use listings::{apply_bulk_update, listings_page, listings_submit};
pub use profile::{profile_page, profile_submit};
pub use session::Viewer;
pub use users::users_page;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::AppState;
use crate::error::Result;
use crate::models::{User, UserId};

/// Build the application router
pub fn router(state: AppState) -> Router {
    let log_requests = state.config.log_requests;

    let app = Router::new()
        .route("/health", get(health_check))
        .route("/admin/listings", get(listings_page).post(listings_submit))
        .route("/admin/ajax", post(ajax_dispatch))
        .route("/admin/users", get(users_page))
        .route("/admin/users/:id", get(profile_page).post(profile_submit))
        .with_state(state);

    if log_requests {
        app.layer(TraceLayer::new_for_http())
    } else {
        app
    }
}

async fn lookup_user(state: &AppState, user_id: UserId) -> Result<Option<User>> {
    let directory = state.directory.clone();
    tokio::task::spawn_blocking(move || directory.get_user(user_id)).await?
}

async fn list_users(state: &AppState) -> Result<Vec<User>> {
    let directory = state.directory.clone();
    tokio::task::spawn_blocking(move || directory.list_users()).await?
}
