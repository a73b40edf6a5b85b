//! Management page and the bulk update form it submits.

use axum::{Form, extract::State, response::Html};

use crate::AppState;
use crate::constants::{
    ACTION_BULK_UPDATE, ACTION_UPDATE_USER_LISTINGS, ERR_BULK_MISSING_FIELDS, ERR_SECURITY_CHECK,
    FIELD_BULK_COUNT, FIELD_BULK_UPDATE, FIELD_NONCE, FIELD_SELECTED_USERS,
};
use crate::error::Result;
use crate::models::{Capability, clamp_quota, coerce_int, parse_user_id};
use crate::store::QuotaStore;
use crate::views::{self, ManagementPage, Notice};

use super::session::Viewer;

/// A validated bulk form: at least one selected id and a target quota
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkRequest {
    /// Raw submitted ids, coerced one by one when applied
    pub selected: Vec<String>,
    pub quota: i64,
}

impl BulkRequest {
    /// Extract the bulk fields; `None` if the selection or count is missing
    pub fn from_fields(fields: &[(String, String)]) -> Option<Self> {
        let selected: Vec<String> = fields
            .iter()
            .filter(|(name, _)| name == FIELD_SELECTED_USERS)
            .map(|(_, value)| value.clone())
            .collect();
        let quota = field(fields, FIELD_BULK_COUNT).map(coerce_int)?;

        if selected.is_empty() {
            return None;
        }

        Some(Self { selected, quota })
    }
}

/// Result of one bulk submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulkOutcome {
    pub requested: usize,
    pub updated: usize,
    pub quota: u32,
}

impl BulkOutcome {
    pub fn failed(&self) -> usize {
        self.requested - self.updated
    }

    pub fn message(&self) -> String {
        let mut message = format!(
            "Updated {} users with {} listings each.",
            self.updated, self.quota
        );
        if self.failed() > 0 {
            message.push_str(&format!(" {} users could not be updated.", self.failed()));
        }
        message
    }
}

/// Set the same quota for every selected user
///
/// Each id is written independently; a failure is counted and the loop
/// moves on. Nothing is rolled back.
pub async fn apply_bulk_update(store: &QuotaStore, request: &BulkRequest) -> BulkOutcome {
    let mut updated = 0;

    for raw_id in &request.selected {
        let stored = match parse_user_id(raw_id) {
            Some(user_id) => store.set(user_id, request.quota).await,
            None => {
                tracing::warn!("Bulk update skipped invalid user id {:?}", raw_id);
                false
            }
        };
        if stored {
            updated += 1;
        }
    }

    let outcome = BulkOutcome {
        requested: request.selected.len(),
        updated,
        quota: clamp_quota(request.quota),
    };

    tracing::info!(
        "Bulk listings update: {}/{} users set to {}",
        outcome.updated,
        outcome.requested,
        outcome.quota
    );

    outcome
}

fn field<'a>(fields: &'a [(String, String)], name: &str) -> Option<&'a str> {
    fields
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

/// Run the bulk form if it was submitted; returns the notice to show, if any
async fn handle_bulk_submission(
    state: &AppState,
    viewer: &Viewer,
    fields: &[(String, String)],
) -> Option<Notice> {
    field(fields, FIELD_BULK_UPDATE)?;

    let report = state.config.report_validation_errors;

    let nonce = field(fields, FIELD_NONCE).unwrap_or_default();
    if !viewer.verify_nonce(nonce, ACTION_BULK_UPDATE, state) {
        tracing::warn!("Bulk update rejected: bad token from user {}", viewer.user.id);
        return report.then(|| Notice::error(ERR_SECURITY_CHECK));
    }

    let Some(request) = BulkRequest::from_fields(fields) else {
        tracing::debug!("Bulk update skipped: no users selected or no count given");
        return report.then(|| Notice::error(ERR_BULK_MISSING_FIELDS));
    };

    let outcome = apply_bulk_update(&state.store, &request).await;
    Some(Notice::success(outcome.message()))
}

async fn render(state: &AppState, viewer: &Viewer, notice: Option<Notice>) -> Result<Html<String>> {
    // Every user, every time: fine for the handful of accounts this page serves
    let users = super::list_users(state).await?;
    let quotas = state
        .store
        .get_many(users.iter().map(|user| user.id).collect())
        .await?;

    let bulk_nonce = viewer.nonce(ACTION_BULK_UPDATE, state);
    let ajax_nonce = viewer.nonce(ACTION_UPDATE_USER_LISTINGS, state);

    Ok(Html(views::management_page(&ManagementPage {
        users: &users,
        quotas: &quotas,
        bulk_nonce: &bulk_nonce,
        ajax_nonce: &ajax_nonce,
        notice: notice.as_ref(),
    })))
}

/// GET /admin/listings
pub async fn listings_page(State(state): State<AppState>, viewer: Viewer) -> Result<Html<String>> {
    viewer.require(Capability::ManageOptions, &state)?;
    render(&state, &viewer, None).await
}

/// POST /admin/listings
///
/// Applies the bulk form when `bulk_update` is present and the token is
/// valid, then renders the page again.
pub async fn listings_submit(
    State(state): State<AppState>,
    viewer: Viewer,
    Form(fields): Form<Vec<(String, String)>>,
) -> Result<Html<String>> {
    viewer.require(Capability::ManageOptions, &state)?;

    let notice = handle_bulk_submission(&state, &viewer, &fields).await;
    render(&state, &viewer, notice).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_bulk_request_collects_selected_ids() {
        let request = BulkRequest::from_fields(&fields(&[
            ("bulk_listings_count", "5"),
            ("selected_users[]", "1"),
            ("selected_users[]", "3"),
            ("bulk_update", "Apply to Selected Users"),
        ]))
        .unwrap();

        assert_eq!(request.selected, vec!["1".to_string(), "3".to_string()]);
        assert_eq!(request.quota, 5);
    }

    #[test]
    fn test_bulk_request_requires_selection() {
        let request = BulkRequest::from_fields(&fields(&[("bulk_listings_count", "5")]));
        assert_eq!(request, None);
    }

    #[test]
    fn test_bulk_request_requires_count() {
        let request = BulkRequest::from_fields(&fields(&[("selected_users[]", "1")]));
        assert_eq!(request, None);
    }

    #[test]
    fn test_bulk_request_coerces_count() {
        let request = BulkRequest::from_fields(&fields(&[
            ("bulk_listings_count", "ten"),
            ("selected_users[]", "1"),
        ]))
        .unwrap();

        assert_eq!(request.quota, 0);
    }

    #[test]
    fn test_outcome_message_reports_failures() {
        let outcome = BulkOutcome {
            requested: 3,
            updated: 2,
            quota: 5,
        };

        assert_eq!(
            outcome.message(),
            "Updated 2 users with 5 listings each. 1 users could not be updated."
        );
    }

    #[test]
    fn test_outcome_message_all_updated() {
        let outcome = BulkOutcome {
            requested: 2,
            updated: 2,
            quota: 0,
        };

        assert_eq!(outcome.message(), "Updated 2 users with 0 listings each.");
    }
}
