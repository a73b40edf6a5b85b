//! HTML for the admin pages.
//!
//! Pages are plain strings; every piece of user-supplied text goes through
//! [`escape_html`].

use std::collections::HashMap;
use std::fmt::Write;

use crate::constants::{
    ACTION_UPDATE_USER_LISTINGS, FIELD_BULK_COUNT, FIELD_BULK_UPDATE, FIELD_NONCE,
    FIELD_PROFILE_COUNT, FIELD_SELECTED_USERS,
};
use crate::models::{User, UserId};

pub const AJAX_URL: &str = "/admin/ajax";

/// Escape text for HTML element content and quoted attribute values
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
    Info,
}

/// Inline admin notice shown above page content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            message: message.into(),
        }
    }

    fn render(&self) -> String {
        let class = match self.kind {
            NoticeKind::Success => "notice-success",
            NoticeKind::Error => "notice-error",
            NoticeKind::Info => "notice-info",
        };
        format!(
            "<div class=\"notice {}\"><p>{}</p></div>\n",
            class,
            escape_html(&self.message)
        )
    }
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n</head>\n<body>\n<div class=\"wrap\">\n<h1>{title}</h1>\n\
         {body}</div>\n</body>\n</html>\n",
        title = escape_html(title),
        body = body
    )
}

fn roles_label(user: &User) -> String {
    escape_html(&user.roles.join(", "))
}

// =============================================================================
// User List Column
// =============================================================================

/// Cell for the "Available Listings" column of the user list
pub fn listings_column_cell(user_id: UserId, count: u32) -> String {
    format!(
        "<span class=\"listings-count\" data-user-id=\"{}\">{}</span>",
        user_id, count
    )
}

/// User list page with the "Available Listings" column
pub fn users_page(users: &[User], quotas: &HashMap<UserId, u32>) -> String {
    let mut body = String::from(
        "<table class=\"wp-list-table widefat fixed striped users\">\n<thead>\n<tr>\
         <th>Username</th><th>Email</th><th>Role</th><th>Available Listings</th>\
         </tr>\n</thead>\n<tbody>\n",
    );

    for user in users {
        let count = quotas.get(&user.id).copied().unwrap_or(0);
        let _ = writeln!(
            body,
            "<tr class=\"user-row\"><td><a href=\"/admin/users/{id}\">{name}</a></td>\
             <td>{email}</td><td>{roles}</td><td class=\"column-listings\">{cell}</td></tr>",
            id = user.id,
            name = escape_html(&user.display_name),
            email = escape_html(&user.email),
            roles = roles_label(user),
            cell = listings_column_cell(user.id, count),
        );
    }

    body.push_str("</tbody>\n</table>\n");
    layout("Users", &body)
}

// =============================================================================
// Management Page
// =============================================================================

/// Everything the management page needs, resolved before rendering
pub struct ManagementPage<'a> {
    pub users: &'a [User],
    pub quotas: &'a HashMap<UserId, u32>,
    pub bulk_nonce: &'a str,
    pub ajax_nonce: &'a str,
    pub notice: Option<&'a Notice>,
}

/// Inline updater: idle -> submitting -> success ("Updated!" for 2s) or failure -> idle
const QUICK_UPDATE_SCRIPT: &str = r#"<script>
document.addEventListener('DOMContentLoaded', function () {
  var selectAll = document.getElementById('select-all-users');
  if (selectAll) {
    selectAll.addEventListener('change', function () {
      document.querySelectorAll('input[name="selected_users[]"]').forEach(function (box) {
        box.checked = selectAll.checked;
      });
    });
  }

  document.querySelectorAll('.quick-update-btn').forEach(function (button) {
    button.addEventListener('click', function () {
      var userId = button.dataset.userId;
      var newCount = document.getElementById('quick-update-' + userId).value;

      button.disabled = true;
      button.textContent = 'Updating...';

      var body = new URLSearchParams({
        action: '__ACTION__',
        user_id: userId,
        count: newCount,
        nonce: '__NONCE__'
      });

      fetch('__AJAX_URL__', { method: 'POST', body: body, credentials: 'same-origin' })
        .then(function (response) {
          if (!response.ok) {
            throw new Error(response.statusText);
          }
          return response.json();
        })
        .then(function (reply) {
          button.disabled = false;
          if (reply.success) {
            var shown = Math.max(0, parseInt(newCount, 10) || 0);
            document.getElementById('listings-count-' + userId).textContent = shown;
            button.textContent = 'Updated!';
            button.classList.add('button-primary');
            setTimeout(function () {
              button.textContent = 'Update';
              button.classList.remove('button-primary');
            }, 2000);
          } else {
            alert('Error updating listings count: ' + reply.data);
            button.textContent = 'Update';
          }
        })
        .catch(function () {
          alert('An error occurred while updating.');
          button.disabled = false;
          button.textContent = 'Update';
        });
    });
  });
});
</script>
"#;

fn quick_update_script(ajax_nonce: &str) -> String {
    QUICK_UPDATE_SCRIPT
        .replace("__ACTION__", ACTION_UPDATE_USER_LISTINGS)
        .replace("__AJAX_URL__", AJAX_URL)
        .replace("__NONCE__", &escape_html(ajax_nonce))
}

fn management_row(body: &mut String, user: &User, count: u32) {
    let _ = writeln!(
        body,
        "<tr class=\"user-row\" data-user-id=\"{id}\">\n\
         <th class=\"check-column\"><input type=\"checkbox\" name=\"{selected}\" value=\"{id}\"></th>\n\
         <td><strong>{name}</strong><br><small>ID: {id}</small></td>\n\
         <td>{email}</td>\n\
         <td>{roles}</td>\n\
         <td><span id=\"listings-count-{id}\">{count}</span></td>\n\
         <td><input type=\"number\" id=\"quick-update-{id}\" value=\"{count}\" min=\"0\" style=\"width: 80px;\">\n\
         <button type=\"button\" class=\"button quick-update-btn\" data-user-id=\"{id}\">Update</button></td>\n\
         </tr>",
        id = user.id,
        selected = FIELD_SELECTED_USERS,
        name = escape_html(&user.display_name),
        email = escape_html(&user.email),
        roles = roles_label(user),
        count = count,
    );
}

/// Management page: every user with current quota, inline updater and bulk form
pub fn management_page(page: &ManagementPage<'_>) -> String {
    let mut body = String::new();

    if let Some(notice) = page.notice {
        body.push_str(&notice.render());
    }
    body.push_str(
        &Notice::info("Bulk Update: Set the same number of listings for multiple users at once.")
            .render(),
    );

    let _ = writeln!(
        body,
        "<form method=\"post\" action=\"\">\n\
         <input type=\"hidden\" name=\"{nonce_field}\" value=\"{nonce}\">\n\
         <div style=\"margin: 20px 0;\">\n\
         <label for=\"{count_field}\">Set listings count:</label>\n\
         <input type=\"number\" id=\"{count_field}\" name=\"{count_field}\" value=\"0\" min=\"0\" style=\"width: 100px;\">\n\
         <input type=\"submit\" name=\"{submit_field}\" class=\"button\" value=\"Apply to Selected Users\">\n\
         </div>\n\
         <table class=\"wp-list-table widefat fixed striped\">\n\
         <thead>\n<tr>\n\
         <td class=\"manage-column column-cb check-column\"><input type=\"checkbox\" id=\"select-all-users\"></td>\n\
         <th>User</th><th>Email</th><th>Role</th><th>Current Listings Count</th><th>Quick Update</th>\n\
         </tr>\n</thead>\n<tbody>",
        nonce_field = FIELD_NONCE,
        nonce = escape_html(page.bulk_nonce),
        count_field = FIELD_BULK_COUNT,
        submit_field = FIELD_BULK_UPDATE,
    );

    for user in page.users {
        let count = page.quotas.get(&user.id).copied().unwrap_or(0);
        management_row(&mut body, user, count);
    }

    body.push_str("</tbody>\n</table>\n</form>\n");
    body.push_str(&quick_update_script(page.ajax_nonce));

    layout("Manage User Listings", &body)
}

// =============================================================================
// Profile Page
// =============================================================================

/// The "Listings" section added to a user's profile form
pub fn profile_field(count: u32) -> String {
    format!(
        "<h3>Listings</h3>\n<table class=\"form-table\">\n<tr>\n\
         <th><label for=\"{field}\">Available Listings</label></th>\n\
         <td><input type=\"number\" name=\"{field}\" id=\"{field}\" value=\"{count}\" class=\"regular-text\" min=\"0\">\n\
         <p class=\"description\">Set the number of listings this user can create.</p></td>\n\
         </tr>\n</table>\n",
        field = FIELD_PROFILE_COUNT,
        count = count,
    )
}

pub struct ProfilePage<'a> {
    pub user: &'a User,
    /// Output of the profile render hook; `None` hides the section
    pub listings_field: Option<&'a str>,
    pub nonce: &'a str,
    pub notice: Option<&'a Notice>,
}

pub fn profile_page(page: &ProfilePage<'_>) -> String {
    let mut body = String::new();

    if let Some(notice) = page.notice {
        body.push_str(&notice.render());
    }

    let _ = writeln!(
        body,
        "<form method=\"post\" action=\"/admin/users/{id}\">\n\
         <input type=\"hidden\" name=\"{nonce_field}\" value=\"{nonce}\">\n\
         <table class=\"form-table\">\n\
         <tr><th>Display name</th><td>{name}</td></tr>\n\
         <tr><th>Email</th><td>{email}</td></tr>\n\
         <tr><th>Role</th><td>{roles}</td></tr>\n\
         </table>",
        id = page.user.id,
        nonce_field = FIELD_NONCE,
        nonce = escape_html(page.nonce),
        name = escape_html(&page.user.display_name),
        email = escape_html(&page.user.email),
        roles = roles_label(page.user),
    );

    if let Some(field) = page.listings_field {
        body.push_str(field);
    }

    body.push_str("<p class=\"submit\"><input type=\"submit\" class=\"button button-primary\" value=\"Update User\"></p>\n</form>\n");

    layout(&format!("Edit User {}", page.user.display_name), &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: UserId, name: &str) -> User {
        User {
            id,
            display_name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            roles: vec!["subscriber".to_string(), "vendor".to_string()],
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_listings_column_cell() {
        assert_eq!(
            listings_column_cell(12, 4),
            "<span class=\"listings-count\" data-user-id=\"12\">4</span>"
        );
    }

    #[test]
    fn test_management_page_row_per_user() {
        let users = vec![user(1, "Alice"), user(2, "Bob"), user(3, "Carol")];
        let quotas = HashMap::from([(1, 5), (3, 9)]);

        let html = management_page(&ManagementPage {
            users: &users,
            quotas: &quotas,
            bulk_nonce: "bulknonce",
            ajax_nonce: "ajaxnonce",
            notice: None,
        });

        assert_eq!(html.matches("<tr class=\"user-row\"").count(), 3);
        assert!(html.contains("<span id=\"listings-count-1\">5</span>"));
        assert!(html.contains("<span id=\"listings-count-2\">0</span>"));
        assert!(html.contains("<span id=\"listings-count-3\">9</span>"));
        assert!(html.contains("subscriber, vendor"));
        assert!(html.contains("value=\"bulknonce\""));
        assert!(html.contains("nonce: 'ajaxnonce'"));
        assert!(html.contains("action: 'update_user_listings'"));
    }

    #[test]
    fn test_management_page_escapes_user_text() {
        let users = vec![User {
            id: 1,
            display_name: "<script>alert(1)</script>".to_string(),
            email: "x@example.com".to_string(),
            roles: vec![],
        }];

        let html = management_page(&ManagementPage {
            users: &users,
            quotas: &HashMap::new(),
            bulk_nonce: "n",
            ajax_nonce: "n",
            notice: None,
        });

        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(!html.contains("<script>alert(1)</script>"));
    }

    #[test]
    fn test_management_page_notice() {
        let notice = Notice::success("Updated 2 users with 5 listings each.");
        let html = management_page(&ManagementPage {
            users: &[],
            quotas: &HashMap::new(),
            bulk_nonce: "n",
            ajax_nonce: "n",
            notice: Some(&notice),
        });

        assert!(html.contains("notice-success"));
        assert!(html.contains("Updated 2 users with 5 listings each."));
    }

    #[test]
    fn test_profile_page_without_field() {
        let target = user(4, "Dana");
        let html = profile_page(&ProfilePage {
            user: &target,
            listings_field: None,
            nonce: "n",
            notice: None,
        });

        assert!(html.contains("dana@example.com"));
        assert!(!html.contains("listings_count"));
    }

    #[test]
    fn test_profile_page_with_field() {
        let target = user(4, "Dana");
        let field = profile_field(6);
        let html = profile_page(&ProfilePage {
            user: &target,
            listings_field: Some(&field),
            nonce: "n",
            notice: None,
        });

        assert!(html.contains("name=\"listings_count\""));
        assert!(html.contains("value=\"6\""));
    }
}
