use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(ToSchema)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum Role {
  #[serde(rename = "admin")]
  Admin,
  #[serde(rename = "user")]
  User,
}

/// The form an email is stored, looked up and compared in. Uniqueness of
/// accounts holds on this form, so case variants name the same account.
pub fn normalize_email(email: &str) -> String {
  email.trim().to_lowercase()
}

impl Role {
  /// Registration never lets a client pick its role; only the studio owner's
  /// address is promoted.
  pub fn for_email(email: &str, admin_email: &str) -> Self {
    if normalize_email(email) == normalize_email(admin_email) {
      Role::Admin
    } else {
      Role::User
    }
  }
}
