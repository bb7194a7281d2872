use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::role::Role;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
  #[serde(rename = "_id")]
  pub id: String,
  pub username: String,
  pub email: String,
  pub password_hash: String,
  pub role: Role,
  pub created_at: DateTime<Utc>,
}
