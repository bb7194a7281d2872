use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::shared::role::Role;
use crate::users::model::user::User;

#[derive(ToSchema)]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserRto {
  pub id: String,
  pub username: String,
  pub email: String,
  pub role: Role,
}

impl From<User> for UserRto {
  fn from(user: User) -> Self {
    Self {
      id: user.id,
      username: user.username,
      email: user.email,
      role: user.role,
    }
  }
}
