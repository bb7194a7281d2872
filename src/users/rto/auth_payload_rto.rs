use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::user_rto::UserRto;

#[derive(ToSchema)]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthPayloadRto {
  pub token: String,
  pub user: UserRto,
}
