use serde::Deserialize;
use utoipa::ToSchema;
use validator_derive::Validate;

#[derive(ToSchema)]
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterDto {
  #[validate(length(
    min = 1,
    message = "Username must have at least 1 characters"
  ))]
  pub username: String,
  #[validate(email(message = "Email must be a valid address"))]
  pub email: String,
  #[validate(length(
    min = 1,
    message = "Password must have at least 1 characters"
  ))]
  pub password: String,
}
