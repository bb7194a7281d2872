use serde::Deserialize;
use utoipa::ToSchema;
use validator_derive::Validate;

#[derive(ToSchema)]
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ContactDto {
  #[validate(length(min = 1, message = "Name is required"))]
  pub name: String,
  #[validate(email(message = "Email must be a valid address"))]
  pub email: String,
  #[validate(length(min = 1, message = "Message is required"))]
  pub message: String,
}
