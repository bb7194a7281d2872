use serde::Deserialize;
use utoipa::ToSchema;
use validator_derive::Validate;

/// Name and email sent by older clients are ignored; they are taken from the
/// caller's profile.
#[derive(ToSchema)]
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BookAppointmentDto {
  #[validate(length(min = 1, message = "Date is required"))]
  pub date: String,
  #[validate(length(min = 1, message = "Time is required"))]
  pub time: String,
}
