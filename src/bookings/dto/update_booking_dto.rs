use serde::Deserialize;
use utoipa::ToSchema;

use crate::bookings::model::booking::BookingChanges;
use crate::bookings::slot::{canonical_date, canonical_time};
use crate::shared::app_error::AppError;

/// Unknown fields, an owner field included, are dropped on deserialization.
#[derive(ToSchema)]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateBookingDto {
  pub date: Option<String>,
  pub time: Option<String>,
}

impl TryFrom<UpdateBookingDto> for BookingChanges {
  type Error = AppError;

  fn try_from(dto: UpdateBookingDto) -> Result<Self, Self::Error> {
    Ok(Self {
      date: dto.date.as_deref().map(canonical_date).transpose()?,
      time: dto.time.as_deref().map(canonical_time).transpose()?,
    })
  }
}
