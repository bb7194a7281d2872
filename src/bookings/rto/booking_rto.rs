use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::bookings::model::booking::Booking;

#[derive(ToSchema)]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookingRto {
  pub id: String,
  pub name: String,
  pub email: String,
  pub date: String,
  pub time: String,
  #[schema(value_type = String)]
  pub created_at: DateTime<Utc>,
}

impl From<Booking> for BookingRto {
  fn from(booking: Booking) -> Self {
    Self {
      id: booking.id,
      name: booking.name,
      email: booking.email,
      date: booking.date,
      time: booking.time,
      created_at: booking.created_at,
    }
  }
}
