use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
  #[serde(rename = "_id")]
  pub id: String,
  pub name: String,
  pub email: String,
  /// Local midnight of the booked day, in milliseconds, as a decimal string.
  pub date: String,
  /// Zero-padded `HH:MM`.
  pub time: String,
  #[serde(rename = "user")]
  pub owner_user_id: String,
  pub created_at: DateTime<Utc>,
}

/// The editable part of a booking. Owner, name and email are fixed at
/// creation and have no place here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookingChanges {
  pub date: Option<String>,
  pub time: Option<String>,
}

impl BookingChanges {
  pub fn is_empty(&self) -> bool {
    self.date.is_none() && self.time.is_none()
  }
}
