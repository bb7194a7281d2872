use chrono::{DateTime, Duration, FixedOffset, Timelike, Utc};

use crate::shared::app_error::AppError;

/// A bookable (date, time) pair in canonical form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Slot {
  date_ms: i64,
  minute_of_day: u32,
}

impl Slot {
  pub fn parse(date: &str, time: &str) -> Result<Self, AppError> {
    Ok(Self {
      date_ms: parse_date(date)?,
      minute_of_day: parse_time(time)?,
    })
  }

  pub fn date_key(&self) -> String {
    self.date_ms.to_string()
  }

  pub fn time_key(&self) -> String {
    format!("{:02}:{:02}", self.minute_of_day / 60, self.minute_of_day % 60)
  }

  /// The absolute instant the slot begins: the day's timestamp plus the
  /// time-of-day offset.
  pub fn starts_at(&self) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(self.date_ms)?
      .checked_add_signed(Duration::minutes(i64::from(self.minute_of_day)))
  }
}

/// Accepts any finite number of milliseconds, truncated to a whole
/// millisecond. Every time of day on the resulting date must be representable.
pub fn parse_date(date: &str) -> Result<i64, AppError> {
  let invalid = || {
    AppError::InvalidInput(format!(
      "date must be a millisecond timestamp, got {:?}",
      date
    ))
  };

  let trimmed = date.trim();
  let date_ms = match trimmed.parse::<i64>() {
    Ok(date_ms) => date_ms,
    Err(_) => {
      let value = trimmed.parse::<f64>().map_err(|_| invalid())?;
      if !value.is_finite() || value.abs() >= i64::MAX as f64 {
        return Err(invalid());
      }
      value.trunc() as i64
    }
  };

  DateTime::from_timestamp_millis(date_ms)
    .and_then(|day| day.checked_add_signed(Duration::days(1)))
    .ok_or_else(invalid)?;
  Ok(date_ms)
}

/// Accepts `H:MM` or `HH:MM` on a 24-hour clock and returns the minute of day.
pub fn parse_time(time: &str) -> Result<u32, AppError> {
  let invalid =
    || AppError::InvalidInput(format!("time must be HH:MM, got {:?}", time));

  let (hours, minutes) = time.trim().split_once(':').ok_or_else(invalid)?;
  let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
  if hours.is_empty()
    || hours.len() > 2
    || minutes.len() != 2
    || !all_digits(hours)
    || !all_digits(minutes)
  {
    return Err(invalid());
  }

  let hours: u32 = hours.parse().map_err(|_| invalid())?;
  let minutes: u32 = minutes.parse().map_err(|_| invalid())?;
  if hours > 23 || minutes > 59 {
    return Err(invalid());
  }
  Ok(hours * 60 + minutes)
}

pub fn canonical_date(date: &str) -> Result<String, AppError> {
  parse_date(date).map(|date_ms| date_ms.to_string())
}

pub fn canonical_time(time: &str) -> Result<String, AppError> {
  parse_time(time).map(|minute| format!("{:02}:{:02}", minute / 60, minute % 60))
}

/// Midnight of `now`'s calendar day in the studio's zone.
pub fn start_of_day(now: DateTime<Utc>, studio_offset: FixedOffset) -> DateTime<Utc> {
  let local = now.with_timezone(&studio_offset);
  let elapsed = Duration::seconds(i64::from(local.num_seconds_from_midnight()))
    + Duration::nanoseconds(i64::from(local.nanosecond()));
  now - elapsed
}
