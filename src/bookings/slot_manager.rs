use chrono::{DateTime, FixedOffset, Utc};
use nanoid::nanoid;

use crate::auth::Identity;
use crate::bookings::model::booking::{Booking, BookingChanges};
use crate::bookings::policy::can_modify;
use crate::bookings::repository::booking_repository::BookingRepository;
use crate::bookings::slot::{start_of_day, Slot};
use crate::shared::app_error::AppError;
use crate::users::repository::user_repository::{
  FindOneProperty, UserRepository,
};

/// Enforces the booking rules on top of the stores. Built per request with
/// the request's notion of "now".
pub struct BookingSlotManager<'a, BR: BookingRepository, UR: UserRepository> {
  bookings: &'a BR,
  users: &'a UR,
  now: DateTime<Utc>,
  studio_offset: FixedOffset,
}

impl<'a, BR: BookingRepository, UR: UserRepository> BookingSlotManager<'a, BR, UR> {
  pub fn new(
    bookings: &'a BR,
    users: &'a UR,
    now: DateTime<Utc>,
    studio_offset: FixedOffset,
  ) -> Self {
    Self {
      bookings,
      users,
      now,
      studio_offset,
    }
  }

  pub async fn create_booking(
    &self,
    identity: Option<&Identity>,
    date: &str,
    time: &str,
  ) -> Result<Booking, AppError> {
    let identity = identity.ok_or(AppError::Unauthenticated)?;

    let slot = Slot::parse(date, time)?;
    let starts_at = slot.starts_at().ok_or_else(|| {
      AppError::InvalidInput(format!("date is out of range: {:?}", date))
    })?;
    if starts_at < self.now {
      return Err(AppError::PastSlot);
    }

    let (date, time) = (slot.date_key(), slot.time_key());
    if self.bookings.exists_at(&date, &time).await? {
      return Err(AppError::SlotTaken);
    }

    // Name and email come from the stored profile, never from the request.
    let owner = self
      .users
      .find_one(FindOneProperty::Id(&identity.user_id))
      .await?
      .ok_or(AppError::Unauthenticated)?;

    let booking = Booking {
      id: nanoid!(),
      name: owner.username,
      email: owner.email,
      date,
      time,
      owner_user_id: owner.id,
      created_at: self.now,
    };
    self.bookings.create(booking.clone()).await?;

    tracing::info!(
      booking_id = %booking.id,
      owner = %booking.owner_user_id,
      date = %booking.date,
      time = %booking.time,
      "booking created"
    );
    Ok(booking)
  }

  /// Edits are not re-checked against the past-slot rule. The store still
  /// refuses to move a booking onto an occupied slot.
  pub async fn update_booking(
    &self,
    identity: Option<&Identity>,
    id: &str,
    changes: BookingChanges,
  ) -> Result<Booking, AppError> {
    let identity = identity.ok_or(AppError::Unauthenticated)?;
    self.authorize(identity, id).await?;

    let booking = self
      .bookings
      .update(id, &changes)
      .await?
      .ok_or(AppError::BookingNotFound)?;

    tracing::info!(booking_id = %booking.id, by = %identity.user_id, "booking updated");
    Ok(booking)
  }

  pub async fn delete_booking(
    &self,
    identity: Option<&Identity>,
    id: &str,
  ) -> Result<bool, AppError> {
    let identity = identity.ok_or(AppError::Unauthenticated)?;
    self.authorize(identity, id).await?;

    if !self.bookings.delete(id).await? {
      return Err(AppError::BookingNotFound);
    }
    tracing::info!(booking_id = %id, by = %identity.user_id, "booking deleted");
    Ok(true)
  }

  /// Bookings from the start of today (studio time) onwards, ordered by slot.
  pub async fn list_upcoming(&self) -> Result<Vec<Booking>, AppError> {
    let cutoff = start_of_day(self.now, self.studio_offset);

    let mut upcoming: Vec<(Slot, Booking)> = self
      .bookings
      .find_all()
      .await?
      .into_iter()
      .filter_map(|booking| {
        let slot = Slot::parse(&booking.date, &booking.time).ok()?;
        (slot.starts_at()? >= cutoff).then_some((slot, booking))
      })
      .collect();
    upcoming.sort_by(|(a, _), (b, _)| a.cmp(b));

    Ok(upcoming.into_iter().map(|(_, booking)| booking).collect())
  }

  async fn authorize(&self, identity: &Identity, id: &str) -> Result<(), AppError> {
    let booking = self
      .bookings
      .find_by_id(id)
      .await?
      .ok_or(AppError::BookingNotFound)?;
    if !can_modify(identity, &booking) {
      tracing::warn!(
        booking_id = %id,
        by = %identity.user_id,
        username = %identity.username,
        email = %identity.email,
        "booking change refused"
      );
      return Err(AppError::Forbidden);
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use chrono::{Duration, TimeZone};

  use super::*;
  use crate::bookings::repository::booking_repository::tests::InMemoryBookingRepository;
  use crate::bookings::repository::booking_repository::BookingRepositoryError;
  use crate::shared::role::Role;
  use crate::users::model::user::User;
  use crate::users::repository::user_repository::tests::InMemoryUserRepository;

  const DATE: &str = "1700000000000";

  /// Answers every `exists_at` with "free", as if another request filled the
  /// slot right after the check.
  struct LateCheckRepository(InMemoryBookingRepository);

  impl BookingRepository for LateCheckRepository {
    async fn find_all(&self) -> Result<Vec<Booking>, BookingRepositoryError> {
      self.0.find_all().await
    }

    async fn find_by_id(
      &self,
      id: &str,
    ) -> Result<Option<Booking>, BookingRepositoryError> {
      self.0.find_by_id(id).await
    }

    async fn exists_at(
      &self,
      _date: &str,
      _time: &str,
    ) -> Result<bool, BookingRepositoryError> {
      Ok(false)
    }

    async fn create(&self, booking: Booking) -> Result<(), BookingRepositoryError> {
      self.0.create(booking).await
    }

    async fn update(
      &self,
      id: &str,
      changes: &BookingChanges,
    ) -> Result<Option<Booking>, BookingRepositoryError> {
      self.0.update(id, changes).await
    }

    async fn delete(&self, id: &str) -> Result<bool, BookingRepositoryError> {
      self.0.delete(id).await
    }
  }

  fn utc() -> FixedOffset {
    FixedOffset::east_opt(0).unwrap()
  }

  fn before_date() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 11, 1, 12, 0, 0).unwrap()
  }

  fn add_user(users: &InMemoryUserRepository, id: &str, role: Role) -> Identity {
    let user = User {
      id: id.to_string(),
      username: format!("{id}-name"),
      email: format!("{id}@example.com"),
      password_hash: String::new(),
      role,
      created_at: Utc::now(),
    };
    users.users.write().unwrap().push(user.clone());
    Identity {
      user_id: user.id,
      email: user.email,
      role: user.role,
      username: user.username,
    }
  }

  #[actix_web::test]
  async fn test_create_booking_derives_owner_fields() {
    let (bookings, users) =
      (InMemoryBookingRepository::new(), InMemoryUserRepository::new());
    let u1 = add_user(&users, "u1", Role::User);
    let manager = BookingSlotManager::new(&bookings, &users, before_date(), utc());

    let booking = manager
      .create_booking(Some(&u1), DATE, "09:00")
      .await
      .unwrap();

    assert_eq!(booking.date, DATE);
    assert_eq!(booking.time, "09:00");
    assert_eq!(booking.owner_user_id, "u1");
    assert_eq!(booking.name, "u1-name");
    assert_eq!(booking.email, "u1@example.com");
    assert_eq!(booking.created_at, before_date());

    let listed = manager.list_upcoming().await.unwrap();
    assert_eq!(listed, vec![booking]);
  }

  #[actix_web::test]
  async fn test_create_booking_requires_identity() {
    let (bookings, users) =
      (InMemoryBookingRepository::new(), InMemoryUserRepository::new());
    let manager = BookingSlotManager::new(&bookings, &users, before_date(), utc());
    assert!(matches!(
      manager.create_booking(None, DATE, "09:00").await,
      Err(AppError::Unauthenticated)
    ));
  }

  #[actix_web::test]
  async fn test_create_booking_for_deleted_user_is_unauthenticated() {
    let (bookings, users) =
      (InMemoryBookingRepository::new(), InMemoryUserRepository::new());
    let ghost = Identity {
      user_id: String::from("ghost"),
      email: String::from("ghost@example.com"),
      role: Role::User,
      username: String::from("ghost"),
    };
    let manager = BookingSlotManager::new(&bookings, &users, before_date(), utc());
    assert!(matches!(
      manager.create_booking(Some(&ghost), DATE, "09:00").await,
      Err(AppError::Unauthenticated)
    ));
    assert!(bookings.bookings.read().unwrap().is_empty());
  }

  #[actix_web::test]
  async fn test_same_slot_is_taken_for_second_user() {
    let (bookings, users) =
      (InMemoryBookingRepository::new(), InMemoryUserRepository::new());
    let u1 = add_user(&users, "u1", Role::User);
    let u2 = add_user(&users, "u2", Role::User);
    let manager = BookingSlotManager::new(&bookings, &users, before_date(), utc());

    manager.create_booking(Some(&u1), DATE, "09:00").await.unwrap();
    assert!(matches!(
      manager.create_booking(Some(&u2), DATE, "9:00").await,
      Err(AppError::SlotTaken)
    ));
    assert!(manager.create_booking(Some(&u2), DATE, "10:00").await.is_ok());
    assert_eq!(bookings.bookings.read().unwrap().len(), 2);
  }

  #[actix_web::test]
  async fn test_slot_filled_after_the_check_is_taken() {
    let (bookings, users) = (
      LateCheckRepository(InMemoryBookingRepository::new()),
      InMemoryUserRepository::new(),
    );
    let u1 = add_user(&users, "u1", Role::User);
    let u2 = add_user(&users, "u2", Role::User);
    let manager = BookingSlotManager::new(&bookings, &users, before_date(), utc());

    manager.create_booking(Some(&u1), DATE, "09:00").await.unwrap();
    assert!(matches!(
      manager.create_booking(Some(&u2), DATE, "09:00").await,
      Err(AppError::SlotTaken)
    ));

    let stored = bookings.0.bookings.read().unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].owner_user_id, "u1");
  }

  #[actix_web::test]
  async fn test_past_slot_is_rejected() {
    let (bookings, users) =
      (InMemoryBookingRepository::new(), InMemoryUserRepository::new());
    let u1 = add_user(&users, "u1", Role::User);
    let slot_start = DateTime::from_timestamp_millis(1_700_000_000_000).unwrap()
      + Duration::hours(9);

    let just_after = BookingSlotManager::new(
      &bookings,
      &users,
      slot_start + Duration::seconds(1),
      utc(),
    );
    assert!(matches!(
      just_after.create_booking(Some(&u1), DATE, "09:00").await,
      Err(AppError::PastSlot)
    ));

    let exactly_at = BookingSlotManager::new(&bookings, &users, slot_start, utc());
    assert!(exactly_at.create_booking(Some(&u1), DATE, "09:00").await.is_ok());
  }

  #[actix_web::test]
  async fn test_malformed_slot_is_invalid_input() {
    let (bookings, users) =
      (InMemoryBookingRepository::new(), InMemoryUserRepository::new());
    let u1 = add_user(&users, "u1", Role::User);
    let manager = BookingSlotManager::new(&bookings, &users, before_date(), utc());
    assert!(matches!(
      manager.create_booking(Some(&u1), "next tuesday", "09:00").await,
      Err(AppError::InvalidInput(_))
    ));
    assert!(matches!(
      manager.create_booking(Some(&u1), DATE, "25:00").await,
      Err(AppError::InvalidInput(_))
    ));
  }

  #[actix_web::test]
  async fn test_update_and_delete_by_non_owner_are_forbidden() {
    let (bookings, users) =
      (InMemoryBookingRepository::new(), InMemoryUserRepository::new());
    let u1 = add_user(&users, "u1", Role::User);
    let u2 = add_user(&users, "u2", Role::User);
    let manager = BookingSlotManager::new(&bookings, &users, before_date(), utc());
    let booking = manager.create_booking(Some(&u2), DATE, "09:00").await.unwrap();

    let changes = BookingChanges {
      date: None,
      time: Some(String::from("11:00")),
    };
    assert!(matches!(
      manager.update_booking(Some(&u1), &booking.id, changes).await,
      Err(AppError::Forbidden)
    ));
    assert!(matches!(
      manager.delete_booking(Some(&u1), &booking.id).await,
      Err(AppError::Forbidden)
    ));
    assert_eq!(bookings.bookings.read().unwrap()[0].time, "09:00");
  }

  #[actix_web::test]
  async fn test_owner_updates_only_date_and_time() {
    let (bookings, users) =
      (InMemoryBookingRepository::new(), InMemoryUserRepository::new());
    let u1 = add_user(&users, "u1", Role::User);
    let manager = BookingSlotManager::new(&bookings, &users, before_date(), utc());
    let booking = manager.create_booking(Some(&u1), DATE, "09:00").await.unwrap();

    let changes = BookingChanges {
      date: Some(String::from("1700086400000")),
      time: Some(String::from("11:00")),
    };
    let updated = manager
      .update_booking(Some(&u1), &booking.id, changes)
      .await
      .unwrap();
    assert_eq!(updated.date, "1700086400000");
    assert_eq!(updated.time, "11:00");
    assert_eq!(updated.owner_user_id, booking.owner_user_id);
    assert_eq!(updated.email, booking.email);
  }

  #[actix_web::test]
  async fn test_update_onto_occupied_slot_is_taken() {
    let (bookings, users) =
      (InMemoryBookingRepository::new(), InMemoryUserRepository::new());
    let u1 = add_user(&users, "u1", Role::User);
    let manager = BookingSlotManager::new(&bookings, &users, before_date(), utc());
    manager.create_booking(Some(&u1), DATE, "09:00").await.unwrap();
    let second = manager.create_booking(Some(&u1), DATE, "10:00").await.unwrap();

    let changes = BookingChanges {
      date: None,
      time: Some(String::from("09:00")),
    };
    assert!(matches!(
      manager.update_booking(Some(&u1), &second.id, changes).await,
      Err(AppError::SlotTaken)
    ));
  }

  #[actix_web::test]
  async fn test_admin_deletes_any_booking() {
    let (bookings, users) =
      (InMemoryBookingRepository::new(), InMemoryUserRepository::new());
    let u1 = add_user(&users, "u1", Role::User);
    let admin = add_user(&users, "sarah", Role::Admin);
    let manager = BookingSlotManager::new(&bookings, &users, before_date(), utc());
    let booking = manager.create_booking(Some(&u1), DATE, "09:00").await.unwrap();

    assert!(manager.delete_booking(Some(&admin), &booking.id).await.unwrap());
    assert!(bookings.bookings.read().unwrap().is_empty());
    assert!(matches!(
      manager.delete_booking(Some(&admin), &booking.id).await,
      Err(AppError::BookingNotFound)
    ));
  }

  #[actix_web::test]
  async fn test_list_upcoming_filters_before_today_and_orders_by_slot() {
    let (bookings, users) =
      (InMemoryBookingRepository::new(), InMemoryUserRepository::new());
    let u1 = add_user(&users, "u1", Role::User);
    let day = 86_400_000_i64;
    let today = Utc.with_ymd_and_hms(2026, 3, 10, 0, 0, 0).unwrap();
    let today_ms = today.timestamp_millis();

    // Seed directly: past slots can only exist from earlier days.
    let seed = |date: i64, time: &str| Booking {
      id: nanoid!(),
      name: u1.username.clone(),
      email: u1.email.clone(),
      date: date.to_string(),
      time: time.to_string(),
      owner_user_id: u1.user_id.clone(),
      created_at: today,
    };
    {
      let mut stored = bookings.bookings.write().unwrap();
      stored.push(seed(today_ms + day, "08:00"));
      stored.push(seed(today_ms - day, "17:00"));
      stored.push(seed(today_ms, "17:00"));
      stored.push(seed(today_ms, "08:00"));
      stored.push(Booking {
        date: String::from("not-a-date"),
        ..seed(today_ms, "09:00")
      });
    }

    let noon = today + Duration::hours(12);
    let manager = BookingSlotManager::new(&bookings, &users, noon, utc());
    let upcoming = manager.list_upcoming().await.unwrap();

    let slots: Vec<(String, String)> = upcoming
      .into_iter()
      .map(|booking| (booking.date, booking.time))
      .collect();
    assert_eq!(
      slots,
      vec![
        (today_ms.to_string(), String::from("08:00")),
        (today_ms.to_string(), String::from("17:00")),
        ((today_ms + day).to_string(), String::from("08:00")),
      ]
    );
  }
}
