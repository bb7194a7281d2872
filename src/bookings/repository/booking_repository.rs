use mongodb::bson::{doc, Document};
use mongodb::options::{IndexOptions, ReturnDocument};
use mongodb::{Collection, IndexModel};
use thiserror::Error;

use crate::bookings::model::booking::{Booking, BookingChanges};
use crate::shared::database::{is_duplicate_key, MongoDatabase};

const BOOKINGS_COLLECTION: &str = "bookings";

#[derive(Debug, Error)]
pub enum BookingRepositoryError {
  #[error("Slot is already booked")]
  DuplicateSlot,

  #[error("MongoDB error: {0}")]
  Mongo(#[from] mongodb::error::Error),
}

pub trait BookingRepository {
  async fn find_all(&self) -> Result<Vec<Booking>, BookingRepositoryError>;
  async fn find_by_id(
    &self,
    id: &str,
  ) -> Result<Option<Booking>, BookingRepositoryError>;
  async fn exists_at(
    &self,
    date: &str,
    time: &str,
  ) -> Result<bool, BookingRepositoryError>;
  /// Rejects with `DuplicateSlot` when (date, time) is already held, even if
  /// a concurrent writer got there after the caller's `exists_at`.
  async fn create(&self, booking: Booking) -> Result<(), BookingRepositoryError>;
  async fn update(
    &self,
    id: &str,
    changes: &BookingChanges,
  ) -> Result<Option<Booking>, BookingRepositoryError>;
  async fn delete(&self, id: &str) -> Result<bool, BookingRepositoryError>;
}

// ### MongoDB implementation ###

pub struct MongoBookingRepositoryImpl {
  database: MongoDatabase,
}

impl MongoBookingRepositoryImpl {
  pub fn new(database: MongoDatabase) -> Self {
    Self { database }
  }

  fn collection(&self) -> Collection<Booking> {
    self.database.database().collection(BOOKINGS_COLLECTION)
  }

  /// One document per slot. This index is what makes slot uniqueness hold
  /// under concurrent bookings.
  pub async fn ensure_indexes(&self) -> Result<(), BookingRepositoryError> {
    self
      .collection()
      .create_index(
        IndexModel::builder()
          .keys(doc! { "date": 1, "time": 1 })
          .options(IndexOptions::builder().unique(true).build())
          .build(),
      )
      .await?;
    Ok(())
  }
}

fn slot_filter(date: &str, time: &str) -> Document {
  doc! { "date": date, "time": time }
}

impl BookingRepository for MongoBookingRepositoryImpl {
  async fn find_all(&self) -> Result<Vec<Booking>, BookingRepositoryError> {
    let mut cursor = self.collection().find(doc! {}).await?;
    let mut bookings = Vec::new();
    while cursor.advance().await? {
      bookings.push(cursor.deserialize_current()?);
    }
    Ok(bookings)
  }

  async fn find_by_id(
    &self,
    id: &str,
  ) -> Result<Option<Booking>, BookingRepositoryError> {
    Ok(self.collection().find_one(doc! { "_id": id }).await?)
  }

  async fn exists_at(
    &self,
    date: &str,
    time: &str,
  ) -> Result<bool, BookingRepositoryError> {
    let count = self
      .collection()
      .count_documents(slot_filter(date, time))
      .limit(1)
      .await?;
    Ok(count > 0)
  }

  async fn create(&self, booking: Booking) -> Result<(), BookingRepositoryError> {
    match self.collection().insert_one(&booking).await {
      Ok(_) => Ok(()),
      Err(error) if is_duplicate_key(&error) => {
        Err(BookingRepositoryError::DuplicateSlot)
      }
      Err(error) => Err(error.into()),
    }
  }

  async fn update(
    &self,
    id: &str,
    changes: &BookingChanges,
  ) -> Result<Option<Booking>, BookingRepositoryError> {
    if changes.is_empty() {
      return self.find_by_id(id).await;
    }
    let mut set = Document::new();
    if let Some(date) = &changes.date {
      set.insert("date", date.as_str());
    }
    if let Some(time) = &changes.time {
      set.insert("time", time.as_str());
    }

    let result = self
      .collection()
      .find_one_and_update(doc! { "_id": id }, doc! { "$set": set })
      .return_document(ReturnDocument::After)
      .await;
    match result {
      Ok(booking) => Ok(booking),
      Err(error) if is_duplicate_key(&error) => {
        Err(BookingRepositoryError::DuplicateSlot)
      }
      Err(error) => Err(error.into()),
    }
  }

  async fn delete(&self, id: &str) -> Result<bool, BookingRepositoryError> {
    let result = self.collection().delete_one(doc! { "_id": id }).await?;
    Ok(result.deleted_count > 0)
  }
}
