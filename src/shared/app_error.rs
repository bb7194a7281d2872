use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

use crate::bookings::repository::booking_repository::BookingRepositoryError;
use crate::shared::hash_worker::HashWorkerError;
use crate::shared::http_error::HttpError;
use crate::users::repository::user_repository::UserRepositoryError;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Unauthenticated")]
  Unauthenticated,
  #[error("Forbidden: you can only modify your own appointments")]
  Forbidden,
  #[error("Invalid input: {0}")]
  InvalidInput(String),
  #[error("Cannot book a time slot in the past")]
  PastSlot,
  #[error("This time slot is already booked")]
  SlotTaken,
  #[error("Booking not found")]
  BookingNotFound,
  #[error("{0}")]
  Conflict(String),
  #[error("Invalid credentials")]
  InvalidCredentials,
  #[error("Internal error: {0}")]
  Internal(String),
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Unauthenticated | AppError::InvalidCredentials => {
        StatusCode::UNAUTHORIZED
      }
      AppError::Forbidden => StatusCode::FORBIDDEN,
      AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
      AppError::PastSlot => StatusCode::UNPROCESSABLE_ENTITY,
      AppError::SlotTaken | AppError::Conflict(_) => StatusCode::CONFLICT,
      AppError::BookingNotFound => StatusCode::NOT_FOUND,
      AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    // Store and signing details stay in the log.
    let body = match self {
      AppError::Internal(details) => {
        tracing::error!("{}", details);
        HttpError::from("Internal server error")
      }
      other => HttpError::from(other.to_string()),
    };
    HttpResponse::build(self.status_code())
      .content_type("application/json")
      .json(body)
  }
}

impl From<BookingRepositoryError> for AppError {
  fn from(error: BookingRepositoryError) -> Self {
    match error {
      BookingRepositoryError::DuplicateSlot => AppError::SlotTaken,
      other => AppError::Internal(other.to_string()),
    }
  }
}

impl From<UserRepositoryError> for AppError {
  fn from(error: UserRepositoryError) -> Self {
    match error {
      UserRepositoryError::Duplicate => {
        AppError::Conflict(String::from("User already exists"))
      }
      other => AppError::Internal(other.to_string()),
    }
  }
}

impl From<HashWorkerError> for AppError {
  fn from(error: HashWorkerError) -> Self {
    AppError::Internal(error.to_string())
  }
}

impl From<jsonwebtoken::errors::Error> for AppError {
  fn from(error: jsonwebtoken::errors::Error) -> Self {
    AppError::Internal(format!("Token signing error: {}", error))
  }
}

impl From<validator::ValidationErrors> for AppError {
  fn from(errors: validator::ValidationErrors) -> Self {
    AppError::InvalidInput(errors.to_string())
  }
}
