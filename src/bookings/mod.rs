pub mod dto;
pub mod model;
pub mod policy;
pub mod repository;
pub mod rto;
pub mod slot;
pub mod slot_manager;

use actix_web::{web, HttpResponse};
use dto::book_appointment_dto::BookAppointmentDto;
use dto::update_booking_dto::UpdateBookingDto;
use model::booking::BookingChanges;
use repository::booking_repository::BookingRepository;
use rto::booking_rto::BookingRto;
use slot_manager::BookingSlotManager;
use validator::Validate;

use crate::auth::Caller;
use crate::shared::app_error::AppError;
use crate::shared::http_error::HttpError;
use crate::users::repository::user_repository::UserRepository;
use crate::AppState;

#[utoipa::path(
  get,
  path = "/v1/bookings",
  responses(
    (status = 200, description = "Bookings from today onwards, by slot", body = Vec<BookingRto>)
  )
)]
pub async fn get_bookings<
  UR: UserRepository + 'static,
  BR: BookingRepository + 'static,
>(
  data: web::Data<AppState<UR, BR>>,
) -> Result<HttpResponse, AppError> {
  let bookings = slot_manager(&data).list_upcoming().await?;
  Ok(
    HttpResponse::Ok().json(
      bookings
        .into_iter()
        .map(BookingRto::from)
        .collect::<Vec<_>>(),
    ),
  )
}

#[utoipa::path(
  post,
  path = "/v1/bookings",
  request_body = BookAppointmentDto,
  responses(
    (status = 201, description = "Booking created", body = BookingRto),
    (status = 400, description = "Malformed date or time", body = HttpError),
    (status = 401, description = "Unauthenticated", body = HttpError),
    (status = 409, description = "Slot already booked", body = HttpError),
    (status = 422, description = "Slot is in the past", body = HttpError)
  )
)]
pub async fn book_appointment<
  UR: UserRepository + 'static,
  BR: BookingRepository + 'static,
>(
  data: web::Data<AppState<UR, BR>>,
  caller: Caller,
  dto: web::Json<BookAppointmentDto>,
) -> Result<HttpResponse, AppError> {
  dto.validate()?;

  let booking = slot_manager(&data)
    .create_booking(caller.identity(), &dto.date, &dto.time)
    .await?;

  Ok(
    HttpResponse::Created()
      .content_type("application/json")
      .json(BookingRto::from(booking)),
  )
}

#[utoipa::path(
  patch,
  path = "/v1/bookings/{id}",
  request_body = UpdateBookingDto,
  params(("id" = String, Path, description = "Booking id")),
  responses(
    (status = 200, description = "Booking updated", body = BookingRto),
    (status = 403, description = "Not the owner or an admin", body = HttpError),
    (status = 404, description = "Booking not found", body = HttpError)
  )
)]
pub async fn update_booking<
  UR: UserRepository + 'static,
  BR: BookingRepository + 'static,
>(
  data: web::Data<AppState<UR, BR>>,
  caller: Caller,
  id: web::Path<String>,
  dto: web::Json<UpdateBookingDto>,
) -> Result<HttpResponse, AppError> {
  let changes = BookingChanges::try_from(dto.into_inner())?;

  let booking = slot_manager(&data)
    .update_booking(caller.identity(), &id, changes)
    .await?;

  Ok(HttpResponse::Ok().json(BookingRto::from(booking)))
}

#[utoipa::path(
  delete,
  path = "/v1/bookings/{id}",
  params(("id" = String, Path, description = "Booking id")),
  responses(
    (status = 200, description = "Booking deleted", body = bool),
    (status = 403, description = "Not the owner or an admin", body = HttpError),
    (status = 404, description = "Booking not found", body = HttpError)
  )
)]
pub async fn delete_booking<
  UR: UserRepository + 'static,
  BR: BookingRepository + 'static,
>(
  data: web::Data<AppState<UR, BR>>,
  caller: Caller,
  id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let deleted = slot_manager(&data)
    .delete_booking(caller.identity(), &id)
    .await?;
  Ok(HttpResponse::Ok().json(deleted))
}

fn slot_manager<UR: UserRepository, BR: BookingRepository>(
  data: &AppState<UR, BR>,
) -> BookingSlotManager<'_, BR, UR> {
  BookingSlotManager::new(
    &data.booking_repository,
    &data.user_repository,
    data.clock.now(),
    data.config.studio_offset,
  )
}
