pub mod dto;
pub mod mailer;
pub mod rto;

use actix_web::{web, HttpResponse};
use dto::contact_dto::ContactDto;
use mailer::OutgoingMail;
use rto::service_rto::ServiceRto;
use validator::Validate;

use crate::bookings::repository::booking_repository::BookingRepository;
use crate::shared::app_error::AppError;
use crate::shared::http_error::HttpError;
use crate::users::repository::user_repository::UserRepository;
use crate::AppState;

const SERVICES: [(&str, &str, &str); 2] = [
  ("1", "Private Session", "1-on-1 Pilates session with Sarah"),
  ("2", "Group Class", "Small group Pilates training"),
];

pub fn services() -> Vec<ServiceRto> {
  SERVICES
    .iter()
    .map(|(id, name, description)| ServiceRto {
      id: id.to_string(),
      name: name.to_string(),
      description: description.to_string(),
    })
    .collect()
}

#[utoipa::path(
  get,
  path = "/v1/services",
  responses(
    (status = 200, description = "The studio's services", body = Vec<ServiceRto>)
  )
)]
pub async fn get_services() -> HttpResponse {
  HttpResponse::Ok().json(services())
}

pub fn compose_contact_mail(dto: &ContactDto, inbox: &str) -> OutgoingMail {
  OutgoingMail {
    from: dto.email.clone(),
    to: inbox.to_string(),
    subject: format!("New Contact Form from {}", dto.name),
    body: format!(
      "Name: {}\nEmail: {}\nMessage:\n{}",
      dto.name, dto.email, dto.message
    ),
  }
}

/// A delivery failure answers `false` rather than an error.
#[utoipa::path(
  post,
  path = "/v1/contact",
  request_body = ContactDto,
  responses(
    (status = 200, description = "Whether the message was handed off", body = bool),
    (status = 400, description = "Invalid input", body = HttpError)
  )
)]
pub async fn send_contact_email<
  UR: UserRepository + 'static,
  BR: BookingRepository + 'static,
>(
  data: web::Data<AppState<UR, BR>>,
  dto: web::Json<ContactDto>,
) -> Result<HttpResponse, AppError> {
  dto.validate()?;

  let mail = compose_contact_mail(&dto, &data.config.contact_inbox);
  let sent = match data.mailer.send(mail).await {
    Ok(()) => true,
    Err(error) => {
      tracing::error!("Email failed: {}", error);
      false
    }
  };
  Ok(HttpResponse::Ok().json(sent))
}
