pub mod credentials;
pub mod dto;
pub mod model;
pub mod repository;
pub mod rto;

use actix_web::{web, HttpResponse};
use dto::login_dto::LoginDto;
use dto::register_dto::RegisterDto;
use rto::auth_payload_rto::AuthPayloadRto;
use rto::user_rto::UserRto;
use validator::Validate;

use crate::auth::Caller;
use crate::bookings::repository::booking_repository::BookingRepository;
use crate::shared::app_error::AppError;
use crate::shared::http_error::HttpError;
use crate::users::credentials::CredentialStore;
use crate::users::model::user::User;
use crate::users::repository::user_repository::UserRepository;
use crate::AppState;

#[utoipa::path(
  post,
  path = "/v1/auth/register",
  request_body = RegisterDto,
  responses(
    (status = 201, description = "User registered", body = AuthPayloadRto),
    (status = 400, description = "Invalid input", body = HttpError),
    (status = 409, description = "User already exists", body = HttpError)
  )
)]
pub async fn register<
  UR: UserRepository + 'static,
  BR: BookingRepository + 'static,
>(
  data: web::Data<AppState<UR, BR>>,
  dto: web::Json<RegisterDto>,
) -> Result<HttpResponse, AppError> {
  dto.validate()?;

  let user = credential_store(&data)
    .register(dto.into_inner(), data.clock.now())
    .await?;

  Ok(
    HttpResponse::Created()
      .content_type("application/json")
      .json(auth_payload(&data, user)?),
  )
}

#[utoipa::path(
  post,
  path = "/v1/auth/login",
  request_body = LoginDto,
  responses(
    (status = 200, description = "Logged in", body = AuthPayloadRto),
    (status = 401, description = "Invalid credentials", body = HttpError)
  )
)]
pub async fn login<
  UR: UserRepository + 'static,
  BR: BookingRepository + 'static,
>(
  data: web::Data<AppState<UR, BR>>,
  dto: web::Json<LoginDto>,
) -> Result<HttpResponse, AppError> {
  dto.validate()?;

  let user = credential_store(&data).login(&dto).await?;

  Ok(
    HttpResponse::Ok()
      .content_type("application/json")
      .json(auth_payload(&data, user)?),
  )
}

#[utoipa::path(
  get,
  path = "/v1/me",
  responses(
    (status = 200, description = "The caller, or null when anonymous", body = UserRto)
  )
)]
pub async fn me<
  UR: UserRepository + 'static,
  BR: BookingRepository + 'static,
>(
  data: web::Data<AppState<UR, BR>>,
  caller: Caller,
) -> Result<HttpResponse, AppError> {
  let user = match caller.identity() {
    Some(identity) => credential_store(&data)
      .find_by_id(&identity.user_id)
      .await?
      .map(UserRto::from),
    None => None,
  };
  Ok(HttpResponse::Ok().json(user))
}

fn credential_store<UR: UserRepository, BR: BookingRepository>(
  data: &AppState<UR, BR>,
) -> CredentialStore<'_, UR> {
  CredentialStore::new(
    &data.user_repository,
    data.hasher.as_ref(),
    &data.config.admin_email,
  )
}

fn auth_payload<UR: UserRepository, BR: BookingRepository>(
  data: &AppState<UR, BR>,
  user: User,
) -> Result<AuthPayloadRto, AppError> {
  let token = data.tokens.issue(&user)?;
  Ok(AuthPayloadRto {
    token,
    user: UserRto::from(user),
  })
}
