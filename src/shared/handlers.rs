use actix_web::{web, HttpResponse, Responder};

use super::health_check::{HealthCheck, HealthCheckStats};

#[utoipa::path(
  get,
  path = "/health",
  responses(
    (status = 200, description = "The service is up")
  )
)]
pub async fn check_health() -> impl Responder {
  HttpResponse::Ok().content_type("text/plain").body("ok")
}

#[utoipa::path(
  get,
  path = "/health/db",
  responses(
    (status = 200, description = "Last collected database status, null before the first check", body = HealthCheckStats)
  )
)]
pub async fn check_database<HC: HealthCheck + 'static>(
  health_check: web::Data<HC>,
) -> impl Responder {
  HttpResponse::Ok().json(health_check.collect())
}
