#[cfg(test)]
pub mod tests {
  use std::sync::Arc;

  use actix_web::http::header::{self, HeaderName};
  use actix_web::{test, web};
  use chrono::{DateTime, Utc};

  use crate::auth::TokenService;
  use crate::bookings::repository::booking_repository::tests::InMemoryBookingRepository;
  use crate::shared::clock::tests::FixedClock;
  use crate::shared::clock::{Clock, SystemClock};
  use crate::shared::config::Config;
  use crate::shared::hash_worker::tests::test_hash_worker;
  use crate::studio::mailer::{Mailer, TracingMailer};
  use crate::users::repository::user_repository::tests::InMemoryUserRepository;
  use crate::AppState;

  pub const TEST_JWT_SECRET: &str = "test_jwt_secret";
  pub const TEST_PASSWORD: &str = "testpassword";

  pub type TestAppState = AppState<InMemoryUserRepository, InMemoryBookingRepository>;

  fn build_state(
    clock: Arc<dyn Clock>,
    mailer: Arc<dyn Mailer>,
  ) -> web::Data<TestAppState> {
    web::Data::new(AppState {
      user_repository: InMemoryUserRepository::new(),
      booking_repository: InMemoryBookingRepository::new(),
      config: Config::for_tests(TEST_JWT_SECRET),
      hasher: Arc::new(test_hash_worker()),
      tokens: TokenService::new(TEST_JWT_SECRET),
      clock,
      mailer,
    })
  }

  pub fn test_app_state() -> web::Data<TestAppState> {
    build_state(Arc::new(SystemClock), Arc::new(TracingMailer))
  }

  pub fn test_app_state_at(now: DateTime<Utc>) -> web::Data<TestAppState> {
    build_state(Arc::new(FixedClock(now)), Arc::new(TracingMailer))
  }

  pub fn test_app_state_with_mailer(
    mailer: Arc<dyn Mailer>,
  ) -> web::Data<TestAppState> {
    build_state(Arc::new(SystemClock), mailer)
  }

  pub fn bearer(token: &str) -> (HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {}", token))
  }

  /// Registration request with the username taken from the email's local part
  /// and `TEST_PASSWORD` as the password.
  pub fn register_request(email: &str) -> test::TestRequest {
    let username = email.split('@').next().unwrap_or(email);
    test::TestRequest::post()
      .uri("/v1/auth/register")
      .peer_addr("127.0.0.1:12345".parse().unwrap())
      .set_json(serde_json::json!({
        "username": username,
        "email": email,
        "password": TEST_PASSWORD,
      }))
  }
}
