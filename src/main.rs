mod auth;
mod bookings;
mod shared;
mod studio;
mod users;

#[cfg(test)]
mod helpers;

use std::sync::Arc;
use std::time::Duration;

use actix_governor::{Governor, GovernorConfigBuilder};
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use auth::TokenService;
use bookings::repository::booking_repository::{
  BookingRepository, MongoBookingRepositoryImpl,
};
use rayon::ThreadPoolBuilder;
use shared::clock::{Clock, SystemClock};
use shared::config::Config;
use shared::database::MongoDatabase;
use shared::handlers::{check_database, check_health};
use shared::hash_worker::{HashWorker, Hasher};
use shared::health_check::HealthCheckImpl;
use studio::mailer::{Mailer, TracingMailer};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use users::repository::user_repository::{
  MongoUserRepositoryImpl, UserRepository,
};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};
use utoipa_swagger_ui::SwaggerUi;

const HEALTH_CHECK_PERIOD: Duration = Duration::from_secs(60);

// This struct represents state
pub struct AppState<UR: UserRepository, BR: BookingRepository> {
  pub user_repository: UR,
  pub booking_repository: BR,
  pub config: Config,
  pub hasher: Arc<dyn Hasher>,
  pub tokens: TokenService,
  pub clock: Arc<dyn Clock>,
  pub mailer: Arc<dyn Mailer>,
}

#[derive(OpenApi)]
#[openapi(
  paths(
    shared::handlers::check_health,
    shared::handlers::check_database,
    users::register,
    users::login,
    users::me,
    bookings::get_bookings,
    bookings::book_appointment,
    bookings::update_booking,
    bookings::delete_booking,
    studio::get_services,
    studio::send_contact_email,
  ),
  components(schemas(
    shared::http_error::HttpError,
    shared::role::Role,
    shared::health_check::HealthCheckStats,
    users::dto::register_dto::RegisterDto,
    users::dto::login_dto::LoginDto,
    users::rto::user_rto::UserRto,
    users::rto::auth_payload_rto::AuthPayloadRto,
    bookings::dto::book_appointment_dto::BookAppointmentDto,
    bookings::dto::update_booking_dto::UpdateBookingDto,
    bookings::rto::booking_rto::BookingRto,
    studio::dto::contact_dto::ContactDto,
    studio::rto::service_rto::ServiceRto,
  ))
)]
struct ApiDoc;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  init_logger().map_err(std::io::Error::other)?;

  let config = Config::from_env().map_err(std::io::Error::other)?;

  tracing::info!("Connecting to MongoDB");
  let database = MongoDatabase::connect(&config)
    .await
    .map_err(std::io::Error::other)?;

  let user_repository = MongoUserRepositoryImpl::new(database.clone());
  let booking_repository = MongoBookingRepositoryImpl::new(database.clone());
  user_repository
    .ensure_indexes()
    .await
    .map_err(std::io::Error::other)?;
  booking_repository
    .ensure_indexes()
    .await
    .map_err(std::io::Error::other)?;
  tracing::info!("MongoDB connected");

  let thread_pool = ThreadPoolBuilder::new()
    .num_threads(config.hash_threads as usize)
    .thread_name(|index| format!("hash-worker-{}", index))
    .build()
    .map_err(std::io::Error::other)?;
  let hasher = HashWorker::new(thread_pool, config.hash_threads, config.hash_cost);

  let server_address = config.host.clone();
  let state = web::Data::new(AppState {
    user_repository,
    booking_repository,
    tokens: TokenService::new(&config.jwt_secret),
    config,
    hasher: Arc::new(hasher),
    clock: Arc::new(SystemClock),
    mailer: Arc::new(TracingMailer),
  });
  let health_check =
    web::Data::new(HealthCheckImpl::new(database.clone(), HEALTH_CHECK_PERIOD));

  tracing::info!("Listening on http://{}", server_address);
  HttpServer::new(move || {
    App::new()
      .wrap(Logger::default())
      .app_data(health_check.clone())
      .route(
        "/health/db",
        web::get().to(check_database::<HealthCheckImpl>),
      )
      .configure(configure(state.clone()))
  })
  .bind(&server_address)?
  .run()
  .await?;

  database.shutdown().await;
  Ok(())
}

fn init_logger() -> Result<(), tracing_subscriber::util::TryInitError> {
  let env_filter =
    EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());

  tracing_subscriber::registry()
    .with(tracing_subscriber::fmt::layer().with_target(false))
    .with(env_filter)
    .try_init()
}

// Function to initialize the App
pub fn configure<UR, BR>(
  state: web::Data<AppState<UR, BR>>,
) -> impl FnOnce(&mut web::ServiceConfig)
where
  UR: UserRepository + 'static,
  BR: BookingRepository + 'static,
{
  move |config| {
    let auth_scope = web::scope("/v1/auth")
      .route("register", web::post().to(users::register::<UR, BR>))
      .route("login", web::post().to(users::login::<UR, BR>));

    // Rate limit: bursts of `auth_burst_size` requests per IP address,
    // replenished at `auth_rate_per_second`.
    let governor_config = GovernorConfigBuilder::default()
      .requests_per_second(state.config.auth_rate_per_second)
      .burst_size(state.config.auth_burst_size)
      .finish();

    config
      .app_data(web::Data::new(state.tokens.clone()))
      .app_data(state.clone());

    match governor_config {
      Some(governor_config) => {
        config.service(auth_scope.wrap(Governor::new(&governor_config)));
      }
      None => {
        tracing::warn!("Auth rate limit disabled: rate and burst must be non-zero");
        config.service(auth_scope);
      }
    }

    config
      .route("/health", web::get().to(check_health))
      .service(
        SwaggerUi::new("/swagger-ui/{_:.*}")
          .url("/api-docs/openapi.json", ApiDoc::openapi()),
      )
      .service(Scalar::with_url("/scalar", ApiDoc::openapi()))
      .service(
        web::scope("/v1")
          .route("/me", web::get().to(users::me::<UR, BR>))
          .route("/services", web::get().to(studio::get_services))
          .route(
            "/contact",
            web::post().to(studio::send_contact_email::<UR, BR>),
          )
          .route(
            "/bookings",
            web::get().to(bookings::get_bookings::<UR, BR>),
          )
          .route(
            "/bookings",
            web::post().to(bookings::book_appointment::<UR, BR>),
          )
          .route(
            "/bookings/{id}",
            web::patch().to(bookings::update_booking::<UR, BR>),
          )
          .route(
            "/bookings/{id}",
            web::delete().to(bookings::delete_booking::<UR, BR>),
          ),
      );
  }
}
