use chrono::{DateTime, Utc};
use nanoid::nanoid;

use crate::shared::app_error::AppError;
use crate::shared::hash_worker::Hasher;
use crate::shared::role::{normalize_email, Role};
use crate::users::dto::login_dto::LoginDto;
use crate::users::dto::register_dto::RegisterDto;
use crate::users::model::user::User;
use crate::users::repository::user_repository::{
  FindOneProperty, UserRepository,
};

/// Registration and login on top of a user repository and the hash worker.
pub struct CredentialStore<'a, UR: UserRepository> {
  users: &'a UR,
  hasher: &'a dyn Hasher,
  admin_email: &'a str,
}

impl<'a, UR: UserRepository> CredentialStore<'a, UR> {
  pub fn new(users: &'a UR, hasher: &'a dyn Hasher, admin_email: &'a str) -> Self {
    Self {
      users,
      hasher,
      admin_email,
    }
  }

  pub async fn register(
    &self,
    dto: RegisterDto,
    now: DateTime<Utc>,
  ) -> Result<User, AppError> {
    let email = normalize_email(&dto.email);
    if self
      .users
      .find_one(FindOneProperty::Email(&email))
      .await?
      .is_some()
      || self
        .users
        .find_one(FindOneProperty::UserName(&dto.username))
        .await?
        .is_some()
    {
      return Err(AppError::Conflict(String::from("User already exists")));
    }

    let password_hash = self.hasher.hash_password(&dto.password).await?;
    let user = User::from(dto, email, password_hash, self.admin_email, now);

    // The unique indexes catch a registration racing this one.
    self.users.create(user.clone()).await?;
    tracing::info!(user_id = %user.id, role = ?user.role, "user registered");
    Ok(user)
  }

  pub async fn login(&self, dto: &LoginDto) -> Result<User, AppError> {
    let Some(user) = self
      .users
      .find_one(FindOneProperty::Email(&normalize_email(&dto.email)))
      .await?
    else {
      return Err(AppError::InvalidCredentials);
    };

    if !self
      .hasher
      .verify_password(&dto.password, &user.password_hash)
      .await?
    {
      return Err(AppError::InvalidCredentials);
    }
    Ok(user)
  }

  pub async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError> {
    Ok(self.users.find_one(FindOneProperty::Id(id)).await?)
  }
}

impl User {
  fn from(
    dto: RegisterDto,
    email: String,
    password_hash: String,
    admin_email: &str,
    now: DateTime<Utc>,
  ) -> Self {
    Self {
      id: nanoid!(),
      role: Role::for_email(&email, admin_email),
      username: dto.username,
      email,
      password_hash,
      created_at: now,
    }
  }
}
