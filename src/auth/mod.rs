use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::http::header::Header;
use actix_web::{web, FromRequest, HttpRequest};
use actix_web_httpauth::headers::authorization::{Authorization, Bearer};
use chrono::Utc;
use jsonwebtoken::{
  decode, encode, Algorithm, DecodingKey, EncodingKey, Header as JwtHeader,
  Validation,
};
use serde::{Deserialize, Serialize};

use crate::shared::role::Role;
use crate::users::model::user::User;

pub const TOKEN_EXPIRY: u64 = 7 * 24 * 60 * 60; // 7 days in seconds

#[derive(Debug, Serialize, Deserialize)]
struct IdentityClaims {
  id: String,
  email: String,
  role: Role,
  username: String,
  iat: u64,
  exp: u64,
}

/// The verified caller of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
  pub user_id: String,
  pub email: String,
  pub role: Role,
  pub username: String,
}

impl Identity {
  pub fn is_admin(&self) -> bool {
    self.role == Role::Admin
  }
}

impl IdentityClaims {
  fn into_identity(self) -> Identity {
    Identity {
      user_id: self.id,
      email: self.email,
      role: self.role,
      username: self.username,
    }
  }
}

#[derive(Clone)]
pub struct TokenService {
  encoding_key: EncodingKey,
  decoding_key: DecodingKey,
}

impl TokenService {
  pub fn new(secret: &str) -> Self {
    Self {
      encoding_key: EncodingKey::from_secret(secret.as_bytes()),
      decoding_key: DecodingKey::from_secret(secret.as_bytes()),
    }
  }

  pub fn issue(&self, user: &User) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now().timestamp().max(0) as u64;
    self.generate_jwt(&IdentityClaims {
      id: user.id.clone(),
      email: user.email.clone(),
      role: user.role,
      username: user.username.clone(),
      iat: now,
      exp: now + TOKEN_EXPIRY,
    })
  }

  /// Any failure degrades the caller to anonymous instead of failing the
  /// request, so public queries keep working with a stale token.
  pub fn verify(&self, token: &str) -> Option<Identity> {
    match decode::<IdentityClaims>(
      token,
      &self.decoding_key,
      &Validation::new(Algorithm::HS256),
    ) {
      Ok(data) => Some(data.claims.into_identity()),
      Err(error) => {
        tracing::warn!("JWT verify failed: {}", error);
        None
      }
    }
  }

  fn generate_jwt(
    &self,
    claims: &IdentityClaims,
  ) -> Result<String, jsonwebtoken::errors::Error> {
    encode(&JwtHeader::new(Algorithm::HS256), claims, &self.encoding_key)
  }
}

/// Request extractor carrying the optional verified identity. Never rejects.
pub struct Caller(pub Option<Identity>);

impl Caller {
  pub fn identity(&self) -> Option<&Identity> {
    self.0.as_ref()
  }
}

impl FromRequest for Caller {
  type Error = actix_web::Error;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
    ready(Ok(Caller(identity_from_request(req))))
  }
}

fn identity_from_request(req: &HttpRequest) -> Option<Identity> {
  let authorization = Authorization::<Bearer>::parse(req).ok()?;
  let Some(tokens) = req.app_data::<web::Data<TokenService>>() else {
    tracing::error!("TokenService is not registered as app data");
    return None;
  };
  tokens.verify(authorization.as_ref().token())
}

#[cfg(test)]
mod tests {
  use actix_web::test::TestRequest;
  use nanoid::nanoid;

  use super::*;

  fn user(role: Role) -> User {
    User {
      id: nanoid!(),
      username: String::from("client"),
      email: String::from("client@example.com"),
      password_hash: String::from("$2b$04$hash"),
      role,
      created_at: Utc::now(),
    }
  }

  #[test]
  fn test_issue_and_verify_round_trip_claims() {
    let tokens = TokenService::new("secret");
    let user = user(Role::Admin);

    let token = tokens.issue(&user).expect("token should be issued");
    let identity = tokens.verify(&token).expect("token should verify");

    assert_eq!(identity.user_id, user.id);
    assert_eq!(identity.email, user.email);
    assert_eq!(identity.username, user.username);
    assert!(identity.is_admin());
  }

  #[test]
  fn test_verify_with_other_secret_is_anonymous() {
    let token = TokenService::new("secret").issue(&user(Role::User)).unwrap();
    assert!(TokenService::new("other").verify(&token).is_none());
    assert!(TokenService::new("secret").verify("not.a.token").is_none());
  }

  #[test]
  fn test_expired_token_is_anonymous() {
    let tokens = TokenService::new("secret");
    let now = Utc::now().timestamp() as u64;
    let token = tokens
      .generate_jwt(&IdentityClaims {
        id: nanoid!(),
        email: String::from("client@example.com"),
        role: Role::User,
        username: String::from("client"),
        iat: now - 2 * TOKEN_EXPIRY,
        exp: now - TOKEN_EXPIRY,
      })
      .unwrap();
    assert!(tokens.verify(&token).is_none());
  }

  #[actix_web::test]
  async fn test_caller_reads_bearer_header() {
    let tokens = TokenService::new("secret");
    let user = user(Role::User);
    let token = tokens.issue(&user).unwrap();

    let (req, mut payload) = TestRequest::default()
      .app_data(web::Data::new(tokens))
      .insert_header(("Authorization", format!("Bearer {}", token)))
      .to_http_parts();
    let caller = Caller::from_request(&req, &mut payload).await.unwrap();
    assert_eq!(caller.identity().map(|i| i.user_id.as_str()), Some(user.id.as_str()));

    let (req, mut payload) = TestRequest::default()
      .app_data(web::Data::new(TokenService::new("secret")))
      .to_http_parts();
    let caller = Caller::from_request(&req, &mut payload).await.unwrap();
    assert!(caller.identity().is_none());
  }
}
