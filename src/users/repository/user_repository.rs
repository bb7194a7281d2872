use mongodb::bson::{doc, Document};
use mongodb::options::IndexOptions;
use mongodb::{Collection, IndexModel};
use thiserror::Error;

use crate::shared::database::{is_duplicate_key, MongoDatabase};
use crate::users::model::user::User;

const USERS_COLLECTION: &str = "users";

#[derive(Debug, Error)]
pub enum UserRepositoryError {
  #[error("User already exists")]
  Duplicate,

  #[error("MongoDB error: {0}")]
  Mongo(#[from] mongodb::error::Error),
}

pub enum FindOneProperty<'a> {
  Id(&'a str),
  Email(&'a str),
  UserName(&'a str),
}

impl FindOneProperty<'_> {
  fn to_mongo_key_value(&self) -> Document {
    match self {
      FindOneProperty::Id(id) => doc! { "_id": *id },
      FindOneProperty::Email(email) => doc! { "email": *email },
      FindOneProperty::UserName(username) => doc! { "username": *username },
    }
  }
}

pub trait UserRepository {
  async fn find_one(
    &self,
    property: FindOneProperty<'_>,
  ) -> Result<Option<User>, UserRepositoryError>;
  /// Fails with `Duplicate` when the username or email is already taken.
  async fn create(&self, user: User) -> Result<(), UserRepositoryError>;
}

// ### MongoDB implementation ###

pub struct MongoUserRepositoryImpl {
  database: MongoDatabase,
}

impl MongoUserRepositoryImpl {
  pub fn new(database: MongoDatabase) -> Self {
    Self { database }
  }

  fn collection(&self) -> Collection<User> {
    self.database.database().collection(USERS_COLLECTION)
  }

  pub async fn ensure_indexes(&self) -> Result<(), UserRepositoryError> {
    let unique = || IndexOptions::builder().unique(true).build();
    self
      .collection()
      .create_indexes([
        IndexModel::builder()
          .keys(doc! { "email": 1 })
          .options(unique())
          .build(),
        IndexModel::builder()
          .keys(doc! { "username": 1 })
          .options(unique())
          .build(),
      ])
      .await?;
    Ok(())
  }
}

impl UserRepository for MongoUserRepositoryImpl {
  async fn find_one(
    &self,
    property: FindOneProperty<'_>,
  ) -> Result<Option<User>, UserRepositoryError> {
    let user = self
      .collection()
      .find_one(property.to_mongo_key_value())
      .await?;
    Ok(user)
  }

  async fn create(&self, user: User) -> Result<(), UserRepositoryError> {
    match self.collection().insert_one(&user).await {
      Ok(_) => Ok(()),
      Err(error) if is_duplicate_key(&error) => {
        Err(UserRepositoryError::Duplicate)
      }
      Err(error) => Err(error.into()),
    }
  }
}
