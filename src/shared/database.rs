use mongodb::bson::doc;
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::{Client, Database as MongoHandle};

use super::config::Config;

pub struct DatabaseStats {
  pub connected: bool,
  pub name: String,
}

pub trait Database {
  async fn stats(&self) -> DatabaseStats;
}

/// The one persistence handle of the process. Created by `main` and cloned
/// into every repository.
#[derive(Clone)]
pub struct MongoDatabase {
  pub mongo_client: Client,
  pub database_name: String,
}

impl MongoDatabase {
  pub async fn connect(config: &Config) -> Result<Self, mongodb::error::Error> {
    tracing::info!("Using MONGODB_URI: {}", mask_credentials(&config.mongodb_uri));
    let mongo_client = Client::with_uri_str(&config.mongodb_uri).await?;
    Ok(Self {
      mongo_client,
      database_name: config.mongodb_database.clone(),
    })
  }

  pub fn database(&self) -> MongoHandle {
    self.mongo_client.database(&self.database_name)
  }

  pub async fn ping(&self) -> Result<(), mongodb::error::Error> {
    self.database().run_command(doc! { "ping": 1 }).await?;
    Ok(())
  }

  pub async fn shutdown(self) {
    self.mongo_client.shutdown().await;
  }
}

impl Database for MongoDatabase {
  async fn stats(&self) -> DatabaseStats {
    let connected = match self.ping().await {
      Ok(()) => true,
      Err(error) => {
        tracing::warn!("MongoDB ping failed: {}", error);
        false
      }
    };
    DatabaseStats {
      connected,
      name: self.database_name.clone(),
    }
  }
}

const DUPLICATE_KEY_CODE: i32 = 11000;

/// True when a write was rejected by a unique index.
pub fn is_duplicate_key(error: &mongodb::error::Error) -> bool {
  match error.kind.as_ref() {
    ErrorKind::Write(WriteFailure::WriteError(write_error)) => {
      write_error.code == DUPLICATE_KEY_CODE
    }
    ErrorKind::Command(command_error) => {
      command_error.code == DUPLICATE_KEY_CODE
    }
    _ => false,
  }
}

fn mask_credentials(uri: &str) -> String {
  let Some(scheme_end) = uri.find("://") else {
    return uri.to_string();
  };
  let rest = &uri[scheme_end + 3..];
  let Some(at) = rest.find('@') else {
    return uri.to_string();
  };
  let credentials = &rest[..at];
  match credentials.split_once(':') {
    Some((user, _)) => format!(
      "{}://{}:*****@{}",
      &uri[..scheme_end],
      user,
      &rest[at + 1..]
    ),
    None => uri.to_string(),
  }
}
