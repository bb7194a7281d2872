use async_trait::async_trait;
use bcrypt::{hash, verify, BcryptError};
use rayon::ThreadPool;
use std::sync::Arc;
use thiserror::Error;

#[cfg(test)]
use mockall::automock;

#[derive(Error, Debug)]
pub enum HashWorkerError {
  #[error("Bcrypt error: {0}")]
  Bcrypt(#[from] BcryptError),
  #[error("Channel send error")]
  Send,
  #[error("Channel receive error")]
  Receive,
}

enum WorkOrder {
  Hash(String, flume::Sender<Result<String, HashWorkerError>>),
  Verify(String, String, flume::Sender<Result<bool, HashWorkerError>>),
}

/// Runs bcrypt on a dedicated rayon pool so password work never stalls the
/// actix workers.
pub struct HashWorker {
  sender: flume::Sender<WorkOrder>,
}

impl HashWorker {
  pub fn new(thread_pool: ThreadPool, num_threads: u32, cost: u32) -> Self {
    // A bcrypt round at the default cost takes a good fraction of a second,
    // so a few seconds of queued requests is enough to absorb bursts.
    let channels_capacity = num_threads.max(1) * 3;
    let (tx, rx) = flume::bounded::<WorkOrder>(channels_capacity as usize);
    let rx = Arc::new(rx);

    for _ in 0..num_threads.max(1) {
      thread_pool.spawn({
        let rx = Arc::clone(&rx);
        move || {
          while let Ok(work_order) = rx.recv() {
            match work_order {
              WorkOrder::Hash(password, response) => {
                let _ = response
                  .send(hash(password, cost).map_err(HashWorkerError::from));
              }
              WorkOrder::Verify(password, password_hash, response) => {
                let _ = response.send(
                  verify(password, &password_hash)
                    .map_err(HashWorkerError::from),
                );
              }
            };
          }
        }
      });
    }

    Self { sender: tx }
  }
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait Hasher: Send + Sync {
  async fn hash_password(&self, password: &str)
    -> Result<String, HashWorkerError>;
  async fn verify_password(
    &self,
    password: &str,
    hash: &str,
  ) -> Result<bool, HashWorkerError>;
}

#[async_trait]
impl Hasher for HashWorker {
  async fn hash_password(
    &self,
    password: &str,
  ) -> Result<String, HashWorkerError> {
    let (response_tx, response_rx) = flume::bounded(1);
    self
      .sender
      .send_async(WorkOrder::Hash(password.to_string(), response_tx))
      .await
      .map_err(|_| HashWorkerError::Send)?;

    response_rx
      .recv_async()
      .await
      .map_err(|_| HashWorkerError::Receive)?
  }

  async fn verify_password(
    &self,
    password: &str,
    hash: &str,
  ) -> Result<bool, HashWorkerError> {
    let (response_tx, response_rx) = flume::bounded(1);
    self
      .sender
      .send_async(WorkOrder::Verify(
        password.to_string(),
        hash.to_string(),
        response_tx,
      ))
      .await
      .map_err(|_| HashWorkerError::Send)?;

    response_rx
      .recv_async()
      .await
      .map_err(|_| HashWorkerError::Receive)?
  }
}
