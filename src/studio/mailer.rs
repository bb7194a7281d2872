use async_trait::async_trait;
use thiserror::Error;

#[cfg(test)]
use mockall::automock;

#[derive(Debug, Error)]
pub enum MailerError {
  #[error("Mail delivery failed: {0}")]
  Delivery(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
  pub from: String,
  pub to: String,
  pub subject: String,
  pub body: String,
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
  async fn send(&self, mail: OutgoingMail) -> Result<(), MailerError>;
}

/// Records outgoing mail in the log instead of delivering it.
pub struct TracingMailer;

#[async_trait]
impl Mailer for TracingMailer {
  async fn send(&self, mail: OutgoingMail) -> Result<(), MailerError> {
    tracing::info!(
      target: "studio::mail",
      from = %mail.from,
      to = %mail.to,
      subject = %mail.subject,
      body = %mail.body,
      "outgoing mail"
    );
    Ok(())
  }
}
