use std::time::Duration;

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::MailConfig;

use super::domain::ContactRecord;

/// Outbound notification hooks for an accepted submission.
///
/// `notify_staff` delivers the submission to the configured recipient list
/// with the submitter set as reply-to; `send_confirmation` acknowledges the
/// submitter. The intake service treats only the former as load-bearing.
#[async_trait]
pub trait ContactMailer: Send + Sync {
    async fn notify_staff(&self, record: &ContactRecord) -> Result<(), MailerError>;
    async fn send_confirmation(&self, record: &ContactRecord) -> Result<(), MailerError>;
}

/// Mail dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum MailerError {
    #[error("mail configuration incomplete: {0}")]
    Incomplete(&'static str),
    #[error("invalid mail address '{address}'")]
    InvalidAddress { address: String },
    #[error("mail transport failure: {0}")]
    Transport(String),
}

/// SMTP-backed [`ContactMailer`] built from [`MailConfig`].
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: Mailbox,
    recipients: Vec<Mailbox>,
}

/// Upper bound on one SMTP exchange so a hung mail server cannot pin a
/// request handler indefinitely.
const SMTP_TIMEOUT: Duration = Duration::from_secs(15);

impl SmtpMailer {
    pub fn from_config(config: &MailConfig) -> Result<Self, MailerError> {
        let sender_addr = config
            .default_sender
            .as_deref()
            .ok_or(MailerError::Incomplete("MAIL_DEFAULT_SENDER is not set"))?;
        let sender = parse_mailbox(sender_addr)?;

        let recipients = config
            .notification_recipients
            .iter()
            .map(|addr| parse_mailbox(addr))
            .collect::<Result<Vec<_>, _>>()?;

        let mut builder = if config.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.server)
                .map_err(|err| MailerError::Transport(err.to_string()))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.server)
        };
        builder = builder.port(config.port).timeout(Some(SMTP_TIMEOUT));

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            sender,
            recipients,
        })
    }

    fn staff_body(record: &ContactRecord) -> String {
        let mut body = String::from("New contact form submission:\n");
        body.push_str(&format!("Name: {}\n", record.name));
        body.push_str(&format!("Email: {}\n", record.email));
        if let Some(phone) = &record.phone {
            body.push_str(&format!("Phone: {}\n", phone));
        }
        if let Some(origin) = &record.form_origin {
            body.push_str(&format!("Submitted from: {}\n", origin));
        }
        body.push_str(&format!("Message:\n{}\n", record.message));
        body
    }
}

#[async_trait]
impl ContactMailer for SmtpMailer {
    async fn notify_staff(&self, record: &ContactRecord) -> Result<(), MailerError> {
        if self.recipients.is_empty() {
            return Err(MailerError::Incomplete("NOTIFICATION_EMAILS is empty"));
        }

        let reply_to = parse_mailbox(&record.email)?;
        let mut builder = Message::builder()
            .from(self.sender.clone())
            .reply_to(reply_to)
            .subject(record.subject_line());
        for recipient in &self.recipients {
            builder = builder.to(recipient.clone());
        }

        let message = builder
            .body(Self::staff_body(record))
            .map_err(|err| MailerError::Transport(err.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|err| MailerError::Transport(err.to_string()))?;
        Ok(())
    }

    async fn send_confirmation(&self, record: &ContactRecord) -> Result<(), MailerError> {
        let to = parse_mailbox(&record.email)?;
        let message = Message::builder()
            .from(self.sender.clone())
            .to(to)
            .subject("Thank You for Contacting BrightWave Enterprises")
            .body(
                "Thank you for your message! We have received your inquiry and will get back \
                 to you soon.\n\nRegards,\nBrightWave Enterprises Team\n"
                    .to_string(),
            )
            .map_err(|err| MailerError::Transport(err.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|err| MailerError::Transport(err.to_string()))?;
        Ok(())
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, MailerError> {
    address
        .parse::<Mailbox>()
        .map_err(|_| MailerError::InvalidAddress {
            address: address.to_string(),
        })
}
