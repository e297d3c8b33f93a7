use crate::config::MailSettings;
use crate::error::{Result, SummaristError};
use crate::models::{OutgoingMail, OutputFormat};
use async_trait::async_trait;
use std::path::Path;

pub const MAIL_SUBJECT: &str = "Summarized Document";
pub const MAIL_BODY: &str = "Please find the summarized document attached.";

/// SMTP reply codes that mean the credentials were refused
const AUTH_FAILURE_CODES: [&str; 3] = ["530", "534", "535"];

/// Mail transport used to deliver written summaries
#[async_trait]
pub trait MailSender: Send + Sync {
    async fn send(&self, mail: &OutgoingMail) -> Result<()>;
}

/// Sends through an authenticated SMTP relay. Credentials are read from the
/// environment on every send.
#[derive(Debug, Default, Clone, Copy)]
pub struct SmtpMailer;

impl SmtpMailer {
    fn build_message(mail: &OutgoingMail, from: &str) -> Result<lettre::Message> {
        use lettre::message::header::ContentType;
        use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};

        let from_mailbox: Mailbox = from.parse().map_err(|e| {
            SummaristError::Delivery(format!("invalid sender address \"{}\": {}", from, e))
        })?;
        let to_mailbox: Mailbox = mail.to.parse().map_err(|e| {
            SummaristError::Delivery(format!("invalid recipient address \"{}\": {}", mail.to, e))
        })?;

        let bytes = std::fs::read(&mail.attachment).map_err(|e| {
            SummaristError::Delivery(format!(
                "cannot attach {}: {}",
                mail.attachment.display(),
                e
            ))
        })?;
        let mime = OutputFormat::from_path(&mail.attachment)
            .map(|f| f.mime_type())
            .unwrap_or("application/octet-stream");
        let content_type = ContentType::parse(mime)
            .map_err(|e| SummaristError::Delivery(format!("invalid attachment type: {}", e)))?;

        lettre::Message::builder()
            .from(from_mailbox)
            .to(to_mailbox)
            .subject(&mail.subject)
            .multipart(
                MultiPart::mixed()
                    .singlepart(SinglePart::plain(mail.body.clone()))
                    .singlepart(
                        Attachment::new(attachment_name(&mail.attachment)).body(bytes, content_type),
                    ),
            )
            .map_err(|e| SummaristError::Delivery(format!("failed to build message: {}", e)))
    }
}

#[async_trait]
impl MailSender for SmtpMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<()> {
        use lettre::transport::smtp::authentication::Credentials;
        use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};

        let settings = MailSettings::from_env()?;
        let message = Self::build_message(mail, &settings.user)?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.smtp_host)
            .map_err(|e| SummaristError::Delivery(format!("invalid SMTP relay: {}", e)))?
            .credentials(Credentials::new(settings.user, settings.password))
            .build();

        transport.send(message).await.map_err(|e| {
            let code = e.status().map(|c| c.to_string());
            match code.as_deref() {
                Some(code) if AUTH_FAILURE_CODES.contains(&code) => {
                    SummaristError::Auth(e.to_string())
                }
                _ => SummaristError::Delivery(e.to_string()),
            }
        })?;

        Ok(())
    }
}

fn attachment_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Delivers written summary files as email attachments
pub struct Notifier {
    sender: Box<dyn MailSender>,
}

impl Notifier {
    pub fn new(sender: Box<dyn MailSender>) -> Self {
        Self { sender }
    }

    pub async fn notify(&self, attachment: &Path, recipient: &str) -> Result<()> {
        let mail = OutgoingMail {
            to: recipient.trim().to_string(),
            subject: MAIL_SUBJECT.to_string(),
            body: MAIL_BODY.to_string(),
            attachment: attachment.to_path_buf(),
        };

        match self.sender.send(&mail).await {
            Ok(()) => {
                tracing::info!("Sent {} to {}", attachment.display(), mail.to);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Failed to email {} to {}: {}", attachment.display(), mail.to, e);
                Err(e)
            }
        }
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(Box::new(SmtpMailer))
    }
}
