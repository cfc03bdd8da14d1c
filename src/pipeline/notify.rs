//! Notification stage: email the finished report.

use crate::config::SmtpSettings;
use crate::error::ReportError;
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::path::Path;
use tracing::{info, warn};

/// Delivers a report to a list of recipients.
///
/// `Ok(true)` means the server accepted the message, `Ok(false)` that it was
/// rejected or unreachable. Bad input (no recipients, missing attachment) is
/// an `Err`.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(
        &self,
        subject: &str,
        body: &str,
        recipients: &[String],
        attachment: &Path,
    ) -> Result<bool, ReportError>;
}

/// Check that every address contains both `@` and `.`.
pub fn validate_recipients(recipients: &[String]) -> Result<(), ReportError> {
    if recipients.is_empty() {
        return Err(ReportError::TransportFailed(
            "at least one recipient is required".into(),
        ));
    }
    match recipients
        .iter()
        .find(|r| !r.contains('@') || !r.contains('.'))
    {
        Some(bad) => Err(ReportError::TransportFailed(format!(
            "invalid email address: '{bad}'"
        ))),
        None => Ok(()),
    }
}

/// Validate the message fields and the attachment before talking to a server.
pub fn check_message(
    subject: &str,
    body: &str,
    recipients: &[String],
    attachment: &Path,
) -> Result<(), ReportError> {
    if subject.trim().is_empty() {
        return Err(ReportError::TransportFailed("email subject is required".into()));
    }
    if body.trim().is_empty() {
        return Err(ReportError::TransportFailed("email body is required".into()));
    }
    validate_recipients(recipients)?;
    if !attachment.is_file() {
        return Err(ReportError::AttachmentMissing {
            path: attachment.to_path_buf(),
        });
    }
    Ok(())
}

/// [`Mailer`] speaking SMTP through `lettre`.
///
/// `use_tls` selects STARTTLS on the configured port; otherwise the
/// connection uses implicit TLS from the first byte.
pub struct SmtpMailer {
    settings: SmtpSettings,
}

impl SmtpMailer {
    pub fn new(settings: SmtpSettings) -> Self {
        Self { settings }
    }

    pub fn from_env() -> Result<Self, ReportError> {
        SmtpSettings::from_env().map(Self::new)
    }

    /// Recipients configured through `EMAIL_RECIPIENTS`.
    pub fn default_recipients(&self) -> &[String] {
        &self.settings.recipients
    }

    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, ReportError> {
        let s = &self.settings;
        let builder = if s.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&s.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&s.host)
        }
        .map_err(|e| ReportError::TransportFailed(format!("SMTP setup for {}: {e}", s.host)))?;

        Ok(builder
            .port(s.port)
            .credentials(Credentials::new(s.user.clone(), s.password.clone()))
            .build())
    }

    async fn build_message(
        &self,
        subject: &str,
        body: &str,
        recipients: &[String],
        attachment: &Path,
    ) -> Result<Message, ReportError> {
        let parse_mailbox = |addr: &str| {
            addr.parse::<Mailbox>()
                .map_err(|e| ReportError::TransportFailed(format!("invalid address '{addr}': {e}")))
        };

        let mut builder = Message::builder()
            .from(parse_mailbox(&self.settings.user)?)
            .subject(subject);
        for r in recipients {
            builder = builder.to(parse_mailbox(r)?);
        }

        let data = tokio::fs::read(attachment)
            .await
            .map_err(|_| ReportError::AttachmentMissing {
                path: attachment.to_path_buf(),
            })?;
        let filename = attachment
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "report.pdf".to_string());
        let pdf = ContentType::parse("application/pdf")
            .map_err(|e| ReportError::Internal(format!("content type: {e}")))?;

        builder
            .multipart(
                MultiPart::mixed()
                    .singlepart(SinglePart::plain(body.to_string()))
                    .singlepart(Attachment::new(filename).body(data, pdf)),
            )
            .map_err(|e| ReportError::TransportFailed(format!("could not build message: {e}")))
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(
        &self,
        subject: &str,
        body: &str,
        recipients: &[String],
        attachment: &Path,
    ) -> Result<bool, ReportError> {
        check_message(subject, body, recipients, attachment)?;
        let message = self
            .build_message(subject, body, recipients, attachment)
            .await?;
        let transport = self.transport()?;

        match transport.send(message).await {
            Ok(response) if response.is_positive() => {
                info!("Email sent to {} recipient(s)", recipients.len());
                Ok(true)
            }
            Ok(response) => {
                warn!("SMTP server rejected message: {:?}", response.code());
                Ok(false)
            }
            Err(e) => {
                warn!("SMTP send via {}:{} failed: {}", self.settings.host, self.settings.port, e);
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to(addrs: &[&str]) -> Vec<String> {
        addrs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn recipients_need_at_and_dot() {
        assert!(validate_recipients(&to(&["a@example.com", "b@x.org"])).is_ok());
        assert!(validate_recipients(&to(&["nobody"])).is_err());
        assert!(validate_recipients(&to(&["a@localhost"])).is_err());
        assert!(validate_recipients(&[]).is_err());
    }

    #[test]
    fn missing_attachment_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = check_message("s", "b", &to(&["a@b.c"]), &dir.path().join("gone.pdf"))
            .unwrap_err();
        assert!(matches!(err, ReportError::AttachmentMissing { .. }));
    }

    #[test]
    fn blank_subject_or_body_is_a_transport_failure() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let r = to(&["a@b.c"]);
        assert!(matches!(
            check_message(" ", "b", &r, file.path()),
            Err(ReportError::TransportFailed(_))
        ));
        assert!(matches!(
            check_message("s", "", &r, file.path()),
            Err(ReportError::TransportFailed(_))
        ));
        assert!(check_message("s", "b", &r, file.path()).is_ok());
    }

    #[tokio::test]
    async fn message_carries_pdf_attachment() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.pdf");
        std::fs::write(&path, b"%PDF-1.4").unwrap();

        let mailer = SmtpMailer::new(SmtpSettings {
            host: "smtp.example.com".into(),
            port: 587,
            user: "sender@example.com".into(),
            password: "pw".into(),
            use_tls: true,
            recipients: vec![],
        });
        let message = mailer
            .build_message("Subject", "Body", &to(&["r@example.com"]), &path)
            .await
            .unwrap();
        let raw = String::from_utf8_lossy(&message.formatted()).into_owned();
        assert!(raw.contains("application/pdf"));
        assert!(raw.contains("report.pdf"));
        assert!(raw.contains("r@example.com"));
    }
}
