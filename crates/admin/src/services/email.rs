//! Email delivery over SMTP with Askama templates.

use askama::Template;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use crate::config::EmailConfig;

/// HTML template for the signup verification code email.
#[derive(Template)]
#[template(path = "email/verification_code.html")]
struct VerificationCodeEmailHtml<'a> {
    code: &'a str,
    church_name: &'a str,
}

/// Plain text template for the signup verification code email.
#[derive(Template)]
#[template(path = "email/verification_code.txt")]
struct VerificationCodeEmailText<'a> {
    code: &'a str,
    church_name: &'a str,
}

/// HTML template for the post-signup welcome email.
#[derive(Template)]
#[template(path = "email/welcome.html")]
struct WelcomeEmailHtml<'a> {
    name: &'a str,
    church_name: &'a str,
}

/// Plain text template for the post-signup welcome email.
#[derive(Template)]
#[template(path = "email/welcome.txt")]
struct WelcomeEmailText<'a> {
    name: &'a str,
    church_name: &'a str,
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// Email service for transactional delivery.
#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    church_name: String,
}

impl EmailService {
    /// Create a new email service from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the SMTP relay cannot be configured or the
    /// sender address is invalid.
    pub fn new(config: &EmailConfig) -> Result<Self, EmailError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_owned(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        let from = format!("{} <{}>", config.from_name, config.from_address)
            .parse()
            .map_err(|_| EmailError::InvalidAddress(config.from_address.clone()))?;

        Ok(Self {
            mailer,
            from,
            church_name: config.from_name.clone(),
        })
    }

    /// Send the 6-digit signup verification code.
    ///
    /// # Errors
    ///
    /// Returns an error if the template fails to render or delivery fails.
    pub async fn send_verification_code(&self, to: &str, code: &str) -> Result<(), EmailError> {
        let church_name = self.church_name.as_str();
        let html = VerificationCodeEmailHtml { code, church_name }.render()?;
        let text = VerificationCodeEmailText { code, church_name }.render()?;

        self.send_multipart(to, &format!("Your {church_name} verification code"), &text, &html)
            .await
    }

    /// Send the welcome email after a verified signup.
    ///
    /// # Errors
    ///
    /// Returns an error if the template fails to render or delivery fails.
    pub async fn send_welcome(&self, to: &str, name: &str) -> Result<(), EmailError> {
        let church_name = self.church_name.as_str();
        let html = WelcomeEmailHtml { name, church_name }.render()?;
        let text = WelcomeEmailText { name, church_name }.render()?;

        self.send_multipart(to, &format!("Welcome to {church_name}"), &text, &html)
            .await
    }

    /// Send a caller-composed email (the `/api/email/send` endpoint).
    ///
    /// # Errors
    ///
    /// Returns an error if delivery fails.
    pub async fn send_raw(
        &self,
        to: &str,
        subject: &str,
        html: &str,
        text: Option<&str>,
    ) -> Result<(), EmailError> {
        match text {
            Some(text) => self.send_multipart(to, subject, text, html).await,
            None => {
                let email = Message::builder()
                    .from(self.from.clone())
                    .to(parse_mailbox(to)?)
                    .subject(subject)
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html.to_owned()),
                    )?;
                self.deliver(email, to, subject).await
            }
        }
    }

    /// Send a multipart email with both plain text and HTML versions.
    async fn send_multipart(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), EmailError> {
        let email = Message::builder()
            .from(self.from.clone())
            .to(parse_mailbox(to)?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_body.to_owned()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body.to_owned()),
                    ),
            )?;

        self.deliver(email, to, subject).await
    }

    async fn deliver(&self, email: Message, to: &str, subject: &str) -> Result<(), EmailError> {
        self.mailer.send(email).await?;
        tracing::info!(to = %to, subject = %subject, "Email sent");
        Ok(())
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, EmailError> {
    address
        .parse()
        .map_err(|_| EmailError::InvalidAddress(address.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::parse_mailbox;

    #[test]
    fn mailbox_parsing() {
        assert!(parse_mailbox("jordan@example.com").is_ok());
        assert!(parse_mailbox("Jordan <jordan@example.com>").is_ok());
        assert!(parse_mailbox("not an address").is_err());
    }
}
