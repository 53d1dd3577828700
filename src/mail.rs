use anyhow::{Context, Result};
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::Config;

/// A fully composed email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
    pub reply_to: Option<String>,
}

/// Outbound mail transport.
pub trait Mailer: Send + Sync {
    fn send<'a>(&'a self, mail: &'a OutgoingMail) -> BoxFuture<'a, Result<()>>;
}

#[derive(Debug, Serialize)]
struct Address<'a> {
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct SendMailRequest<'a> {
    from: Address<'a>,
    to: Vec<Address<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<Address<'a>>,
    subject: &'a str,
    html: &'a str,
    text: &'a str,
}

/// Sends mail through an HTTP relay API with bearer authentication.
pub struct HttpMailer {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
    from_address: String,
    from_name: String,
}

impl HttpMailer {
    pub fn new(
        api_url: impl Into<String>,
        api_key: Option<String>,
        from_address: impl Into<String>,
        from_name: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.into(),
            api_key,
            from_address: from_address.into(),
            from_name: from_name.into(),
        }
    }

    async fn deliver(&self, mail: &OutgoingMail) -> Result<()> {
        let request = SendMailRequest {
            from: Address {
                email: &self.from_address,
                name: Some(&self.from_name).filter(|n| !n.is_empty()).map(String::as_str),
            },
            to: vec![Address {
                email: &mail.to,
                name: None,
            }],
            reply_to: mail.reply_to.as_deref().map(|email| Address { email, name: None }),
            subject: &mail.subject,
            html: &mail.html_body,
            text: &mail.text_body,
        };

        let mut builder = self.client.post(&self.api_url).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .context("Failed to send request to mail API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Mail API error ({}): {}", status, body);
        }

        debug!("Mail '{}' accepted by relay", mail.subject);
        Ok(())
    }
}

impl Mailer for HttpMailer {
    fn send<'a>(&'a self, mail: &'a OutgoingMail) -> BoxFuture<'a, Result<()>> {
        self.deliver(mail).boxed()
    }
}

/// Logs mails instead of sending them. Used when no relay is configured.
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send<'a>(&'a self, mail: &'a OutgoingMail) -> BoxFuture<'a, Result<()>> {
        async move {
            info!(
                to = %mail.to,
                reply_to = ?mail.reply_to,
                "Mail relay not configured, logging mail '{}':\n{}",
                mail.subject,
                mail.text_body
            );
            Ok(())
        }
        .boxed()
    }
}

/// Pick the transport described by the configuration.
pub fn from_config(config: &Config) -> Box<dyn Mailer> {
    match &config.mail_api_url {
        Some(url) => Box::new(HttpMailer::new(
            url.clone(),
            config.mail_api_key.clone(),
            config.mail_from_address.clone(),
            config.mail_from_name.clone(),
        )),
        None => Box::new(LogMailer),
    }
}
