use async_trait::async_trait;
use chrono::DateTime;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::debug;

use crate::{
    config::{TWILIO_BASE_URL, TwilioCredentials},
    error::{RequestError, Service},
    model::SentMessage,
};

use super::Notifier;

/// Sends SMS through the Twilio Messages API.
#[derive(Debug)]
pub struct TwilioNotifier {
    account_sid: String,
    auth_token: SecretString,
    from: String,
    to: String,
    base_url: String,
    http: Client,
}

impl TwilioNotifier {
    pub fn new(credentials: TwilioCredentials, http: Client) -> Self {
        let TwilioCredentials { account_sid, auth_token, from, to } = credentials;
        Self {
            account_sid,
            auth_token,
            from,
            to,
            base_url: TWILIO_BASE_URL.to_string(),
            http,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn messages_url(&self) -> String {
        format!("{}/2010-04-01/Accounts/{}/Messages.json", self.base_url, self.account_sid)
    }
}

#[derive(Debug, Deserialize)]
struct TwMessage {
    sid: String,
    status: String,
    date_created: Option<String>,
}

#[async_trait]
impl Notifier for TwilioNotifier {
    async fn send(&self, message: &str) -> Result<SentMessage, RequestError> {
        let service = Service::Sms;
        debug!(chars = message.chars().count(), "posting message to Twilio");

        let res = self
            .http
            .post(self.messages_url())
            .basic_auth(&self.account_sid, Some(self.auth_token.expose_secret()))
            .form(&[("To", self.to.as_str()), ("From", self.from.as_str()), ("Body", message)])
            .send()
            .await
            .map_err(|e| RequestError::transport(service, e))?;

        let status = res.status();
        let body = res.text().await.map_err(|e| RequestError::transport(service, e))?;

        if !status.is_success() {
            return Err(RequestError::status(service, status, &body));
        }

        let parsed: TwMessage =
            serde_json::from_str(&body).map_err(|source| RequestError::Decode { service, source })?;

        let created_at = parsed
            .date_created
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc2822(raw).ok());

        Ok(SentMessage { sid: parsed.sid, status: parsed.status, created_at })
    }
}
