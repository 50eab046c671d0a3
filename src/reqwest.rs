//! A module which contains the asynchronous logger which uses the `reqwest` crate for network
//! communication.

use crate::config::PushConfig;
use crate::{AuthenticationMethod, Extras, Labels, LokiError, LokiLoggerBuilder, Message};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use url::Url;

/// Sends push bodies with the [reqwest](https://crates.io/crates/reqwest) crate.
pub(crate) struct ReqwestBackend {
    /// The loki push endpoint which is used to send log information to
    pub(crate) endpoint: Url,
    /// The authentication method to use when sending the log messages to the remote [`ReqwestBackend::endpoint`]
    pub(crate) authentication: AuthenticationMethod,
    /// The credentials to use to authenticate against the remote [`ReqwestBackend::endpoint`]
    pub(crate) credentials: String,
    /// Internal client
    pub(crate) client: Client,
}

impl ReqwestBackend {
    pub(crate) async fn send(&self, serialized_streams: Vec<u8>) -> Result<(), LokiError> {
        let mut builder = self
            .client
            .post(self.endpoint.as_str())
            .header(CONTENT_TYPE, "application/json");
        if let AuthenticationMethod::Basic = self.authentication {
            builder = builder.header(AUTHORIZATION, format!("Basic {}", self.credentials));
        }

        log::trace!(
            "pushing {} bytes to {}",
            serialized_streams.len(),
            self.endpoint
        );

        let response = builder
            .body(serialized_streams)
            .send()
            .await
            .map_err(|error| LokiError::Connection {
                url: self.endpoint.to_string(),
                source: Box::new(error),
            })?;

        let status = response.status();
        if status.is_success() {
            log::debug!("Loki accepted the push with status {}", status);
            return Ok(());
        }

        Err(LokiError::Push {
            status_code: status.as_u16(),
            response_text: response.text().await.unwrap_or_default(),
        })
    }
}

/// The asynchronous counterpart of [`crate::LokiLogger`].
///
/// Every awaited call of one of the logging methods results in exactly one push request, its
/// outcome is returned to the caller. Create it with [`LokiLoggerBuilder::build_async`].
pub struct AsyncLokiLogger {
    config: PushConfig,
    backend: ReqwestBackend,
}

impl AsyncLokiLogger {
    /// The full URL of the push endpoint the entries are sent to
    pub fn endpoint(&self) -> &Url {
        &self.config.endpoint
    }

    /// Push a message with the severity `debug`.
    pub async fn debug(
        &self,
        message: impl Into<Message>,
        extras: Option<&Extras>,
        labels: Option<&Labels>,
    ) -> Result<(), LokiError> {
        self.push("debug", &message.into(), extras, labels).await
    }

    /// Push a message with the severity `info`.
    pub async fn info(
        &self,
        message: impl Into<Message>,
        extras: Option<&Extras>,
        labels: Option<&Labels>,
    ) -> Result<(), LokiError> {
        self.push("info", &message.into(), extras, labels).await
    }

    /// Push a message with the severity `warn`.
    pub async fn warn(
        &self,
        message: impl Into<Message>,
        extras: Option<&Extras>,
        labels: Option<&Labels>,
    ) -> Result<(), LokiError> {
        self.push("warn", &message.into(), extras, labels).await
    }

    /// Push a message with the severity `error`.
    pub async fn error(
        &self,
        message: impl Into<Message>,
        extras: Option<&Extras>,
        labels: Option<&Labels>,
    ) -> Result<(), LokiError> {
        self.push("error", &message.into(), extras, labels).await
    }

    /// Push a message with a severity chosen by the caller.
    pub async fn custom_level(
        &self,
        level: &str,
        message: impl Into<Message>,
        extras: Option<&Extras>,
        labels: Option<&Labels>,
    ) -> Result<(), LokiError> {
        self.push(level, &message.into(), extras, labels).await
    }

    async fn push(
        &self,
        level: &str,
        message: &Message,
        extras: Option<&Extras>,
        labels: Option<&Labels>,
    ) -> Result<(), LokiError> {
        let body = self.config.push_body(level, message, extras, labels)?;
        self.backend.send(body).await
    }
}

impl LokiLoggerBuilder {
    /// Create a new `AsyncLokiLogger` instance with the parameters supplied to this struct.
    ///
    /// # Example
    /// ```
    /// use loki_logger_rs::LokiLogger;
    ///
    /// let logger = LokiLogger::builder("https://loki.example.com")
    ///     .build_async()
    ///     .unwrap();
    /// ```
    pub fn build_async(self) -> Result<AsyncLokiLogger, LokiError> {
        let config = self.push_config()?;
        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|error| {
                LokiError::configuration(format!("could not create the HTTP client: {}", error))
            })?;

        log::debug!("created an async Loki logger pushing to {}", config.endpoint);
        Ok(AsyncLokiLogger {
            backend: ReqwestBackend {
                endpoint: config.endpoint.clone(),
                authentication: self.authentication,
                credentials: self.credentials,
                client,
            },
            config,
        })
    }
}
