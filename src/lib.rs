#![doc = include_str!("../README.md")]

mod config;
mod error;
mod labels;
mod message;
mod payload;
#[cfg(feature = "reqwest-async")]
mod reqwest;
#[cfg(feature = "ureq")]
mod ureq;

pub use crate::config::{DEFAULT_PUSH_PATH, DEFAULT_SEVERITY_LABEL};
pub use crate::error::LokiError;
pub use crate::labels::{merge_labels, Labels};
pub use crate::message::{format_line, Extras, Message};
#[cfg(feature = "reqwest-async")]
pub use crate::reqwest::AsyncLokiLogger;

use crate::config::PushConfig;
#[cfg(feature = "structured_logging")]
use log::kv::{Key, Value as KvValue, VisitSource};
use log::{Log, Metadata, Record};
use std::time::Duration;
use url::Url;

/// The time after which a push request is aborted if nothing else was configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Targets whose records are never forwarded to Loki by the [`Log`] implementation since pushing
/// them would log the push itself
const IGNORED_TARGETS: [&str; 5] = ["ureq", "reqwest", "hyper", "rustls", "loki_logger_rs"];

/// The `AuthenticationMethod` enum is used to specify the authentication method to use when
/// sending the log messages to the remote endpoint.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum AuthenticationMethod {
    /// Do not use any authentication when sending the log messages to the remote endpoint
    None,
    /// Use the HTTP Basic Auth when sending the log messages to the remote endpoint
    Basic,
}

/// The `LokiBackend` trait is used to specify the interfaces which are required for the blocking
/// communication with the remote endpoint.
pub(crate) trait LokiBackend {
    /// Sends an already serialized push body to the configured remote endpoint
    fn send(&self, serialized_streams: Vec<u8>) -> Result<(), LokiError>;

    /// Get the configured `AuthenticationMethod` for the backend
    fn authentication_method(&self) -> AuthenticationMethod;
}

/// The `LokiLogger` struct implements the communication interface with a [Loki](https://grafana.com/oss/loki/)
/// instance.
///
/// Every call of one of the logging methods results in exactly one blocking push request. Errors
/// are returned to the caller and never retried.
///
/// To create a new instance of the `LokiLogger` struct use the [`LokiLoggerBuilder`] struct.
pub struct LokiLogger {
    config: PushConfig,
    backend: Box<dyn LokiBackend + Send + Sync>,
}

impl LokiLogger {
    /// Create a new `LokiLoggerBuilder` for the Loki instance reachable at `base_url`.
    ///
    /// The base URL is validated when [`LokiLoggerBuilder::build`] is called.
    ///
    /// # Example
    /// ```
    /// use loki_logger_rs::LokiLogger;
    ///
    /// let builder = LokiLogger::builder("https://loki.example.com");
    /// ```
    pub fn builder(base_url: &str) -> LokiLoggerBuilder {
        LokiLoggerBuilder {
            base_url: base_url.to_string(),
            push_path: DEFAULT_PUSH_PATH.to_string(),
            authentication: AuthenticationMethod::None,
            credentials: "".to_string(),
            severity_label: DEFAULT_SEVERITY_LABEL.to_string(),
            labels: Labels::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// The full URL of the push endpoint the entries are sent to
    pub fn endpoint(&self) -> &Url {
        &self.config.endpoint
    }

    /// The label key which holds the severity of an entry
    pub fn severity_label(&self) -> &str {
        &self.config.severity_label
    }

    /// The labels attached to every entry
    pub fn labels(&self) -> &Labels {
        &self.config.labels
    }

    /// Push a message with the severity `debug`.
    pub fn debug(
        &self,
        message: impl Into<Message>,
        extras: Option<&Extras>,
        labels: Option<&Labels>,
    ) -> Result<(), LokiError> {
        self.push("debug", &message.into(), extras, labels)
    }

    /// Push a message with the severity `info`.
    ///
    /// # Example
    /// ```no_run
    /// use loki_logger_rs::{Labels, LokiLogger};
    ///
    /// let logger = LokiLogger::builder("https://loki.example.com").build().unwrap();
    /// let labels = Labels::from([("version".to_string(), "1.0.0".to_string())]);
    ///
    /// logger.info("Application started", None, Some(&labels)).unwrap();
    /// ```
    pub fn info(
        &self,
        message: impl Into<Message>,
        extras: Option<&Extras>,
        labels: Option<&Labels>,
    ) -> Result<(), LokiError> {
        self.push("info", &message.into(), extras, labels)
    }

    /// Push a message with the severity `warn`.
    pub fn warn(
        &self,
        message: impl Into<Message>,
        extras: Option<&Extras>,
        labels: Option<&Labels>,
    ) -> Result<(), LokiError> {
        self.push("warn", &message.into(), extras, labels)
    }

    /// Push a message with the severity `error`.
    ///
    /// # Example
    /// ```no_run
    /// use loki_logger_rs::LokiLogger;
    /// use serde_json::json;
    ///
    /// let logger = LokiLogger::builder("https://loki.example.com").build().unwrap();
    /// let extras = json!({"db": "postgres"});
    ///
    /// logger.error("Database connection failed", extras.as_object(), None).unwrap();
    /// ```
    pub fn error(
        &self,
        message: impl Into<Message>,
        extras: Option<&Extras>,
        labels: Option<&Labels>,
    ) -> Result<(), LokiError> {
        self.push("error", &message.into(), extras, labels)
    }

    /// Push a message with a severity chosen by the caller (e.g. `critical` or `fatal`).
    ///
    /// An empty `level` is rejected with [`LokiError::Configuration`].
    pub fn custom_level(
        &self,
        level: &str,
        message: impl Into<Message>,
        extras: Option<&Extras>,
        labels: Option<&Labels>,
    ) -> Result<(), LokiError> {
        self.push(level, &message.into(), extras, labels)
    }

    fn push(
        &self,
        level: &str,
        message: &Message,
        extras: Option<&Extras>,
        labels: Option<&Labels>,
    ) -> Result<(), LokiError> {
        let body = self.config.push_body(level, message, extras, labels)?;
        self.backend.send(body)
    }
}

impl std::fmt::Debug for LokiLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LokiLogger")
            .field("endpoint", &self.config.endpoint.as_str())
            .field("severity_label", &self.config.severity_label)
            .field("labels", &self.config.labels)
            .field("authentication", &self.backend.authentication_method())
            .finish()
    }
}

impl Log for LokiLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        // we do want to ignore logs which are created by the used networking library (or by
        // ourselves) since this would create an infinite loop
        let target = metadata.target();
        !IGNORED_TARGETS
            .iter()
            .any(|ignored| target.starts_with(ignored))
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let level = record.level().as_str().to_lowercase();
        let message = Message::Text(record.args().to_string());

        #[cfg(feature = "structured_logging")]
        let extras = {
            let mut visitor = ExtrasVisitor::default();
            if let Err(error) = record.key_values().visit(&mut visitor) {
                log::warn!("could not read the key-values of a log record: {}", error);
            }
            visitor.extras
        };
        #[cfg(not(feature = "structured_logging"))]
        let extras = Extras::new();

        if let Err(error) = self.custom_level(&level, message, Some(&extras), None) {
            log::error!("could not send a log record to Loki: {}", error);
        }
    }

    fn flush(&self) {
        // every record is pushed immediately, so there is nothing to flush
    }
}

/// Collects the key-values of a log record as extras
#[cfg(feature = "structured_logging")]
#[derive(Default)]
struct ExtrasVisitor {
    extras: Extras,
}

#[cfg(feature = "structured_logging")]
impl<'kvs> VisitSource<'kvs> for ExtrasVisitor {
    fn visit_pair(&mut self, key: Key<'kvs>, value: KvValue<'kvs>) -> Result<(), log::kv::Error> {
        self.extras
            .insert(key.as_str().to_string(), extra_value(&value));
        Ok(())
    }
}

/// Keep booleans and numbers as JSON scalars, everything else becomes a string
#[cfg(feature = "structured_logging")]
fn extra_value(value: &KvValue) -> serde_json::Value {
    if let Some(boolean) = value.to_bool() {
        return serde_json::Value::Bool(boolean);
    }
    if let Some(number) = value.to_i64() {
        return serde_json::Value::from(number);
    }
    if let Some(number) = value.to_u64() {
        return serde_json::Value::from(number);
    }
    if let Some(number) = value.to_f64().and_then(serde_json::Number::from_f64) {
        return serde_json::Value::Number(number);
    }
    serde_json::Value::String(value.to_string())
}

/// The `LokiLoggerBuilder` struct is used to create a new instance of [`LokiLogger`] using the
/// builder pattern.
pub struct LokiLoggerBuilder {
    /// The base URL of the Loki instance, without a trailing slash
    base_url: String,
    /// The path of the push API, appended to the `base_url`
    push_path: String,
    /// The `authentication` method to use when sending the log messages to the remote endpoint
    authentication: AuthenticationMethod,
    /// The `credentials` to use to authenticate against the remote endpoint
    credentials: String,
    /// The label key which holds the severity of an entry
    severity_label: String,
    /// Labels which should be attached to all log messages
    labels: Labels,
    /// The time after which a push request is aborted
    timeout: Duration,
}

impl LokiLoggerBuilder {
    /// Use another path than [`DEFAULT_PUSH_PATH`] for the push API. The path has to start with a `/`.
    ///
    /// The path is used exactly as given. A path which URL parsing would rewrite (dot segments like
    /// `/a/../push`, characters which need percent-encoding, a query) makes
    /// [`LokiLoggerBuilder::build`] fail with [`LokiError::Configuration`].
    ///
    /// # Example
    /// ```
    /// use loki_logger_rs::LokiLogger;
    ///
    /// let builder = LokiLogger::builder("https://loki.example.com")
    ///     .push_path("/custom/api/push");
    /// ```
    pub fn push_path(mut self, push_path: &str) -> LokiLoggerBuilder {
        self.push_path = push_path.to_string();
        self
    }

    /// Ensure our client uses the supplied credentials for authentication against the remote endpoint.
    ///
    /// # Example
    /// ```
    /// use loki_logger_rs::{AuthenticationMethod, LokiLogger};
    ///
    /// let builder = LokiLogger::builder("https://loki.example.com")
    ///     .with_authentication(AuthenticationMethod::Basic, "foo".to_string(), "bar".to_string());
    /// ```
    pub fn with_authentication(
        mut self,
        method: AuthenticationMethod,
        username: String,
        password: String,
    ) -> LokiLoggerBuilder {
        match method {
            AuthenticationMethod::None => {
                self.credentials = "".to_string();
            }
            AuthenticationMethod::Basic => {
                use base64::{engine::general_purpose, Engine};
                let b64_credentials =
                    general_purpose::STANDARD.encode(format!("{}:{}", username, password));
                self.credentials = b64_credentials;
            }
        }

        self.authentication = method;
        self
    }

    /// Use `severity_label` instead of [`DEFAULT_SEVERITY_LABEL`] as the label key for the severity.
    pub fn severity_label(mut self, severity_label: &str) -> LokiLoggerBuilder {
        self.severity_label = severity_label.to_string();
        self
    }

    /// Add a label to all logging messages which are sent to Loki.
    ///
    /// # Example
    /// ```
    /// use loki_logger_rs::LokiLogger;
    ///
    /// let builder = LokiLogger::builder("https://loki.example.com")
    ///     .label("service", "service_name")
    ///     .label("environment", "production");
    /// ```
    pub fn label(mut self, name: &str, value: &str) -> LokiLoggerBuilder {
        self.labels.insert(name.to_string(), value.to_string());
        self
    }

    /// Add all `labels` to the logging messages which are sent to Loki (this might overwrite
    /// labels added before).
    pub fn labels(mut self, labels: Labels) -> LokiLoggerBuilder {
        self.labels.extend(labels);
        self
    }

    /// Abort push requests which take longer than `timeout`.
    pub fn timeout(mut self, timeout: Duration) -> LokiLoggerBuilder {
        self.timeout = timeout;
        self
    }

    fn push_config(&self) -> Result<PushConfig, LokiError> {
        PushConfig::new(
            &self.base_url,
            &self.push_path,
            self.severity_label.clone(),
            self.labels.clone(),
        )
    }

    /// Create a new blocking `LokiLogger` instance with the parameters supplied to this struct.
    ///
    /// Fails with [`LokiError::Configuration`] if the configuration is invalid.
    ///
    /// # Example
    /// ```
    /// use loki_logger_rs::LokiLogger;
    ///
    /// let logger = LokiLogger::builder("https://loki.example.com")
    ///     .label("app", "my-app")
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(logger.endpoint().as_str(), "https://loki.example.com/loki/api/v1/push");
    /// ```
    #[cfg(feature = "ureq")]
    pub fn build(self) -> Result<LokiLogger, LokiError> {
        use crate::ureq::UreqBackend;

        let config = self.push_config()?;
        let backend = UreqBackend::new(
            config.endpoint.clone(),
            self.authentication,
            self.credentials,
            self.timeout,
        );

        log::debug!("created a Loki logger pushing to {}", config.endpoint);
        Ok(LokiLogger {
            config,
            backend: Box::new(backend),
        })
    }
}
