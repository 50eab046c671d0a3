//! The validated, immutable configuration shared by the blocking and the async logger.
use crate::labels::{merge_validated_labels, validate_label_keys, Labels};
use crate::message::{format_line, Extras, Message};
use crate::payload::{timestamp_nanos, Streams};
use crate::LokiError;
use url::Url;

/// The path of the push API of a Loki instance
pub const DEFAULT_PUSH_PATH: &str = "/loki/api/v1/push";

/// The label key used for the severity of a log entry if nothing else was configured
pub const DEFAULT_SEVERITY_LABEL: &str = "level";

/// Validate the base URL and the push path and join them into the URL of the push endpoint.
pub(crate) fn endpoint_url(base_url: &str, push_path: &str) -> Result<Url, LokiError> {
    if base_url.is_empty() {
        return Err(LokiError::configuration("base URL cannot be empty"));
    }
    if base_url.ends_with('/') {
        return Err(LokiError::configuration("base URL must not end with /"));
    }
    if !push_path.starts_with('/') {
        return Err(LokiError::configuration("push path must start with /"));
    }

    let base = Url::parse(base_url).map_err(|error| {
        LokiError::configuration(format!("base URL `{}` is invalid: {}", base_url, error))
    })?;
    if base.scheme() != "http" && base.scheme() != "https" {
        return Err(LokiError::configuration(format!(
            "base URL must use the http or https scheme, not `{}`",
            base.scheme()
        )));
    }
    if base.host_str().is_none() {
        return Err(LokiError::configuration("base URL must contain a host"));
    }
    if base.query().is_some() || base.fragment().is_some() {
        return Err(LokiError::configuration(
            "base URL must not contain a query or a fragment",
        ));
    }

    let endpoint = Url::parse(&format!("{}{}", base_url, push_path)).map_err(|error| {
        LokiError::configuration(format!("push path `{}` is invalid: {}", push_path, error))
    })?;

    // parsing resolves dot segments and percent-encodes, the path has to survive that unchanged
    let expected_path = format!("{}{}", base.path().trim_end_matches('/'), push_path);
    if endpoint.path() != expected_path {
        return Err(LokiError::configuration(format!(
            "push path `{}` is not a normalized URL path (it would be sent as `{}`)",
            push_path,
            endpoint.path()
        )));
    }

    Ok(endpoint)
}

/// Reject `https` endpoints if no transport with TLS support was compiled in.
pub(crate) fn ensure_tls_available(endpoint: &Url) -> Result<(), LokiError> {
    if endpoint.scheme() == "https" && !cfg!(feature = "rustls") {
        return Err(LokiError::configuration(
            "https requires the rustls feature",
        ));
    }
    Ok(())
}

/// Everything needed to turn a log call into a push request body
#[derive(Clone, Debug)]
pub(crate) struct PushConfig {
    /// The full URL of the push endpoint
    pub(crate) endpoint: Url,
    /// The label key which receives the severity of an entry
    pub(crate) severity_label: String,
    /// Labels attached to every entry
    pub(crate) labels: Labels,
}

impl PushConfig {
    pub(crate) fn new(
        base_url: &str,
        push_path: &str,
        severity_label: String,
        labels: Labels,
    ) -> Result<PushConfig, LokiError> {
        let endpoint = endpoint_url(base_url, push_path)?;
        ensure_tls_available(&endpoint)?;
        if severity_label.is_empty() {
            return Err(LokiError::configuration("severity label cannot be empty"));
        }
        validate_label_keys(&labels)?;

        Ok(PushConfig {
            endpoint,
            severity_label,
            labels,
        })
    }

    /// Create the serialized push body for a single entry.
    ///
    /// The timestamp of the entry is taken after all inputs were validated and formatted.
    pub(crate) fn push_body(
        &self,
        level: &str,
        message: &Message,
        extras: Option<&Extras>,
        labels: Option<&Labels>,
    ) -> Result<Vec<u8>, LokiError> {
        if level.is_empty() {
            return Err(LokiError::configuration("severity level cannot be empty"));
        }

        let labels = merge_validated_labels(&self.labels, labels, &self.severity_label, level)?;
        let line = format_line(message, extras);

        Streams::single(labels, line, timestamp_nanos()).to_json()
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{endpoint_url, ensure_tls_available, PushConfig, DEFAULT_PUSH_PATH};
    use crate::{Labels, LokiError, Message};
    use serde_json::Value;

    fn assert_configuration_error(result: Result<url::Url, LokiError>, expected: &str) {
        match result {
            Err(LokiError::Configuration(message)) => assert!(
                message.contains(expected),
                "`{}` does not contain `{}`",
                message,
                expected
            ),
            other => panic!("expected a configuration error, got {:?}", other),
        }
    }

    #[test]
    fn valid_base_urls_are_joined_with_the_push_path() {
        for base in [
            "https://loki.example.com",
            "http://localhost:3100",
            "http://127.0.0.1:3100/prefix",
        ] {
            let endpoint = endpoint_url(base, DEFAULT_PUSH_PATH).unwrap();
            assert_eq!(endpoint.as_str(), format!("{}{}", base, DEFAULT_PUSH_PATH));
        }
    }

    #[test]
    fn a_custom_push_path_is_used() {
        let endpoint = endpoint_url("https://loki.example.com", "/custom/push").unwrap();
        assert_eq!(endpoint.as_str(), "https://loki.example.com/custom/push");
    }

    #[test]
    fn an_empty_base_url_is_rejected() {
        assert_configuration_error(endpoint_url("", DEFAULT_PUSH_PATH), "cannot be empty");
    }

    #[test]
    fn a_trailing_slash_is_rejected() {
        assert_configuration_error(
            endpoint_url("https://loki.example.com/", DEFAULT_PUSH_PATH),
            "must not end with /",
        );
    }

    #[test]
    fn push_paths_have_to_start_with_a_slash() {
        assert_configuration_error(
            endpoint_url("https://loki.example.com", "invalid"),
            "must start with /",
        );
        assert_configuration_error(endpoint_url("https://loki.example.com", ""), "must start with /");
    }

    #[test]
    fn base_urls_need_an_http_scheme() {
        assert_configuration_error(endpoint_url("loki.example.com", DEFAULT_PUSH_PATH), "invalid");
        assert_configuration_error(
            endpoint_url("ftp://loki.example.com", DEFAULT_PUSH_PATH),
            "http or https",
        );
    }

    #[test]
    fn base_urls_must_not_carry_a_query() {
        assert_configuration_error(
            endpoint_url("https://loki.example.com?tenant=a", DEFAULT_PUSH_PATH),
            "query",
        );
    }

    #[test]
    fn push_paths_changed_by_url_normalization_are_rejected() {
        assert_configuration_error(
            endpoint_url("https://loki.example.com", "/a/../push"),
            "would be sent as `/push`",
        );
        assert_configuration_error(
            endpoint_url("https://loki.example.com", "/a b"),
            "would be sent as `/a%20b`",
        );
        assert_configuration_error(
            endpoint_url("https://loki.example.com", "/push?tenant=a"),
            "not a normalized URL path",
        );
    }

    #[test]
    fn push_paths_below_a_base_path_are_kept() {
        let endpoint = endpoint_url("http://127.0.0.1:3100/prefix", "/api/push").unwrap();
        assert_eq!(endpoint.path(), "/prefix/api/push");
    }

    #[cfg(not(feature = "rustls"))]
    #[test]
    fn https_endpoints_need_a_tls_backend() {
        let endpoint = endpoint_url("https://loki.example.com", DEFAULT_PUSH_PATH).unwrap();
        assert_configuration_error(
            ensure_tls_available(&endpoint).map(|_| endpoint),
            "https requires the rustls feature",
        );
    }

    #[cfg(feature = "rustls")]
    #[test]
    fn https_endpoints_are_accepted_with_a_tls_backend() {
        let endpoint = endpoint_url("https://loki.example.com", DEFAULT_PUSH_PATH).unwrap();
        assert!(ensure_tls_available(&endpoint).is_ok());
    }

    #[test]
    fn http_endpoints_never_need_a_tls_backend() {
        let endpoint = endpoint_url("http://localhost:3100", DEFAULT_PUSH_PATH).unwrap();
        assert!(ensure_tls_available(&endpoint).is_ok());
    }

    #[test]
    fn an_empty_severity_label_is_rejected() {
        let result = PushConfig::new(
            "http://loki.example.com",
            DEFAULT_PUSH_PATH,
            String::new(),
            Labels::new(),
        );
        assert!(matches!(result, Err(LokiError::Configuration(_))));
    }

    #[test]
    fn the_push_body_uses_the_given_level() {
        let config = PushConfig::new(
            "http://loki.example.com",
            DEFAULT_PUSH_PATH,
            "severity".to_string(),
            Labels::from([("app".to_string(), "test-app".to_string())]),
        )
        .unwrap();

        let body = config
            .push_body("critical", &Message::from("disk full"), None, None)
            .unwrap();

        let body: Value = serde_json::from_slice(&body).unwrap();
        let stream = &body["streams"][0];
        assert_eq!(stream["stream"]["severity"], "critical");
        assert_eq!(stream["stream"]["app"], "test-app");
        assert_eq!(stream["values"][0][1], "disk full");
        assert!(stream["values"][0][0]
            .as_str()
            .unwrap()
            .parse::<u128>()
            .is_ok());
    }

    #[test]
    fn an_empty_level_is_rejected() {
        let config = PushConfig::new(
            "http://loki.example.com",
            DEFAULT_PUSH_PATH,
            "level".to_string(),
            Labels::new(),
        )
        .unwrap();

        let result = config.push_body("", &Message::from("message"), None, None);

        assert!(matches!(result, Err(LokiError::Configuration(_))));
    }
}
