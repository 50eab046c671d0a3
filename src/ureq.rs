//! A module which contains the implementation for the [`LokiBackend`] trait which uses the `ureq`
//! crate for network communication.
use crate::{AuthenticationMethod, LokiBackend, LokiError};
use std::time::Duration;
use ureq::Agent;
use url::Url;

/// A [`LokiBackend`] implementation which uses the [ureq](https://crates.io/crates/ureq) crate to
/// send logging messages to a Loki endpoint.
pub(crate) struct UreqBackend {
    /// The loki push endpoint which is used to send log information to
    pub(crate) endpoint: Url,
    /// The authentication method to use when sending the log messages to the remote [`UreqBackend::endpoint`]
    pub(crate) authentication: AuthenticationMethod,
    /// The credentials to use to authenticate against the remote [`UreqBackend::endpoint`]
    pub(crate) credentials: String,
    /// The agent which owns the connection pool
    agent: Agent,
}

impl UreqBackend {
    pub(crate) fn new(
        endpoint: Url,
        authentication: AuthenticationMethod,
        credentials: String,
        timeout: Duration,
    ) -> UreqBackend {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        UreqBackend {
            endpoint,
            authentication,
            credentials,
            agent,
        }
    }
}

impl LokiBackend for UreqBackend {
    fn send(&self, serialized_streams: Vec<u8>) -> Result<(), LokiError> {
        let mut request = self
            .agent
            .post(self.endpoint.as_str())
            .set("Content-Type", "application/json");
        match self.authentication {
            AuthenticationMethod::None => {}
            AuthenticationMethod::Basic => {
                request = request.set(
                    "Authorization",
                    format!("Basic {}", self.credentials).as_str(),
                );
            }
        }

        log::trace!(
            "pushing {} bytes to {}",
            serialized_streams.len(),
            self.endpoint
        );

        // ureq reports every status >= 400 as an error, everything else still has to be checked
        let (status_code, response) = match request.send_bytes(&serialized_streams) {
            Ok(response) => (response.status(), response),
            Err(ureq::Error::Status(status_code, response)) => (status_code, response),
            Err(error) => {
                return Err(LokiError::Connection {
                    url: self.endpoint.to_string(),
                    source: Box::new(error),
                })
            }
        };

        if (200..300).contains(&status_code) {
            log::debug!("Loki accepted the push with status {}", status_code);
            return Ok(());
        }

        Err(LokiError::Push {
            status_code,
            response_text: response.into_string().unwrap_or_default(),
        })
    }

    fn authentication_method(&self) -> AuthenticationMethod {
        self.authentication.clone()
    }
}
