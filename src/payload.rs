//! The JSON body of a request against the Loki push API.
use crate::labels::Labels;
use crate::LokiError;
use serde::Serialize;

/// A single Loki stream: a label set and the entries belonging to it
#[derive(Debug, Serialize)]
pub(crate) struct Stream {
    /// The labels identifying the stream
    pub(crate) stream: Labels,
    /// The `(timestamp in nanoseconds, line)` pairs of the stream
    pub(crate) values: Vec<(String, String)>,
}

/// The body of a push request
#[derive(Debug, Serialize)]
pub(crate) struct Streams {
    pub(crate) streams: Vec<Stream>,
}

impl Streams {
    /// A push body with exactly one stream holding exactly one entry.
    pub(crate) fn single(labels: Labels, line: String, timestamp_nanos: u128) -> Streams {
        Streams {
            streams: vec![Stream {
                stream: labels,
                values: vec![(timestamp_nanos.to_string(), line)],
            }],
        }
    }

    pub(crate) fn to_json(&self) -> Result<Vec<u8>, LokiError> {
        serde_json::to_vec(self).map_err(|error| {
            LokiError::configuration(format!("could not serialize the push payload: {}", error))
        })
    }
}

/// The current wall-clock time in nanoseconds since the Unix epoch.
///
/// A clock set before the epoch yields `0`.
pub(crate) fn timestamp_nanos() -> u128 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos()
}
