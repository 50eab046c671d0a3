//! Building the label set of a single log stream.
use crate::LokiError;
use std::collections::BTreeMap;

/// A set of Loki labels. The map is ordered so the serialized stream is stable.
pub type Labels = BTreeMap<String, String>;

/// Ensure no label in `labels` uses an empty name.
pub(crate) fn validate_label_keys(labels: &Labels) -> Result<(), LokiError> {
    if labels.keys().any(|key| key.is_empty()) {
        return Err(LokiError::configuration("label keys cannot be empty"));
    }
    Ok(())
}

/// Merge the global labels, the severity label and the labels of a single call.
///
/// The merge is applied in the order `global` → `severity_key = severity_value` → `per_call`,
/// later entries replacing earlier ones. This means labels of a call even win over the severity
/// label if they use the same key.
///
/// # Example
/// ```
/// use loki_logger_rs::{merge_labels, Labels};
///
/// let global = Labels::from([("app".to_string(), "shop".to_string())]);
/// let merged = merge_labels(&global, None, "level", "info").unwrap();
///
/// assert_eq!(merged["app"], "shop");
/// assert_eq!(merged["level"], "info");
/// ```
pub fn merge_labels(
    global: &Labels,
    per_call: Option<&Labels>,
    severity_key: &str,
    severity_value: &str,
) -> Result<Labels, LokiError> {
    if severity_key.is_empty() {
        return Err(LokiError::configuration("severity label cannot be empty"));
    }
    validate_label_keys(global)?;

    merge_validated_labels(global, per_call, severity_key, severity_value)
}

/// [`merge_labels`] for a `global` set and `severity_key` which were already validated when the
/// logger was built. Only the labels of the call are checked.
pub(crate) fn merge_validated_labels(
    global: &Labels,
    per_call: Option<&Labels>,
    severity_key: &str,
    severity_value: &str,
) -> Result<Labels, LokiError> {
    let mut labels = global.clone();
    labels.insert(severity_key.to_string(), severity_value.to_string());

    if let Some(per_call) = per_call {
        validate_label_keys(per_call)?;
        labels.extend(
            per_call
                .iter()
                .map(|(key, value)| (key.clone(), value.clone())),
        );
    }

    Ok(labels)
}
