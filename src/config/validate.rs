use super::{FirebaseOptions, OptionField};
use thiserror::Error;
use tracing::info;

/// Longest prefix of a sensitive value that may ever be logged.
pub const PREVIEW_MAX_CHARS: usize = 10;

/// One or more required configuration fields were absent or empty.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("missing required Firebase configuration: {}", join_names(.missing))]
pub struct MissingConfigurationError {
    /// Every missing field, in declaration order.
    pub missing: Vec<OptionField>,
}

impl MissingConfigurationError {
    /// The camelCase names of the missing fields.
    pub fn names(&self) -> Vec<&'static str> {
        self.missing.iter().map(|f| f.name()).collect()
    }
}

fn join_names(fields: &[OptionField]) -> String {
    fields
        .iter()
        .map(|f| f.name())
        .collect::<Vec<_>>()
        .join(", ")
}

impl FirebaseOptions {
    /// Checks that every field in `required` is present.
    ///
    /// All missing fields are reported at once.
    pub fn validate(&self, required: &[OptionField]) -> Result<(), MissingConfigurationError> {
        let missing: Vec<OptionField> = OptionField::ALL
            .iter()
            .copied()
            .filter(|field| required.contains(field) && self.get(*field).is_none())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(MissingConfigurationError { missing })
        }
    }
}

/// Returns a loggable preview of a secret: a short prefix followed by `...`.
///
/// The prefix is at most [`PREVIEW_MAX_CHARS`] characters and never more than
/// half of the value, so the full secret cannot be reconstructed from it.
pub fn redact(value: &str) -> String {
    let len = value.chars().count();
    if len == 0 {
        return "<empty>".to_string();
    }
    let keep = PREVIEW_MAX_CHARS.min(len / 2);
    let prefix: String = value.chars().take(keep).collect();
    format!("{}...", prefix)
}

pub(crate) fn log_diagnostics(options: &FirebaseOptions, required: &[OptionField]) {
    for field in OptionField::ALL.iter().filter(|f| f.is_sensitive()) {
        match options.get(*field) {
            Some(value) => info!(field = %field, preview = %redact(value), "sensitive configuration value present"),
            None => info!(field = %field, "sensitive configuration value absent"),
        }
    }

    let present_optional: Vec<&'static str> = OptionField::ALL
        .iter()
        .filter(|f| !required.contains(f) && options.get(**f).is_some())
        .map(|f| f.name())
        .collect();

    info!(
        project_id = options.project_id.as_deref().unwrap_or("<unset>"),
        auth_domain = options.auth_domain.as_deref().unwrap_or("<unset>"),
        optional_present = ?present_optional,
        "Firebase configuration loaded"
    );
}
