use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

use crate::locale;
use crate::qm::{
    ReleaseOptions,
    SaveMode,
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Configuration error in '{field_path}': {message}")]
pub struct ValidationError {
    /// JSON path to the field (e.g., "targetLanguage")
    pub field_path: String,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field_path: field_path.into(), message: message.into() }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    ValidationErrors(Vec<ValidationError>),

    #[error("Failed to load configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// 検証エラーを番号付きの一覧に整形する
fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .enumerate()
        .map(|(i, err)| format!("  {}. {} - {}", i + 1, err.field_path, err.message))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Settings of a release run, as read from `.linguist-qm.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Key records by message id.
    pub id_based: bool,
    pub save_mode: SaveMode,
    /// Leave unfinished translations out.
    pub ignore_unfinished: bool,
    /// Drop translations identical to their source text.
    pub remove_identical: bool,
    /// Emit untranslated entries as this prefix followed by the source text.
    pub untranslated_prefix: Option<String>,
    pub verbose: bool,
    /// Overrides the language code of every catalog compiled.
    pub target_language: Option<String>,
    pub squeeze_comments: bool,
}

impl Settings {
    /// # Errors
    /// - Empty or unknown target language
    /// - Prefix made only of whitespace
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Some(code) = &self.target_language {
            if code.is_empty() {
                errors.push(ValidationError::new(
                    "targetLanguage",
                    "The language code cannot be empty. Please specify a code such as \"de\" or \"pt_BR\", or remove this field",
                ));
            } else if locale::language_and_territory(code).0.is_none() {
                errors.push(ValidationError::new(
                    "targetLanguage",
                    format!("Unknown language code '{code}'. Expected a code such as \"de\" or \"pt_BR\""),
                ));
            }
        }

        if let Some(prefix) = &self.untranslated_prefix
            && !prefix.is_empty()
            && prefix.trim().is_empty()
        {
            errors.push(ValidationError::new(
                "untranslatedPrefix",
                "The prefix consists only of whitespace and would be invisible. Please use a visible marker (e.g., \"~\")",
            ));
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Codec options these settings stand for.
    #[must_use]
    pub fn conversion_options(&self) -> ReleaseOptions {
        ReleaseOptions {
            id_based: self.id_based,
            untranslated_prefix: self.untranslated_prefix.clone(),
            ignore_unfinished: self.ignore_unfinished,
            save_mode: self.save_mode,
            squeeze_comments: self.squeeze_comments,
        }
    }
}
