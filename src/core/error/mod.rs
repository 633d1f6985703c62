use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigMissingKey,
    ConfigInvalidJson,
    ConfigInvalidValue,

    ValidationInvalidArgument,
    ValidationInvalidIdentifier,

    ModelLoadFailed,
    ModelInvalidJson,
    ModelMissingUnit,

    RefactorEditConflict,

    ApplyStaleFile,
    ApplyNotWritable,

    InternalIoError,
    InternalJsonError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ConfigMissingKey => "config.missing_key",
            ErrorCode::ConfigInvalidJson => "config.invalid_json",
            ErrorCode::ConfigInvalidValue => "config.invalid_value",

            ErrorCode::ValidationInvalidArgument => "validation.invalid_argument",
            ErrorCode::ValidationInvalidIdentifier => "validation.invalid_identifier",

            ErrorCode::ModelLoadFailed => "model.load_failed",
            ErrorCode::ModelInvalidJson => "model.invalid_json",
            ErrorCode::ModelMissingUnit => "model.missing_unit",

            ErrorCode::RefactorEditConflict => "refactor.edit_conflict",

            ErrorCode::ApplyStaleFile => "apply.stale_file",
            ErrorCode::ApplyNotWritable => "apply.not_writable",

            ErrorCode::InternalIoError => "internal.io_error",
            ErrorCode::InternalJsonError => "internal.json_error",
        }
    }

    /// True for the codes that mean the program model could not be built.
    pub fn is_model_load(&self) -> bool {
        matches!(
            self,
            ErrorCode::ModelLoadFailed | ErrorCode::ModelInvalidJson | ErrorCode::ModelMissingUnit
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hint {
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigMissingKeyDetails {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigInvalidJsonDetails {
    pub path: String,
    pub error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigInvalidValueDetails {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub problem: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidArgumentDetails {
    pub field: String,
    pub problem: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidIdentifierDetails {
    pub name: String,
    pub problem: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelLoadDetails {
    pub path: String,
    pub error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingUnitDetails {
    pub unit: String,
    pub model_path: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictSiteDetails {
    pub symbol: String,
    pub start: usize,
    pub end: usize,
    pub replacement: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditConflictDetails {
    pub file: String,
    pub first: ConflictSiteDetails,
    pub second: ConflictSiteDetails,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyFileDetails {
    pub file: String,
    pub problem: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalIoErrorDetails {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalJsonErrorDetails {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    pub details: Value,
    pub hints: Vec<Hint>,
    pub retryable: Option<bool>,
}

pub type Result<T> = std::result::Result<T, Error>;

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

fn to_details<T: Serialize>(details: T) -> Value {
    serde_json::to_value(details).unwrap_or_else(|_| Value::Object(serde_json::Map::new()))
}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>, details: Value) -> Self {
        Self {
            code,
            message: message.into(),
            details,
            hints: Vec::new(),
            retryable: None,
        }
    }

    pub fn validation_invalid_argument(
        field: impl Into<String>,
        problem: impl Into<String>,
    ) -> Self {
        let details = to_details(InvalidArgumentDetails {
            field: field.into(),
            problem: problem.into(),
        });

        Self::new(
            ErrorCode::ValidationInvalidArgument,
            "Invalid argument",
            details,
        )
    }

    pub fn validation_invalid_identifier(
        name: impl Into<String>,
        problem: impl Into<String>,
    ) -> Self {
        let details = to_details(InvalidIdentifierDetails {
            name: name.into(),
            problem: problem.into(),
        });

        Self::new(
            ErrorCode::ValidationInvalidIdentifier,
            "Identifier cannot be made compliant",
            details,
        )
    }

    pub fn config_missing_key(key: impl Into<String>, path: Option<String>) -> Self {
        let details = to_details(ConfigMissingKeyDetails {
            key: key.into(),
            path,
        });

        Self::new(
            ErrorCode::ConfigMissingKey,
            "Missing required configuration key",
            details,
        )
    }

    pub fn config_invalid_json(path: impl Into<String>, err: serde_json::Error) -> Self {
        let details = to_details(ConfigInvalidJsonDetails {
            path: path.into(),
            error: err.to_string(),
        });

        Self::new(
            ErrorCode::ConfigInvalidJson,
            "Invalid JSON in configuration",
            details,
        )
    }

    pub fn config_invalid_value(
        key: impl Into<String>,
        value: Option<String>,
        problem: impl Into<String>,
    ) -> Self {
        let details = to_details(ConfigInvalidValueDetails {
            key: key.into(),
            value,
            problem: problem.into(),
        });

        Self::new(
            ErrorCode::ConfigInvalidValue,
            "Invalid configuration value",
            details,
        )
    }

    pub fn model_load_failed(path: impl Into<String>, error: impl Into<String>) -> Self {
        let details = to_details(ModelLoadDetails {
            path: path.into(),
            error: error.into(),
        });

        Self::new(
            ErrorCode::ModelLoadFailed,
            "Could not build the program model",
            details,
        )
    }

    pub fn model_invalid_json(path: impl Into<String>, err: serde_json::Error) -> Self {
        let details = to_details(ModelLoadDetails {
            path: path.into(),
            error: err.to_string(),
        });

        Self::new(ErrorCode::ModelInvalidJson, "Invalid JSON in program model", details)
    }

    pub fn model_missing_unit(unit: impl Into<String>, model_path: impl Into<String>) -> Self {
        let details = to_details(MissingUnitDetails {
            unit: unit.into(),
            model_path: model_path.into(),
        });

        Self::new(
            ErrorCode::ModelMissingUnit,
            "Translation unit has no model",
            details,
        )
        .with_hint("Re-run the front end so the model covers every entry of compile_commands.json")
    }

    pub fn edit_conflict(
        file: impl Into<String>,
        first: ConflictSiteDetails,
        second: ConflictSiteDetails,
    ) -> Self {
        let file = file.into();
        let message = format!(
            "Conflicting edits in {}: {}..{} ({}) overlaps {}..{} ({})",
            file, first.start, first.end, first.symbol, second.start, second.end, second.symbol
        );
        let details = to_details(EditConflictDetails {
            file,
            first,
            second,
        });

        Self::new(ErrorCode::RefactorEditConflict, message, details)
    }

    pub fn apply_stale_file(file: impl Into<String>, problem: impl Into<String>) -> Self {
        let details = to_details(ApplyFileDetails {
            file: file.into(),
            problem: problem.into(),
        });

        Self::new(
            ErrorCode::ApplyStaleFile,
            "File changed since the model was built",
            details,
        )
        .with_hint("Rebuild the program model and re-run")
    }

    pub fn apply_not_writable(file: impl Into<String>) -> Self {
        let details = to_details(ApplyFileDetails {
            file: file.into(),
            problem: "file is read-only".to_string(),
        });

        Self::new(ErrorCode::ApplyNotWritable, "File is not writable", details)
            .with_hint("Make the file writable or exclude it")
    }

    pub fn internal_io(error: impl Into<String>, context: Option<String>) -> Self {
        let details = to_details(InternalIoErrorDetails {
            error: error.into(),
            context,
        });

        Self::new(ErrorCode::InternalIoError, "IO error", details)
    }

    pub fn internal_json(error: impl Into<String>, context: Option<String>) -> Self {
        let details = to_details(InternalJsonErrorDetails {
            error: error.into(),
            context,
        });

        Self::new(ErrorCode::InternalJsonError, "JSON error", details)
    }

    pub fn with_hint(mut self, message: impl Into<String>) -> Self {
        self.hints.push(Hint {
            message: message.into(),
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_dotted() {
        assert_eq!(ErrorCode::ModelMissingUnit.as_str(), "model.missing_unit");
        assert_eq!(ErrorCode::RefactorEditConflict.as_str(), "refactor.edit_conflict");
        assert_eq!(ErrorCode::ApplyNotWritable.as_str(), "apply.not_writable");
    }

    #[test]
    fn edit_conflict_names_both_sites() {
        let site = |symbol: &str, start| ConflictSiteDetails {
            symbol: symbol.to_string(),
            start,
            end: start + 5,
            replacement: "count_".to_string(),
        };
        let err = Error::edit_conflict("src/a.cpp", site("c:@S@A@FI@Count", 10), site("c:@S@B@FI@Count", 12));

        assert_eq!(err.code, ErrorCode::RefactorEditConflict);
        assert!(err.message.contains("c:@S@A@FI@Count"));
        assert!(err.message.contains("c:@S@B@FI@Count"));
        assert_eq!(err.details["first"]["start"], 10);
        assert_eq!(err.details["second"]["start"], 12);
    }

    #[test]
    fn model_load_codes_are_grouped() {
        assert!(ErrorCode::ModelInvalidJson.is_model_load());
        assert!(!ErrorCode::ApplyStaleFile.is_model_load());
    }
}
