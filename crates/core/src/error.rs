//! Error types for the gradient-field core.

use thiserror::Error;

/// Errors produced by simulator and settings operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Width or height was zero (or not finite) when sizing a surface or raster.
    #[error("invalid dimensions: width and height must be non-zero")]
    InvalidDimensions,

    /// A setting name did not match any known configuration key.
    #[error("unknown setting: {0}")]
    UnknownSetting(String),

    /// A setting existed but the supplied JSON value had the wrong type.
    #[error("setting type mismatch for '{name}': expected {expected}, got {got}")]
    SettingTypeMismatch {
        name: String,
        expected: String,
        got: String,
    },

    /// An enum-valued setting received a string outside its accepted set.
    #[error("invalid value for '{name}': {value}")]
    InvalidValue { name: String, value: String },

    /// A color string could not be parsed.
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// Writing a snapshot or reading a settings file failed.
    #[error("i/o error: {0}")]
    Io(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_dimensions_displays_readable_message() {
        let msg = format!("{}", EngineError::InvalidDimensions);
        assert!(
            msg.contains("width") && msg.contains("height"),
            "expected message mentioning width and height, got: {msg}"
        );
    }

    #[test]
    fn unknown_setting_includes_name() {
        let msg = format!("{}", EngineError::UnknownSetting("sparkle".into()));
        assert!(msg.contains("sparkle"), "missing name in: {msg}");
    }

    #[test]
    fn type_mismatch_includes_all_fields() {
        let err = EngineError::SettingTypeMismatch {
            name: "gradientCount".into(),
            expected: "integer".into(),
            got: "string".into(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("gradientCount"), "missing name in: {msg}");
        assert!(msg.contains("integer"), "missing expected type in: {msg}");
        assert!(msg.contains("string"), "missing got type in: {msg}");
    }

    #[test]
    fn invalid_value_includes_name_and_value() {
        let err = EngineError::InvalidValue {
            name: "blendMode".into(),
            value: "glow".into(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("blendMode") && msg.contains("glow"), "{msg}");
    }

    #[test]
    fn invalid_color_includes_message() {
        let msg = format!("{}", EngineError::InvalidColor("bad hex".into()));
        assert!(msg.contains("bad hex"), "missing message in: {msg}");
    }

    #[test]
    fn engine_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<EngineError>();
    }

    #[test]
    fn engine_error_implements_std_error() {
        fn assert_std_error<T: std::error::Error>() {}
        assert_std_error::<EngineError>();
    }
}
