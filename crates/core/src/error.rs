//! Error types for the flowfield core.

use thiserror::Error;

/// Errors produced while configuring or driving a simulation.
#[derive(Debug, Error)]
pub enum EngineError {
    /// World size or grid scale produced an empty or overflowing grid.
    #[error("invalid dimensions: width, height and scale must yield a non-empty grid")]
    InvalidDimensions,

    /// A parameter existed but had the wrong JSON type.
    #[error("parameter type mismatch for '{name}': expected {expected}, got {got}")]
    ParamTypeMismatch {
        name: String,
        expected: String,
        got: String,
    },

    /// A configuration value was outside its valid range.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// The frame buffer handed to `tick` does not match the world size.
    #[error("dimension mismatch: ({lhs_w}, {lhs_h}) vs ({rhs_w}, {rhs_h})")]
    DimensionMismatch {
        lhs_w: usize,
        lhs_h: usize,
        rhs_w: usize,
        rhs_h: usize,
    },

    /// A color string could not be parsed.
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// A palette could not be constructed from the given colors.
    #[error("invalid palette: {0}")]
    InvalidPalette(String),

    /// The particle worker pool could not be created.
    #[error("failed to build worker pool: {0}")]
    ThreadPool(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_dimensions_displays_readable_message() {
        let msg = format!("{}", EngineError::InvalidDimensions);
        assert!(
            msg.contains("width") && msg.contains("scale"),
            "expected message mentioning width and scale, got: {msg}"
        );
    }

    #[test]
    fn param_type_mismatch_includes_all_fields() {
        let err = EngineError::ParamTypeMismatch {
            name: "palette".into(),
            expected: "array".into(),
            got: "string".into(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("palette"), "missing param name in: {msg}");
        assert!(msg.contains("array"), "missing expected type in: {msg}");
        assert!(msg.contains("string"), "missing got type in: {msg}");
    }

    #[test]
    fn dimension_mismatch_includes_all_dimensions() {
        let err = EngineError::DimensionMismatch {
            lhs_w: 10,
            lhs_h: 20,
            rhs_w: 30,
            rhs_h: 40,
        };
        let msg = format!("{err}");
        for needle in ["10", "20", "30", "40"] {
            assert!(msg.contains(needle), "missing {needle} in: {msg}");
        }
    }

    #[test]
    fn invalid_config_includes_message() {
        let msg = EngineError::InvalidConfig("workers must be > 0".into()).to_string();
        assert!(msg.contains("workers"), "missing message in: {msg}");
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
