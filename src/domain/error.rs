//! Domain error types.

/// Top-level error type for algotrader.
#[derive(Debug, thiserror::Error)]
pub enum AlgoTraderError {
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration { reason: String },

    #[error("insufficient data: have {rows} rows, need {minimum}")]
    InsufficientData { rows: usize, minimum: usize },

    #[error("index mismatch: {reason}")]
    IndexMismatch { reason: String },

    #[error("invalid signal at row {index}: {reason}")]
    InvalidSignal { index: usize, reason: String },

    #[error("invalid price data at row {index}: {reason}")]
    InvalidPriceData { index: usize, reason: String },

    #[error("data load error: {reason}")]
    DataLoad { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AlgoTraderError {
    pub(crate) fn invalid_config(reason: impl Into<String>) -> Self {
        AlgoTraderError::InvalidConfiguration {
            reason: reason.into(),
        }
    }
}

impl From<&AlgoTraderError> for std::process::ExitCode {
    fn from(err: &AlgoTraderError) -> Self {
        let code: u8 = match err {
            AlgoTraderError::Io(_) | AlgoTraderError::Report { .. } => 1,
            AlgoTraderError::ConfigParse { .. }
            | AlgoTraderError::ConfigMissing { .. }
            | AlgoTraderError::ConfigInvalid { .. } => 2,
            AlgoTraderError::DataLoad { .. } | AlgoTraderError::InvalidPriceData { .. } => 3,
            AlgoTraderError::InvalidConfiguration { .. }
            | AlgoTraderError::InsufficientData { .. }
            | AlgoTraderError::IndexMismatch { .. }
            | AlgoTraderError::InvalidSignal { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::ExitCode;

    fn exit_debug(err: &AlgoTraderError) -> String {
        format!("{:?}", ExitCode::from(err))
    }

    #[test]
    fn display_messages() {
        let err = AlgoTraderError::InsufficientData { rows: 0, minimum: 1 };
        assert_eq!(err.to_string(), "insufficient data: have 0 rows, need 1");

        let err = AlgoTraderError::ConfigMissing {
            section: "data".into(),
            key: "path".into(),
        };
        assert_eq!(err.to_string(), "missing config key [data] path");

        let err = AlgoTraderError::invalid_config("short_window must be less than long_window");
        assert_eq!(
            err.to_string(),
            "invalid configuration: short_window must be less than long_window"
        );
    }

    #[test]
    fn exit_codes_group_by_category() {
        let config = AlgoTraderError::ConfigInvalid {
            section: "backtest".into(),
            key: "initial_capital".into(),
            reason: "must be positive".into(),
        };
        let data = AlgoTraderError::DataLoad {
            reason: "missing file".into(),
        };
        let input = AlgoTraderError::IndexMismatch {
            reason: "length".into(),
        };

        assert_eq!(exit_debug(&config), format!("{:?}", ExitCode::from(2)));
        assert_eq!(exit_debug(&data), format!("{:?}", ExitCode::from(3)));
        assert_eq!(exit_debug(&input), format!("{:?}", ExitCode::from(4)));

        let signal = AlgoTraderError::InvalidSignal {
            index: 2,
            reason: "position_delta 0.5".into(),
        };
        assert_eq!(signal.to_string(), "invalid signal at row 2: position_delta 0.5");
        assert_eq!(exit_debug(&signal), format!("{:?}", ExitCode::from(4)));
    }
}
