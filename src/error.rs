//! Typed errors raised while turning form input into concrete plot dimensions.

use std::fmt;
use thiserror::Error;

/// Which side of the plot a dimension error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Width,
    Height,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Width => f.write_str("width"),
            Axis::Height => f.write_str("height"),
        }
    }
}

/// Whether a failed render cycle is deferred (missing data) or aborted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The user asked for something that needs uploaded data first.
    MissingData,
    /// The parameter set itself is inconsistent or malformed.
    Configuration,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SizingError {
    #[error(
        "upload your data first! Then you will be able to set a proportional {axis}"
    )]
    MissingData { axis: Axis },

    #[error("width and height cannot both be proportional; set one of them to a number")]
    BothProportional,

    #[error("invalid {axis} {value:?}: expected a positive number of pixels or \"proportional\"")]
    InvalidDimension { axis: Axis, value: String },

    #[error("cannot derive a proportional {axis} from a table without rows or columns")]
    EmptyTable { axis: Axis },

    #[error("invalid color scaling quantile {value}: expected a percentile between 80 and 100")]
    InvalidQuantile { value: u8 },
}

impl SizingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SizingError::MissingData { .. } => ErrorKind::MissingData,
            SizingError::BothProportional
            | SizingError::InvalidDimension { .. }
            | SizingError::EmptyTable { .. }
            | SizingError::InvalidQuantile { .. } => ErrorKind::Configuration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_taxonomy() {
        assert_eq!(
            SizingError::MissingData { axis: Axis::Width }.kind(),
            ErrorKind::MissingData
        );
        assert_eq!(SizingError::BothProportional.kind(), ErrorKind::Configuration);
        let msg = SizingError::InvalidDimension {
            axis: Axis::Height,
            value: "tall".into(),
        }
        .to_string();
        assert!(msg.contains("height") && msg.contains("\"tall\""));
    }
}
