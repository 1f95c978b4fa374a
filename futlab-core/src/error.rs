//! Error taxonomy shared by every core component.
//!
//! All variants are local to one bar series. Callers that process many
//! series (the runner's sweep) record the error next to the series'
//! parameters and move on; nothing here is retried.

use thiserror::Error;

use crate::domain::Field;

/// Errors raised by indicators, signal generators, the simulator and the
/// curve transforms.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// An indicator produced no defined value at all: the window is longer
    /// than the available history.
    #[error("insufficient data: {indicator} needs {required} bars, series has {available}")]
    InsufficientData {
        indicator: String,
        required: usize,
        available: usize,
    },

    /// The bar table lacks columns the operation needs. Raised before any
    /// output is produced.
    #[error("missing fields: {}", format_fields(.fields))]
    MissingField { fields: Vec<Field> },

    /// A zero price would turn an adjustment or return into inf/NaN.
    #[error("degenerate input: {field} is zero at bar {index}")]
    DegenerateInput { field: Field, index: usize },

    /// A numeric parameter is outside its valid range.
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// Curve observations must have strictly increasing timestamps.
    #[error("timestamps not strictly increasing at observation {index}")]
    UnorderedTimestamps { index: usize },

    /// A column handed to the bar table does not match the table length.
    #[error("column {field} has {actual} rows, table has {expected}")]
    LengthMismatch {
        field: Field,
        expected: usize,
        actual: usize,
    },
}

impl CoreError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

fn format_fields(fields: &[Field]) -> String {
    fields
        .iter()
        .map(|f| f.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_field_message_lists_every_field() {
        let err = CoreError::MissingField {
            fields: vec![Field::PositionDirection, Field::ContractChangeNext],
        };
        assert_eq!(
            err.to_string(),
            "missing fields: position_direction, contract_change_next"
        );
    }

    #[test]
    fn degenerate_input_names_bar() {
        let err = CoreError::DegenerateInput {
            field: Field::Preclose,
            index: 7,
        };
        assert_eq!(err.to_string(), "degenerate input: preclose is zero at bar 7");
    }
}
