use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchedulingError {
    #[error("Quality rating out of range (expected 0-5): {0}")]
    InvalidQuality(i64),

    #[error("Negative value for {field}: {value}")]
    NegativeField { field: &'static str, value: i64 },
}

pub type Result<T> = std::result::Result<T, SchedulingError>;

/// Convert an externally supplied integer into a non-negative scheduling field.
pub fn non_negative(field: &'static str, value: i64) -> Result<u32> {
    u32::try_from(value).map_err(|_| SchedulingError::NegativeField { field, value })
}
