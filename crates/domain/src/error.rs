//! Common error types used across the workspace.
//!
//! Each failure family has its own typed enum; [`ClimateError`] is the
//! umbrella carried across port boundaries and converts via `#[from]`.

/// Top-level error for climatehub.
#[derive(Debug, thiserror::Error)]
pub enum ClimateError {
    /// A tunable or input failed domain validation.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// A command sent to an external collaborator was not carried out.
    #[error("command failed")]
    Command(#[from] CommandError),
}

/// Domain invariant violations, raised while validating settings.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// A numeric field is NaN or infinite.
    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },

    /// A numeric field must be strictly positive.
    #[error("{field} must be greater than zero")]
    NotPositive { field: &'static str },

    /// Two bounds are in the wrong order.
    #[error("{lower} must not exceed {upper}")]
    Inverted {
        lower: &'static str,
        upper: &'static str,
    },

    /// A numeric field is above its allowed maximum.
    #[error("{field} must not exceed {max}")]
    TooLarge { field: &'static str, max: f64 },

    /// A time of day could not be parsed.
    #[error("invalid time of day {value:?}, expected HH:MM")]
    TimeOfDay { value: String },

    /// A list that needs at least one entry is empty.
    #[error("{field} must not be empty")]
    Empty { field: &'static str },
}

/// A command the engine issued was rejected by the collaborator owning it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    /// The target entity is currently unreachable.
    #[error("{target} is unavailable")]
    Unavailable { target: String },

    /// The target rejected the command outright.
    #[error("{target} rejected {command}")]
    Rejected {
        target: String,
        command: &'static str,
    },
}

/// Check that a value is finite, naming the field on failure.
///
/// # Errors
///
/// Returns [`ValidationError::NotFinite`] for NaN or infinite values.
pub fn ensure_finite(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::NotFinite { field })
    }
}

/// Check that `lower <= upper`.
///
/// # Errors
///
/// Returns [`ValidationError::Inverted`] when the bounds are swapped.
pub fn ensure_ordered(
    lower: (&'static str, f64),
    upper: (&'static str, f64),
) -> Result<(), ValidationError> {
    if lower.1 <= upper.1 {
        Ok(())
    } else {
        Err(ValidationError::Inverted {
            lower: lower.0,
            upper: upper.0,
        })
    }
}
