/// Range checks for user-supplied settings
///
/// Every failure is reported as `InvalidSettings` naming the offending field,
/// so the CLI can show it to the user as-is.
use crate::error::{Result, WarehouseError};

/// Validate a value that must be finite and `>= 0`
pub fn validate_non_negative(value: f64, field_name: &str) -> Result<()> {
    if !value.is_finite() {
        return Err(WarehouseError::InvalidSettings(format!(
            "{} must be a finite number: {}",
            field_name, value
        )));
    }

    if value < 0.0 {
        return Err(WarehouseError::InvalidSettings(format!(
            "{} cannot be negative: {}",
            field_name, value
        )));
    }

    Ok(())
}

/// Validate a value in the closed unit interval
pub fn validate_fraction(value: f64, field_name: &str) -> Result<()> {
    validate_non_negative(value, field_name)?;

    if value > 1.0 {
        return Err(WarehouseError::InvalidSettings(format!(
            "{} cannot be greater than 1.0: {}",
            field_name, value
        )));
    }

    Ok(())
}

/// Validate a simulation step count against the engine cap
pub fn validate_step_count(steps: usize, max_steps: usize) -> Result<()> {
    if steps > max_steps {
        return Err(WarehouseError::InvalidSettings(format!(
            "Step count {} exceeds maximum {}",
            steps, max_steps
        )));
    }

    Ok(())
}

/// Validate a catalog sample size
pub fn validate_sample_size(sample_size: usize) -> Result<()> {
    if sample_size == 0 {
        return Err(WarehouseError::InvalidSettings(
            "Sample size cannot be zero".to_string(),
        ));
    }

    Ok(())
}
