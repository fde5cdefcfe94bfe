//! CLI argument validators.

/// Parse a time offset in seconds: finite and non-negative.
pub fn parse_seconds(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;

    if !value.is_finite() {
        return Err(format!("seconds must be finite, got {value}"));
    }
    if value < 0.0 {
        return Err(format!("seconds must not be negative, got {value}"));
    }

    Ok(value)
}
