use crate::error::{MiningError, Result};
use crate::types::Count;

/// Reject support fractions outside `(0, 1]`.
pub fn check_fraction(fraction: f64) -> Result<()> {
    if fraction.is_finite() && fraction > 0.0 && fraction <= 1.0 {
        Ok(())
    } else {
        Err(MiningError::invalid(format!(
            "support fraction must be in (0, 1], got {}",
            fraction
        )))
    }
}

/// Minimum occurrence count: `floor(fraction * base)`.
///
/// `base` is the total basket count on the first round and the round's
/// basket limit afterwards; picking it is the caller's job.
pub fn support_threshold(fraction: f64, base: usize) -> Result<Count> {
    check_fraction(fraction)?;
    Ok((fraction * base as f64).floor() as Count)
}
