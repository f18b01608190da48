//! Numeric display helpers shared by projections and sinks.

/// Converts a ratio in [0, 1] to a percentage rounded to one decimal place.
///
/// Rounding goes through the one-decimal text form (`"{:.1}"`) and back, so
/// the result is exactly what a dashboard displaying `{:.1}` shows:
/// `0.12345` → `12.3`, `0.005` → `0.5`.
pub fn ratio_to_percent(ratio: f64) -> f64 {
    let percent = ratio * 100.0;
    format!("{:.1}", percent).parse().unwrap_or(percent)
}
