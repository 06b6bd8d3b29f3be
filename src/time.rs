//! Time representation (§3, §4.1). All simulation times are integer seconds,
//! quantized to `STEP` seconds. A run never needs sub-second or non-integer
//! time, so unlike `ixa::Context::add_plan`'s `f64`-keyed scheduling, this
//! crate keeps time as `i64` throughout.

/// The discretization quantum: 300 seconds.
pub const STEP: i64 = 300;

/// Seconds in one day.
pub const DAY: f64 = 86_400.0;

/// Round `t` to the nearest multiple of `STEP` and cast to an integer.
///
/// Negative or zero draws are tolerated per §4.2/§7: they are not clipped
/// here, only quantized. The driver is responsible for clamping any event
/// scheduled strictly before the current clock (§7's forward-only-clock rule).
#[allow(clippy::cast_possible_truncation)]
pub fn quantize(t: f64) -> i64 {
    (t / STEP as f64).round() as i64 * STEP
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantize_rounds_to_nearest_step() {
        assert_eq!(quantize(0.0), 0);
        assert_eq!(quantize(149.0), 0);
        assert_eq!(quantize(151.0), 300);
        assert_eq!(quantize(449.0), 300);
        assert_eq!(quantize(450.0), 600);
    }

    #[test]
    fn quantize_tolerates_negative_input() {
        assert_eq!(quantize(-100.0), 0);
        assert_eq!(quantize(-200.0), -300);
    }
}
