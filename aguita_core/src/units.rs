//! Unit conversion between cups and display units.
//!
//! The canonical unit is the US cup. All stored amounts and derived goals
//! are in cups; other units only exist at the edges (display, entry,
//! the stored goal).

use crate::UnitMode;

/// Fluid ounces per cup
pub const OZ_PER_CUP: f64 = 8.0;

/// Milliliters per US legal cup. Used for every conversion, labels included.
pub const ML_PER_CUP: f64 = 236.588;

/// Convert a value expressed in `unit` into cups
pub fn to_canonical(value: f64, unit: UnitMode) -> f64 {
    match unit {
        UnitMode::Cups => value,
        UnitMode::Oz => value / OZ_PER_CUP,
        UnitMode::Ml => value / ML_PER_CUP,
    }
}

/// Convert cups into a value expressed in `unit`
pub fn from_canonical(cups: f64, unit: UnitMode) -> f64 {
    match unit {
        UnitMode::Cups => cups,
        UnitMode::Oz => cups * OZ_PER_CUP,
        UnitMode::Ml => cups * ML_PER_CUP,
    }
}

/// Convert directly between two display units
pub fn convert(value: f64, from: UnitMode, to: UnitMode) -> f64 {
    from_canonical(to_canonical(value, from), to)
}

/// Snap granularity of the dial, in cups
///
/// - cups: a quarter cup
/// - oz: one fluid ounce
/// - mL: ten milliliters
pub fn increment_step(unit: UnitMode) -> f64 {
    match unit {
        UnitMode::Cups => 0.25,
        UnitMode::Oz => 1.0 / OZ_PER_CUP,
        UnitMode::Ml => 10.0 / ML_PER_CUP,
    }
}

/// Stepper granularity for editing the goal, in display units
pub fn goal_step(unit: UnitMode) -> f64 {
    match unit {
        UnitMode::Cups => 1.0,
        UnitMode::Oz => 8.0,
        UnitMode::Ml => 50.0,
    }
}

/// Bounds of the goal stepper, in display units
pub fn goal_range(unit: UnitMode) -> (f64, f64) {
    match unit {
        UnitMode::Cups => (4.0, 16.0),
        UnitMode::Oz => (32.0, 128.0),
        UnitMode::Ml => (950.0, 3800.0),
    }
}

/// Round `value` to the nearest multiple of `step`
pub fn round_to_step(value: f64, step: f64) -> f64 {
    if step <= 0.0 || !step.is_finite() {
        return value;
    }
    (value / step).round() * step
}

/// Render a canonical amount in `unit` for display.
///
/// Whole values print without decimals, anything else with one.
pub fn format_amount(cups: f64, unit: UnitMode) -> String {
    format_value(from_canonical(cups, unit))
}

/// Render a value that is already in display units
pub fn format_value(value: f64) -> String {
    let rounded = (value * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{:.0}", rounded)
    } else {
        format!("{:.1}", rounded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_canonical_round_trip_every_unit() {
        for unit in UnitMode::ALL {
            for value in [0.0, 0.25, 1.0, 8.0, 64.0, 1893.0] {
                let back = from_canonical(to_canonical(value, unit), unit);
                assert!((back - value).abs() < EPS, "{:?} {}", unit, value);
            }
        }
    }

    #[test]
    fn test_known_conversions() {
        assert_eq!(to_canonical(64.0, UnitMode::Oz), 8.0);
        assert_eq!(from_canonical(2.0, UnitMode::Oz), 16.0);
        assert!((to_canonical(236.588, UnitMode::Ml) - 1.0).abs() < EPS);
        assert!((convert(8.0, UnitMode::Cups, UnitMode::Ml) - 1892.704).abs() < 1e-6);
    }

    #[test]
    fn test_increment_steps() {
        assert_eq!(increment_step(UnitMode::Cups), 0.25);
        assert_eq!(increment_step(UnitMode::Oz), 0.125);
        // Ten milliliters expressed in cups
        let ml_step = from_canonical(increment_step(UnitMode::Ml), UnitMode::Ml);
        assert!((ml_step - 10.0).abs() < EPS);
    }

    #[test]
    fn test_round_to_step() {
        assert_eq!(round_to_step(1892.704, 50.0), 1900.0);
        assert_eq!(round_to_step(67.0, 8.0), 64.0);
        assert_eq!(round_to_step(7.6, 1.0), 8.0);
        assert_eq!(round_to_step(3.3, 0.0), 3.3);
    }

    #[test]
    fn test_goal_range_contains_defaults() {
        for unit in UnitMode::ALL {
            let (lo, hi) = goal_range(unit);
            let eight_cups = round_to_step(from_canonical(8.0, unit), goal_step(unit));
            assert!(lo <= eight_cups && eight_cups <= hi, "{:?}", unit);
        }
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(1.5, UnitMode::Cups), "1.5");
        assert_eq!(format_amount(2.0, UnitMode::Cups), "2");
        assert_eq!(format_amount(1.5, UnitMode::Oz), "12");
        assert_eq!(format_amount(1.0, UnitMode::Ml), "236.6");
    }
}
