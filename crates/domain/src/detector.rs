//! Balance change detection.

use rust_decimal::Decimal;

use crate::units::to_decimal;

/// Outcome of comparing a baseline against a fresh observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertDecision {
    pub alert: bool,
    /// Absolute difference in human-scale units; zero when the raw strings
    /// were identical and no conversion took place.
    pub magnitude: Decimal,
    pub previous: Decimal,
    pub current: Decimal,
}

impl AlertDecision {
    fn unchanged() -> Self {
        Self {
            alert: false,
            magnitude: Decimal::ZERO,
            previous: Decimal::ZERO,
            current: Decimal::ZERO,
        }
    }
}

/// Decides whether a balance movement is large enough to alert on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeDetector {
    threshold: Decimal,
}

impl ChangeDetector {
    pub fn new(threshold: Decimal) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> Decimal {
        self.threshold
    }

    /// Alerts iff `|decimal(previous) - decimal(current)| > threshold`.
    ///
    /// Textually identical raw strings short-circuit before any conversion,
    /// so they never alert. Strings that differ only in representation (for
    /// example leading zeros) are still converted and compared.
    pub fn evaluate(&self, previous_raw: &str, current_raw: &str) -> AlertDecision {
        if previous_raw == current_raw {
            return AlertDecision::unchanged();
        }

        let previous = to_decimal(previous_raw);
        let current = to_decimal(current_raw);
        let magnitude = previous
            .checked_sub(current)
            .map_or(Decimal::MAX, |delta| delta.abs());

        AlertDecision {
            alert: magnitude > self.threshold,
            magnitude,
            previous,
            current,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn wide_balances_compare_by_value() {
        let detector = ChangeDetector::new(dec!(1));

        let grew = detector.evaluate(
            "70000000000000000000000000000",
            "100000000000000000000000000000",
        );
        assert!(grew.alert);
        assert_eq!(grew.previous, dec!(70000000000000000000000));
        assert_eq!(grew.magnitude, dec!(30000000000000000000000));

        let steady = detector.evaluate(
            "100000000000000000000000000000",
            "100000000000000000000000000001",
        );
        assert!(!steady.alert);
    }

    #[test]
    fn identical_raw_strings_never_alert() {
        let detector = ChangeDetector::new(Decimal::ZERO);
        let decision = detector.evaluate("1000000", "1000000");
        assert!(!decision.alert);
        assert_eq!(decision.magnitude, Decimal::ZERO);
    }

    #[test]
    fn alerts_above_threshold() {
        let detector = ChangeDetector::new(dec!(0.5));
        let decision = detector.evaluate("1000000", "2000000");
        assert!(decision.alert);
        assert_eq!(decision.magnitude, dec!(1));
        assert_eq!(decision.previous, dec!(1));
        assert_eq!(decision.current, dec!(2));
    }

    #[test]
    fn decreases_are_measured_by_absolute_delta() {
        let detector = ChangeDetector::new(dec!(0.5));
        let decision = detector.evaluate("2000000", "1000000");
        assert!(decision.alert);
        assert_eq!(decision.magnitude, dec!(1));
    }

    #[test]
    fn stays_quiet_below_threshold() {
        let detector = ChangeDetector::new(dec!(1.5));
        assert!(!detector.evaluate("1000000", "2000000").alert);
    }

    #[test]
    fn delta_equal_to_threshold_does_not_alert() {
        let detector = ChangeDetector::new(dec!(1));
        assert!(!detector.evaluate("1000000", "2000000").alert);
        assert!(detector.evaluate("1000000", "2000001").alert);
    }

    #[test]
    fn leading_zeros_are_compared_numerically() {
        let detector = ChangeDetector::new(Decimal::ZERO);
        let decision = detector.evaluate("01000000", "1000000");
        assert!(!decision.alert);
        assert_eq!(decision.magnitude, Decimal::ZERO);
    }

    #[test]
    fn missing_baseline_compares_against_zero() {
        let detector = ChangeDetector::new(dec!(0.5));
        let decision = detector.evaluate("", "2000000");
        assert!(decision.alert);
        assert_eq!(decision.previous, Decimal::ZERO);
        assert_eq!(decision.magnitude, dec!(2));
    }
}
