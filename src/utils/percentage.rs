use std::{fmt::Display, ops::Deref};

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Percentage(f64);

impl Display for Percentage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}%", self.0)
    }
}

impl Percentage {
    pub fn new_opt(value: f64) -> Option<Percentage> {
        if value < 0. || !value.is_finite() {
            None
        } else {
            Some(Percentage(value))
        }
    }

    /// Converts a `[0, 1]` rate into a percentage. Invalid rates become 0%.
    pub fn from_rate(rate: f64) -> Percentage {
        Percentage::new_opt(rate * 100.).unwrap_or(Percentage(0.))
    }
}

impl Deref for Percentage {
    type Target = f64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Rounds half away from zero to the given number of decimal places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::{round_to, Percentage};

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.25, 1), 1.3);
        assert_eq!(round_to(0.333333, 2), 0.33);
        assert_eq!(round_to(59.96, 0), 60.);
    }

    #[test]
    fn test_percentage_from_rate() {
        assert_eq!(*Percentage::from_rate(0.5), 50.);
        assert_eq!(*Percentage::from_rate(f64::NAN), 0.);
        assert_eq!(Percentage::from_rate(0.125).to_string(), "12.5%");
    }
}
