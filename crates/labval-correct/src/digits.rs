//! Digit-string view of a numeric value.
//!
//! Transposition and digit corrections operate on the decimal-stripped digit
//! string of a value, remembering how many digits sat right of the decimal
//! point so candidates can be re-scaled back into a number.

/// Decimal-stripped digits of a non-negative value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigitString {
    /// ASCII digits, most significant first, decimal point removed.
    pub digits: Vec<u8>,
    /// How many digits sat right of the decimal point.
    pub frac_digits: usize,
}

impl DigitString {
    /// Build the digit view of a value. Returns `None` for negative,
    /// non-finite, or values whose shortest representation is scientific
    /// notation (too large or too small to transpose meaningfully).
    pub fn from_value(value: f64) -> Option<Self> {
        if !value.is_finite() || value < 0.0 {
            return None;
        }
        let formatted = format!("{value}");
        if formatted.contains('e') || formatted.contains('E') {
            return None;
        }
        let frac_digits = formatted
            .split_once('.')
            .map(|(_, frac)| frac.len())
            .unwrap_or(0);
        let digits: Vec<u8> = formatted
            .bytes()
            .filter(u8::is_ascii_digit)
            .map(|b| b - b'0')
            .collect();
        if digits.is_empty() {
            return None;
        }
        Some(Self {
            digits,
            frac_digits,
        })
    }

    pub fn len(&self) -> usize {
        self.digits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digits.is_empty()
    }

    /// Numeric value of a digit sequence with the decimal point re-inserted
    /// at `frac_digits` from the right.
    pub fn value_of(digits: &[u8], frac_digits: usize) -> f64 {
        let mut integer = 0u64;
        for &digit in digits {
            integer = integer * 10 + u64::from(digit);
        }
        integer as f64 / 10f64.powi(frac_digits as i32)
    }

    /// Value with adjacent digits `index` and `index + 1` swapped, keeping
    /// the decimal point at its original digit offset from the right.
    pub fn adjacent_swap(&self, index: usize) -> Option<f64> {
        if index + 1 >= self.len() || self.digits[index] == self.digits[index + 1] {
            return None;
        }
        let mut swapped = self.digits.clone();
        swapped.swap(index, index + 1);
        Some(Self::value_of(&swapped, self.frac_digits))
    }

    /// Value with the first and last digits swapped.
    pub fn first_last_swap(&self) -> Option<f64> {
        let last = self.len().checked_sub(1)?;
        if last == 0 || self.digits[0] == self.digits[last] {
            return None;
        }
        let mut swapped = self.digits.clone();
        swapped.swap(0, last);
        Some(Self::value_of(&swapped, self.frac_digits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digit_view_of_decimal_value() {
        let ds = DigitString::from_value(51.2).expect("digit string");
        assert_eq!(ds.digits, vec![5, 1, 2]);
        assert_eq!(ds.frac_digits, 1);
    }

    #[test]
    fn digit_view_of_integer_value() {
        let ds = DigitString::from_value(1234.0).expect("digit string");
        assert_eq!(ds.digits, vec![1, 2, 3, 4]);
        assert_eq!(ds.frac_digits, 0);
    }

    #[test]
    fn rejects_negative_and_non_finite() {
        assert!(DigitString::from_value(-5.0).is_none());
        assert!(DigitString::from_value(f64::NAN).is_none());
        assert!(DigitString::from_value(f64::INFINITY).is_none());
    }

    #[test]
    fn adjacent_swap_keeps_decimal_offset() {
        // 51.2 -> digits 512, one fractional digit. Swapping index 0 gives
        // 152 -> 15.2; swapping index 1 gives 521 -> 52.1.
        let ds = DigitString::from_value(51.2).expect("digit string");
        assert_eq!(ds.adjacent_swap(0), Some(15.2));
        assert_eq!(ds.adjacent_swap(1), Some(52.1));
    }

    #[test]
    fn first_last_swap_keeps_decimal_offset() {
        let ds = DigitString::from_value(51.2).expect("digit string");
        assert_eq!(ds.first_last_swap(), Some(21.5));
    }

    #[test]
    fn identical_digit_swaps_are_skipped() {
        let ds = DigitString::from_value(55.0).expect("digit string");
        assert_eq!(ds.adjacent_swap(0), None);
        assert_eq!(ds.first_last_swap(), None);
    }
}
