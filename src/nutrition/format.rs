//! Decimal parsing and display formatting
//!
//! Values are typed with a decimal comma and stored with a dot; computed
//! quantities are printed with label precision.

use once_cell::sync::Lazy;
use regex::Regex;

/// Longest value the editor accepts, in characters
pub const MAX_VALUE_LEN: usize = 5;

/// Displayed for any value that cannot be computed
pub const UNKNOWN: &str = "-";

static VALUE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d*)(,|\.)?(\d*)$").expect("value pattern is valid"));

/// Parse a user-entered decimal ("12,5" or "12.5").
///
/// Empty, malformed and non-finite input all yield `None`.
pub fn parse_decimal(input: &str) -> Option<f64> {
    let normalized = input.trim().replace(',', ".");
    if normalized.is_empty() {
        return None;
    }
    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Format a computed quantity for the label.
///
/// Zero prints as "0", values below 10 keep one decimal with a comma,
/// everything else is rounded to a whole number.
pub fn format_magnitude(value: f64) -> String {
    if !value.is_finite() {
        return UNKNOWN.to_string();
    }
    if value == 0.0 {
        "0".to_string()
    } else if value < 10.0 {
        let rounded = (value * 10.0).round() / 10.0;
        format!("{:.1}", rounded).replace('.', ",")
    } else {
        format!("{:.0}", value.round())
    }
}

/// `format_magnitude`, or "-" when the value is unknown
pub fn format_or_unknown(value: Option<f64>) -> String {
    value.map(format_magnitude).unwrap_or_else(|| UNKNOWN.to_string())
}

/// Stored representation ("12.5") shown with a decimal comma ("12,5")
pub fn to_display(stored: &str) -> String {
    stored.replacen('.', ",", 1)
}

/// Check typed text against the value rules and return the stored form.
///
/// Accepts "", "12", "12,5", "12.", ",5"; rejects letters, signs, a second
/// separator, and anything longer than [`MAX_VALUE_LEN`].
pub fn validate_value(input: &str) -> Option<String> {
    if input.chars().count() > MAX_VALUE_LEN {
        return None;
    }
    if input.is_empty() || VALUE_PATTERN.is_match(input) {
        Some(input.replacen(',', ".", 1))
    } else {
        None
    }
}

/// Outcome of typing into a [`ValueField`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueInput {
    /// The text is valid; store this value
    Accepted(String),
    /// The text is shown but the stored value must not change
    Rejected,
    /// Too long; the field kept its previous text
    Ignored,
}

/// Text-field state for a nutrient value.
///
/// Invalid text stays visible while the field has focus and is replaced by
/// the last stored value on blur.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueField {
    text: String,
    valid: bool,
}

impl ValueField {
    pub fn new(stored: &str) -> Self {
        Self {
            text: to_display(stored),
            valid: true,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn input(&mut self, typed: &str) -> ValueInput {
        if typed.chars().count() > MAX_VALUE_LEN {
            return ValueInput::Ignored;
        }

        self.text = typed.to_string();
        match validate_value(typed) {
            Some(stored) => {
                self.valid = true;
                ValueInput::Accepted(stored)
            }
            None => {
                self.valid = false;
                ValueInput::Rejected
            }
        }
    }

    /// Focus left the field; drop invalid text in favour of `stored`
    pub fn blur(&mut self, stored: &str) {
        if !self.valid {
            self.sync(stored);
        }
    }

    /// The stored value changed elsewhere
    pub fn sync(&mut self, stored: &str) {
        self.text = to_display(stored);
        self.valid = true;
    }
}
