//! Utility functions

use crate::constants::{MAX_PHONE_DIGITS, MIN_PHONE_DIGITS};

pub fn mask_email(email: &str) -> String {
    if let Some(at_pos) = email.find('@') {
        let (local, domain) = email.split_at(at_pos);
        let visible: String = local.chars().take(2).collect();
        if visible.is_empty() {
            format!("***{}", domain)
        } else {
            format!("{}***{}", visible, domain)
        }
    } else {
        "***".to_string()
    }
}

/// Keeps the last four digits of a phone number.
pub fn mask_phone(phone: &str) -> String {
    let digits: Vec<char> = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() <= 4 {
        return "***".to_string();
    }
    let tail: String = digits[digits.len() - 4..].iter().collect();
    format!("***{}", tail)
}

/// Normalizes a phone number into the digits-only international form used
/// by the WhatsApp gateway.
///
/// Local numbers (10 or 11 digits, area code included) get `country_code`
/// prepended. Returns `None` when the result is not 12 to 15 digits long.
pub fn normalize_phone(raw: &str, country_code: &str) -> Option<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    let digits = digits.trim_start_matches('0').to_string();

    let normalized = if (10..=11).contains(&digits.len()) {
        format!("{}{}", country_code, digits)
    } else {
        digits
    };

    if (MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&normalized.len()) {
        Some(normalized)
    } else {
        None
    }
}

/// Formats an amount in cents as `1234.50`.
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}
