use crate::error::{AppError, AppResult};
use regex::Regex;
use std::sync::LazyLock;

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9]{8,15}$").expect("phone regex"));

/// Loose phone check for booking contacts: optional `+`, 8-15 digits once
/// spaces and dashes are removed.
pub fn validate_phone(phone: &str) -> AppResult<()> {
    let compact: String = phone
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();

    if !PHONE_RE.is_match(&compact) {
        return Err(AppError::ValidationError(
            "Phone number must contain 8-15 digits".to_string(),
        ));
    }

    Ok(())
}

/// Digits-only WhatsApp number with the Indonesian country code, as `wa.me`
/// expects. A leading trunk `0` becomes `62`.
pub fn normalize_whatsapp_number(phone: &str) -> String {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

    match digits.strip_prefix('0') {
        Some(rest) => format!("62{rest}"),
        None => digits,
    }
}
