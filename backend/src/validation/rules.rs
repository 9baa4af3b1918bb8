//! Common validation rules shared across request payloads.

use validator::ValidationError;

/// Rejects values that are empty once surrounding whitespace is removed.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Validates a requester contact: an email address or a phone number.
///
/// Phone numbers may contain digits, spaces, dashes, parentheses and a
/// leading `+`, with 7 to 15 digits overall.
pub fn validate_contact(contact: &str) -> Result<(), ValidationError> {
    let contact = contact.trim();
    if contact.is_empty() || contact.len() > 120 {
        return Err(ValidationError::new("contact_invalid_length"));
    }

    if contact.contains('@') {
        let mut parts = contact.splitn(2, '@');
        let local = parts.next().unwrap_or_default();
        let domain = parts.next().unwrap_or_default();
        if local.is_empty() || !domain.contains('.') || domain.starts_with('.') {
            return Err(ValidationError::new("contact_invalid_email"));
        }
        return Ok(());
    }

    let allowed = contact
        .chars()
        .enumerate()
        .all(|(i, c)| c.is_ascii_digit() || matches!(c, ' ' | '-' | '(' | ')') || (i == 0 && c == '+'));
    let digits = contact.chars().filter(char::is_ascii_digit).count();
    if !allowed || !(7..=15).contains(&digits) {
        return Err(ValidationError::new("contact_invalid_phone"));
    }
    Ok(())
}
