//! Seller contact: phone normalisation and the WhatsApp compose link.

use thiserror::Error;
use url::Url;

/// Country calling code prefixed to every seller number.
pub const COUNTRY_CODE: &str = "91";

const MIN_PHONE_DIGITS: usize = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContactError {
    #[error("Seller phone number is missing for this item.")]
    MissingPhone,
    #[error("Invalid phone number format.")]
    InvalidPhone,
}

/// Strips everything but digits and requires at least ten of them.
/// Placeholder strings left by older clients count as missing.
pub fn normalize_phone(raw: Option<&str>) -> Result<String, ContactError> {
    let raw = raw
        .map(str::trim)
        .filter(|p| !p.is_empty() && *p != "undefined" && *p != "null")
        .ok_or(ContactError::MissingPhone)?;
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.len() < MIN_PHONE_DIGITS {
        return Err(ContactError::InvalidPhone);
    }
    Ok(digits)
}

/// `https://wa.me/91{digits}?text=...` with a prefilled enquiry.
pub fn whatsapp_link(phone: Option<&str>, item_name: &str) -> Result<Url, ContactError> {
    let digits = normalize_phone(phone)?;
    let message = format!(
        "Hi, I am interested in your item \"{}\" listed on UniMart.",
        item_name
    );
    Url::parse_with_params(
        &format!("https://wa.me/{}{}", COUNTRY_CODE, digits),
        &[("text", message)],
    )
    .map_err(|_| ContactError::InvalidPhone)
}
