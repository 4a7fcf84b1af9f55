//! Phone number wire format: `+<country code>.<number>`.
//!
//! Both parts are reduced to digits and stripped of leading zeroes. Many
//! users type a run of zeroes before the calling code, and the national
//! trunk prefix (`0` in `07123…`) is not part of the international number.

pub const COUNTRY_CODE_PREFIX: char = '+';
pub const CONNECTING_CHAR: char = '.';

fn digits_without_leading_zeroes(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    digits.trim_start_matches('0').to_owned()
}

/// Assemble the wire phone number from the two phone rows.
pub fn format_phone_number(country_code: &str, number: &str) -> String {
    format!(
        "{COUNTRY_CODE_PREFIX}{}{CONNECTING_CHAR}{}",
        digits_without_leading_zeroes(country_code),
        digits_without_leading_zeroes(number)
    )
}

/// Split a stored wire phone number back into `(country code, number)`.
///
/// Returns `None` unless there are exactly two non-empty parts.
pub fn parse_phone_number(stored: &str) -> Option<(String, String)> {
    let cleaned = stored.replace(COUNTRY_CODE_PREFIX, "");
    let parts: Vec<&str> = cleaned
        .split(CONNECTING_CHAR)
        .filter(|p| !p.is_empty())
        .collect();
    match parts.as_slice() {
        [code, number] => Some(((*code).to_owned(), (*number).to_owned())),
        _ => None,
    }
}
