//! Common utility functions.

/// Converts string of ASCII digits into unsigned number.
///
/// Signs, spaces and anything else make the input invalid.
pub(crate) fn parse_number(input: &str) -> Option<u32> {
    if input.is_empty() || !input.bytes().all(|b| b.is_ascii_digit()) {
        None
    } else {
        input.parse::<u32>().ok()
    }
}

/// Converts string with mnemonic value representation into its index in `values`.
pub(crate) fn parse_alias(input: &str, values: &[&str]) -> Option<u8> {
    if input.is_empty() {
        None
    } else {
        values
            .iter()
            .position(|x| x.eq_ignore_ascii_case(input))
            .and_then(|i| u8::try_from(i).ok())
    }
}

/// Returns `true` if provided year is leap.
#[inline]
pub(crate) fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Returns number of days in specified month, `None` for invalid month.
pub(crate) fn days_in_month(year: i32, month: u32) -> Option<u32> {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => Some(31),
        4 | 6 | 9 | 11 => Some(30),
        2 if is_leap_year(year) => Some(29),
        2 => Some(28),
        _ => None,
    }
}

/// Returns the largest day number the month has in any year.
pub(crate) fn max_days_in_month(month: u32) -> Option<u32> {
    days_in_month(2000, month)
}
