//! Numeric utilities: centralized integer conversions for pagination and slicing.
//!
//! Page math is done in `u64`; slicing in-memory result sets needs `usize`.
//! Conversions saturate instead of truncating.

#[inline]
#[must_use]
pub fn u64_to_usize_saturating(v: u64) -> usize {
    usize::try_from(v).unwrap_or(usize::MAX)
}

#[inline]
#[must_use]
pub fn usize_to_u64(v: usize) -> u64 {
    u64::try_from(v).unwrap_or(u64::MAX)
}

/// Parse the leading base-10 integer of `s`, ignoring leading whitespace and any trailing text.
///
/// `"10"` and `"10abc"` yield 10; `"abc"`, `""` and `"-"` yield `None`.
#[must_use]
pub fn parse_leading_int(s: &str) -> Option<i64> {
    let t = s.trim_start();
    let (neg, digits) = match t.as_bytes().first() {
        Some(b'-') => (true, &t[1..]),
        Some(b'+') => (false, &t[1..]),
        _ => (false, t),
    };
    let end = digits.bytes().take_while(u8::is_ascii_digit).count();
    if end == 0 {
        return None;
    }
    let n: i64 = digits[..end].parse().ok()?;
    Some(if neg { -n } else { n })
}
