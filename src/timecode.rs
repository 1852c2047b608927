use crate::error::{MediaError, Result};

/// Parse `HH:MM:SS`, `MM:SS` or plain seconds (`45`, `12.5`) into seconds.
///
/// The colon forms take whole numbers only; the plain form allows a
/// single decimal point.
pub fn parse_time(input: &str) -> Result<f64> {
    let parts: Vec<&str> = input.split(':').collect();

    let seconds = match parts.as_slice() {
        [h, m, s] if all_digits(&[h, m, s]) => {
            Some(whole(h) * 3600.0 + whole(m) * 60.0 + whole(s))
        }
        [m, s] if all_digits(&[m, s]) => Some(whole(m) * 60.0 + whole(s)),
        [plain] if is_decimal(plain) => plain.parse::<f64>().ok(),
        _ => None,
    };

    seconds.ok_or_else(|| invalid(input))
}

fn all_digits(parts: &[&&str]) -> bool {
    parts
        .iter()
        .all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()))
}

fn is_decimal(s: &str) -> bool {
    let digits = s.chars().filter(|c| c.is_ascii_digit()).count();
    let dots = s.chars().filter(|&c| c == '.').count();
    digits > 0 && dots <= 1 && digits + dots == s.chars().count()
}

// Callers only pass non-empty ASCII digit strings, which always parse.
fn whole(part: &str) -> f64 {
    part.parse::<f64>().unwrap_or_default()
}

fn invalid(input: &str) -> MediaError {
    MediaError::InvalidParameter(format!(
        "Invalid time format: {}. Use HH:MM:SS, MM:SS or seconds.",
        input
    ))
}
