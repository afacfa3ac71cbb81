use crate::consts;

/// Parses the episode number advertised on a listing card, e.g. `"EP 12"`,
/// `"Episode 3"` or `"Capítulo 7"`.
///
/// Returns `None` for text without a recognised prefix and for zero.
pub fn episode_hint(text: &str) -> Option<u32> {
    let captures = consts::EPISODE_HINT_REGEX.captures(text)?;
    positive(captures.get(1)?.as_str())
}

/// Parses the first run of digits in an episode link label.
///
/// Returns `None` when the label has no digits, when the number is zero, or
/// when it does not fit in a `u32`.
pub fn first_number(label: &str) -> Option<u32> {
    let captures = consts::FIRST_NUMBER_REGEX.captures(label)?;
    positive(captures.get(1)?.as_str())
}

fn positive(digits: &str) -> Option<u32> {
    digits.parse::<u32>().ok().filter(|n| *n > 0)
}
