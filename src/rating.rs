use crate::formats::Rating;

pub const MAX_STARS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Star {
    Filled,
    Empty,
}

impl Star {
    pub fn css_class(self) -> &'static str {
        match self {
            Star::Filled => "star filled",
            Star::Empty => "star",
        }
    }
}

/// Five ordered stars for a rating, or `None` when the rating is missing or
/// falsy (numeric zero, empty text).
pub fn stars(rating: Option<&Rating>) -> Option<[Star; MAX_STARS]> {
    let rating = rating.filter(|r| !is_falsy(r))?;
    let value = parse_rating(rating);

    let mut out = [Star::Empty; MAX_STARS];
    for (idx, star) in out.iter_mut().enumerate() {
        if (idx as i64) < value {
            *star = Star::Filled;
        }
    }
    Some(out)
}

pub fn filled_count(rating: Option<&Rating>) -> usize {
    stars(rating)
        .map(|s| s.iter().filter(|star| **star == Star::Filled).count())
        .unwrap_or(0)
}

fn is_falsy(rating: &Rating) -> bool {
    match rating {
        Rating::Number(n) => *n == 0.0 || n.is_nan(),
        Rating::Text(text) => text.is_empty(),
    }
}

/// Integer value of a rating; anything unparseable counts as zero.
fn parse_rating(rating: &Rating) -> i64 {
    match rating {
        Rating::Number(n) if n.is_finite() => n.trunc() as i64,
        Rating::Number(_) => 0,
        Rating::Text(text) => parse_int_prefix(text).unwrap_or(0),
    }
}

/// Integer prefix of `input`: leading whitespace, an optional sign, then
/// decimal digits (or hex digits after `0x`). Trailing garbage is ignored.
fn parse_int_prefix(input: &str) -> Option<i64> {
    let s = input.trim_start();
    let (negative, s) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let (radix, s) = match s.get(..2) {
        Some("0x") | Some("0X") => (16, &s[2..]),
        _ => (10, s),
    };

    let digits_end = s
        .char_indices()
        .find(|(_, c)| !c.is_digit(radix))
        .map(|(idx, _)| idx)
        .unwrap_or(s.len());
    let digits = &s[..digits_end];
    if digits.is_empty() {
        return None;
    }

    // Saturate instead of overflowing on absurdly long digit runs.
    let value = i64::from_str_radix(digits, radix).unwrap_or(i64::MAX);
    Some(if negative { -value } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Rating {
        Rating::Text(s.to_owned())
    }

    #[test]
    fn missing_or_falsy_rating_renders_nothing() {
        assert_eq!(stars(None), None);
        assert_eq!(stars(Some(&Rating::Number(0.0))), None);
        assert_eq!(stars(Some(&text(""))), None);
    }

    #[test]
    fn always_five_stars_with_clamped_fill() {
        let cases = [
            (Rating::Number(3.0), 3),
            (Rating::Number(4.9), 4),
            (Rating::Number(9.0), 5),
            (Rating::Number(-2.0), 0),
            (text("2"), 2),
            (text(" 4 stars"), 4),
            (text("0"), 0),
            (text("great"), 0),
            (text("-1"), 0),
            (text("12"), 5),
        ];
        for (rating, expected) in cases {
            let out = stars(Some(&rating)).expect("truthy rating renders");
            assert_eq!(out.len(), MAX_STARS);
            assert_eq!(filled_count(Some(&rating)), expected, "rating {rating:?}");
        }
    }

    #[test]
    fn filled_stars_come_first() {
        let out = stars(Some(&Rating::Number(2.0))).unwrap();
        assert_eq!(
            out,
            [Star::Filled, Star::Filled, Star::Empty, Star::Empty, Star::Empty]
        );
    }

    #[test]
    fn parse_int_prefix_follows_leading_digits() {
        assert_eq!(parse_int_prefix("3.7"), Some(3));
        assert_eq!(parse_int_prefix("  +5x"), Some(5));
        assert_eq!(parse_int_prefix("0x3"), Some(3));
        assert_eq!(parse_int_prefix("-"), None);
        assert_eq!(parse_int_prefix("abc"), None);
    }
}
