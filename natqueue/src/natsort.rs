//! Natural-order string comparison.
//!
//! Runs of ASCII digits are compared by magnitude instead of character by
//! character, so `"c2"` orders before `"c10"`. A digit run starting with `0`
//! is treated as a fractional part and compared left-aligned, which keeps
//! `"1.05"` before `"1.5"`. Whitespace in front of a token is ignored.

use std::cmp::Ordering;

pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    compare(a.as_bytes(), b.as_bytes(), false)
}

pub fn natural_cmp_ignore_case(a: &str, b: &str) -> Ordering {
    compare(a.as_bytes(), b.as_bytes(), true)
}

// Past the end of the input reads as NUL, which is neither a digit nor
// whitespace and sorts below every other byte.
fn at(s: &[u8], i: usize) -> u8 {
    s.get(i).copied().unwrap_or(0)
}

fn compare(a: &[u8], b: &[u8], fold_case: bool) -> Ordering {
    let (mut ai, mut bi) = (0, 0);

    loop {
        while at(a, ai).is_ascii_whitespace() {
            ai += 1;
        }
        while at(b, bi).is_ascii_whitespace() {
            bi += 1;
        }

        let (mut ca, mut cb) = (at(a, ai), at(b, bi));

        if ca.is_ascii_digit() && cb.is_ascii_digit() {
            let ordering = if ca == b'0' || cb == b'0' {
                compare_fractional(&a[ai..], &b[bi..])
            } else {
                compare_integral(&a[ai..], &b[bi..])
            };
            if ordering.is_ne() {
                return ordering;
            }
        }

        if ca == 0 && cb == 0 {
            return Ordering::Equal;
        }

        if fold_case {
            ca = ca.to_ascii_uppercase();
            cb = cb.to_ascii_uppercase();
        }

        match ca.cmp(&cb) {
            Ordering::Equal => {}
            ordering => return ordering,
        }

        ai += 1;
        bi += 1;
    }
}

/// Longest run wins; between equally long runs the first differing digit
/// decides.
fn compare_integral(a: &[u8], b: &[u8]) -> Ordering {
    let mut bias = Ordering::Equal;

    for i in 0.. {
        let (ca, cb) = (at(a, i), at(b, i));
        match (ca.is_ascii_digit(), cb.is_ascii_digit()) {
            (false, false) => return bias,
            (false, true) => return Ordering::Less,
            (true, false) => return Ordering::Greater,
            (true, true) => {
                if bias.is_eq() {
                    bias = ca.cmp(&cb);
                }
            }
        }
    }

    bias
}

/// Left-aligned digit comparison; the first difference decides.
fn compare_fractional(a: &[u8], b: &[u8]) -> Ordering {
    for i in 0.. {
        let (ca, cb) = (at(a, i), at(b, i));
        match (ca.is_ascii_digit(), cb.is_ascii_digit()) {
            (false, false) => return Ordering::Equal,
            (false, true) => return Ordering::Less,
            (true, false) => return Ordering::Greater,
            (true, true) => match ca.cmp(&cb) {
                Ordering::Equal => {}
                ordering => return ordering,
            },
        }
    }

    Ordering::Equal
}

#[cfg(test)]
mod tests {
    use std::cmp::Ordering;

    use itertools::Itertools;
    use rstest::rstest;

    use super::{natural_cmp, natural_cmp_ignore_case};

    #[rstest]
    #[case("c2", "c10", Ordering::Less)]
    #[case("c10", "c2", Ordering::Greater)]
    #[case("a", "b", Ordering::Less)]
    #[case("abc", "abc", Ordering::Equal)]
    #[case("", "", Ordering::Equal)]
    #[case("", "a", Ordering::Less)]
    #[case("x9", "x09", Ordering::Greater)]
    #[case("1.05", "1.5", Ordering::Less)]
    #[case("1.5", "1.010", Ordering::Greater)]
    #[case("  leading", "leading", Ordering::Equal)]
    #[case("img12.png", "img12.png", Ordering::Equal)]
    #[case("img12.png", "img100.png", Ordering::Less)]
    #[case("abc", "ABC", Ordering::Greater)]
    #[case("v1.2.10", "v1.2.9", Ordering::Greater)]
    fn test_natural_cmp(#[case] a: &str, #[case] b: &str, #[case] expected: Ordering) {
        assert_eq!(natural_cmp(a, b), expected);
    }

    #[rstest]
    #[case("abc", "ABC", Ordering::Equal)]
    #[case("File2", "file10", Ordering::Less)]
    #[case("b", "A", Ordering::Greater)]
    fn test_natural_cmp_ignore_case(#[case] a: &str, #[case] b: &str, #[case] expected: Ordering) {
        assert_eq!(natural_cmp_ignore_case(a, b), expected);
    }

    #[test]
    fn test_orders_file_names_like_a_human() {
        let names = [
            "rfc822.txt",
            "rfc1.txt",
            "rfc2086.txt",
            "x2-g8",
            "x2-y08",
            "x2-y7",
            "x8-y8",
        ];
        let sorted = names.into_iter().sorted_by(|a, b| natural_cmp(a, b)).collect_vec();
        assert_eq!(
            sorted,
            ["rfc1.txt", "rfc822.txt", "rfc2086.txt", "x2-g8", "x2-y08", "x2-y7", "x8-y8"]
        );
    }
}
