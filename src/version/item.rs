//! Tokenizer and comparable segment ("item") types for the generic version
//! scheme (§4.A). A version string is split into a flat sequence of
//! [`Item`]s; [`compare_items`] implements the padding/precedence rules the
//! spec describes in prose as a lazy, two-cursor walk instead of eagerly
//! materializing padding (see module docs on [`super::Version`] for why).

use std::cmp::Ordering;

/// A single comparable segment of a version: either a numeric run or a
/// qualifier token (already alias-normalized).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    /// Arbitrary-precision-ish numeric segment, stored as a digit string with
    /// no leading zeros so that length-then-lexicographic order equals
    /// mathematical order.
    Numeric(String),
    Qualifier(Qualifier),
}

/// A qualifier token with its resolved sort rank. Known aliases collapse to
/// the same rank (`cr` and `rc` compare equal); unknown tokens sort after
/// every known qualifier and compare lexicographically among themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Qualifier {
    pub rank: QualifierRank,
    /// Lowercased original token, used to break ties among unknown qualifiers
    /// and to render the canonical form.
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum QualifierRank {
    /// Smallest possible version with a given prefix (range shorthand `.min`).
    Min,
    Known(i8),
    /// Unknown alphabetic token; ranked by `text` among themselves.
    Unknown,
    /// Largest possible version with a given prefix (range shorthand `.max`).
    Max,
}

/// Known qualifier aliases and their rank, smallest to largest, per §4.A:
/// alpha=a < beta=b < milestone=m < cr=rc < snapshot < ""=final=ga < sp
const KNOWN_QUALIFIERS: &[(&[&str], i8)] = &[
    (&["alpha", "a"], 0),
    (&["beta", "b"], 1),
    (&["milestone", "m"], 2),
    (&["cr", "rc"], 3),
    (&["snapshot"], 4),
    (&["", "final", "ga"], 5),
    (&["sp"], 6),
];

/// The rank shared by `""`, `final`, and `ga` — the neutral qualifier used to
/// pad a version that has fewer segments than its comparison partner.
pub fn neutral_qualifier() -> Qualifier {
    Qualifier {
        rank: QualifierRank::Known(5),
        text: String::new(),
    }
}

pub fn zero_numeric() -> Item {
    Item::Numeric("0".to_string())
}

fn classify_qualifier(token: &str) -> Qualifier {
    let lower = token.to_ascii_lowercase();
    if lower == "min" {
        return Qualifier {
            rank: QualifierRank::Min,
            text: lower,
        };
    }
    if lower == "max" {
        return Qualifier {
            rank: QualifierRank::Max,
            text: lower,
        };
    }
    for (aliases, rank) in KNOWN_QUALIFIERS {
        if aliases.contains(&lower.as_str()) {
            return Qualifier {
                rank: QualifierRank::Known(*rank),
                text: lower,
            };
        }
    }
    Qualifier {
        rank: QualifierRank::Unknown,
        text: lower,
    }
}

/// Splits a raw version string into a flat list of [`Item`]s.
///
/// Segments break on `.`, `-`, `_`, and on any digit/letter transition within
/// a run of characters that contains no explicit separator.
pub fn tokenize(raw: &str) -> Vec<Item> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut current_is_digit: Option<bool> = None;

    let flush = |current: &mut String, is_digit: Option<bool>, items: &mut Vec<Item>| {
        if current.is_empty() {
            return;
        }
        match is_digit {
            Some(true) => items.push(Item::Numeric(trim_leading_zeros(current))),
            _ => items.push(Item::Qualifier(classify_qualifier(current))),
        }
        current.clear();
    };

    for ch in raw.chars() {
        match ch {
            '.' | '-' | '_' => {
                flush(&mut current, current_is_digit, &mut items);
                current_is_digit = None;
            }
            c if c.is_ascii_digit() => {
                if current_is_digit == Some(false) {
                    flush(&mut current, current_is_digit, &mut items);
                }
                current_is_digit = Some(true);
                current.push(c);
            }
            c => {
                if current_is_digit == Some(true) {
                    flush(&mut current, current_is_digit, &mut items);
                }
                current_is_digit = Some(false);
                current.push(c);
            }
        }
    }
    flush(&mut current, current_is_digit, &mut items);

    if items.is_empty() {
        items.push(zero_numeric());
    }
    items
}

fn trim_leading_zeros(digits: &str) -> String {
    let trimmed = digits.trim_start_matches('0');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

fn cmp_numeric(a: &str, b: &str) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn cmp_qualifier(a: &Qualifier, b: &Qualifier) -> Ordering {
    a.rank.cmp(&b.rank).then_with(|| {
        if a.rank == QualifierRank::Unknown {
            a.text.cmp(&b.text)
        } else {
            Ordering::Equal
        }
    })
}

/// Compares two flat item sequences using the deferred-padding walk: a
/// numeric/qualifier kind mismatch at the same logical position doesn't
/// consume the qualifier side until the numeric side's implicit zero run is
/// exhausted, which is equivalent to (but avoids materializing) the "pad the
/// shorter side with neutral segments" rule in §4.A.
pub fn compare_items(a: &[Item], b: &[Item]) -> Ordering {
    let mut ia = 0usize;
    let mut ib = 0usize;

    loop {
        let ta = a.get(ia);
        let tb = b.get(ib);

        match (ta, tb) {
            (None, None) => return Ordering::Equal,
            (None, Some(Item::Numeric(y))) => {
                match cmp_numeric("0", y) {
                    Ordering::Equal => {}
                    other => return other,
                }
                ib += 1;
            }
            (None, Some(Item::Qualifier(y))) => {
                match cmp_qualifier(&neutral_qualifier(), y) {
                    Ordering::Equal => {}
                    other => return other,
                }
                ib += 1;
            }
            (Some(Item::Numeric(x)), None) => {
                match cmp_numeric(x, "0") {
                    Ordering::Equal => {}
                    other => return other,
                }
                ia += 1;
            }
            (Some(Item::Qualifier(x)), None) => {
                match cmp_qualifier(x, &neutral_qualifier()) {
                    Ordering::Equal => {}
                    other => return other,
                }
                ia += 1;
            }
            (Some(Item::Numeric(x)), Some(Item::Numeric(y))) => {
                match cmp_numeric(x, y) {
                    Ordering::Equal => {
                        ia += 1;
                        ib += 1;
                    }
                    other => return other,
                }
            }
            (Some(Item::Qualifier(x)), Some(Item::Qualifier(y))) => {
                match cmp_qualifier(x, y) {
                    Ordering::Equal => {
                        ia += 1;
                        ib += 1;
                    }
                    other => return other,
                }
            }
            // Kind mismatch: the qualifier side is logically still sitting on
            // an implicit run of zeros that the numeric side is spelling out.
            // Compare that implicit zero against the numeric value and only
            // advance the numeric cursor — the qualifier stays pending.
            (Some(Item::Numeric(x)), Some(Item::Qualifier(_))) => {
                match cmp_numeric(x, "0") {
                    Ordering::Equal => {}
                    other => return other,
                }
                ia += 1;
            }
            (Some(Item::Qualifier(_)), Some(Item::Numeric(y))) => {
                match cmp_numeric("0", y) {
                    Ordering::Equal => {}
                    other => return other,
                }
                ib += 1;
            }
        }
    }
}
