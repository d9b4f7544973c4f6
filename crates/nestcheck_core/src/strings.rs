//! String utilities verified by the nestcheck self-test suite.
//!
//! ## Notes
//! - All positions are byte offsets. Parentheses are ASCII, so every reported position is a valid
//!   `char` boundary.
//! - Whitespace follows [`char::is_whitespace`].

/// Replace every occurrence of `find` in `src` with `replace`.
///
/// ## Parameters
/// - `src`: input text.
/// - `find`: substring to search for.
/// - `replace`: replacement text (may be empty, which deletes matches).
///
/// ## Returns
/// - `(String, usize)`: the transformed text and the number of substitutions performed.
///
/// ## Notes
/// - An empty `find` matches nothing: the input is returned unchanged with a count of `0`.
/// - Matches are non-overlapping and scanned left to right.
///
/// ## Examples
/// ```rust
/// use nestcheck_core::replace_counted;
/// assert_eq!(
///     replace_counted("some X random string X", "X", "random"),
///     ("some random random string random".to_string(), 2)
/// );
/// ```
pub fn replace_counted(src: &str, find: &str, replace: &str) -> (String, usize) {
    if find.is_empty() {
        return (src.to_string(), 0);
    }

    let mut out = String::with_capacity(src.len());
    let mut count = 0;
    let mut last = 0;
    for (idx, matched) in src.match_indices(find) {
        out.push_str(&src[last..idx]);
        out.push_str(replace);
        last = idx + matched.len();
        count += 1;
    }
    out.push_str(&src[last..]);
    (out, count)
}

/// Remove trailing whitespace in place.
pub fn rstrip_in_place(s: &mut String) {
    let kept = s.trim_end().len();
    s.truncate(kept);
}

/// Remove leading and trailing whitespace in place.
pub fn strip_in_place(s: &mut String) {
    rstrip_in_place(s);
    let leading = s.len() - s.trim_start().len();
    s.drain(..leading);
}

/// Outcome of a balanced-parenthesis scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParenScan {
    /// Whether the requested unmatched parenthesis was reached.
    pub found: bool,
    /// Byte offset of the parenthesis when found; otherwise the scan's end sentinel
    /// (`0` for [`find_unmatched_open`], the input length for [`find_unmatched_close`]).
    pub position: usize,
    /// Number of unmatched parentheses passed, including the one found.
    pub unmatched: u32,
}

impl ParenScan {
    fn missing(position: usize, unmatched: u32) -> Self {
        Self {
            found: false,
            position,
            unmatched,
        }
    }
}

/// Find the `k`-th unmatched `(` scanning backwards from `from` (exclusive).
///
/// Balanced `( ... )` pairs between the scan point and the candidate are skipped.
///
/// ## Parameters
/// - `text`: text to scan.
/// - `from`: byte offset to start from; clamped to `text.len()`.
/// - `k`: which unmatched parenthesis to stop at, counting from 1.
///
/// ## Returns
/// - (`ParenScan`): `found` with the parenthesis position, or `position == 0` when the start of
///   the text is reached first.
///
/// ## Notes
/// - `k == 0` never matches. This is a fixed contract, not "the first one".
///
/// ## Examples
/// ```rust
/// use nestcheck_core::find_unmatched_open;
/// let scan = find_unmatched_open("f(a, (b), c", 11, 1);
/// assert!(scan.found);
/// assert_eq!(scan.position, 1);
/// ```
pub fn find_unmatched_open(text: &str, from: usize, k: u32) -> ParenScan {
    if k == 0 {
        return ParenScan::missing(0, 0);
    }

    let end = from.min(text.len());
    let mut depth = 0u32;
    let mut unmatched = 0u32;
    for (pos, byte) in text.as_bytes()[..end].iter().enumerate().rev() {
        match byte {
            b')' => depth += 1,
            b'(' if depth > 0 => depth -= 1,
            b'(' => {
                unmatched += 1;
                if unmatched == k {
                    return ParenScan {
                        found: true,
                        position: pos,
                        unmatched,
                    };
                }
            }
            _ => {}
        }
    }
    ParenScan::missing(0, unmatched)
}

/// Find the `k`-th unmatched `)` scanning forwards from `from` (inclusive).
///
/// ## Returns
/// - (`ParenScan`): `found` with the parenthesis position, or `position == text.len()` when the
///   end of the text is reached first.
///
/// ## Notes
/// - `k == 0` never matches.
pub fn find_unmatched_close(text: &str, from: usize, k: u32) -> ParenScan {
    if k == 0 {
        return ParenScan::missing(text.len(), 0);
    }

    let start = from.min(text.len());
    let mut depth = 0u32;
    let mut unmatched = 0u32;
    for (offset, byte) in text.as_bytes()[start..].iter().enumerate() {
        match byte {
            b'(' => depth += 1,
            b')' if depth > 0 => depth -= 1,
            b')' => {
                unmatched += 1;
                if unmatched == k {
                    return ParenScan {
                        found: true,
                        position: start + offset,
                        unmatched,
                    };
                }
            }
            _ => {}
        }
    }
    ParenScan::missing(text.len(), unmatched)
}
