//! Shared text helpers for the diff engine: terminator-preserving line splitting and
//! char-offset arithmetic used when turning character opcodes into highlight ranges.

/// Split `text` into lines, keeping each line's terminator (`\n` or `\r\n`).
///
/// An empty text has zero lines; a trailing line without terminator is kept as-is.
pub fn split_lines(text: &str) -> Vec<String> {
    text.split_inclusive('\n').map(str::to_owned).collect()
}

/// Concatenate lines back into one text. Inverse of [`split_lines`].
pub fn join_lines<S: AsRef<str>>(lines: &[S]) -> String {
    let mut out = String::with_capacity(lines.iter().map(|l| l.as_ref().len()).sum());
    for line in lines {
        out.push_str(line.as_ref());
    }
    out
}

/// Number of Unicode scalar values in `s`.
#[inline]
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Strip a trailing `\n` / `\r\n` for display purposes.
#[inline]
pub fn trim_terminator(line: &str) -> &str {
    line.trim_end_matches(['\r', '\n'])
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Terminators stay attached to their line and the last unterminated line survives.
    #[test]
    fn split_keeps_terminators() {
        assert_eq!(split_lines("a\nb\r\nc"), vec!["a\n", "b\r\n", "c"]);
        assert_eq!(split_lines("a\n"), vec!["a\n"]);
        assert!(split_lines("").is_empty());
    }

    /// Joining the split lines reproduces the input byte for byte.
    #[test]
    fn join_inverts_split() {
        let text = "fn main() {\n    println!(\"hi\");\n}\n";
        assert_eq!(join_lines(&split_lines(text)), text);
    }

    /// Char length counts scalar values rather than bytes.
    #[test]
    fn char_len_counts_scalars() {
        assert_eq!(char_len("héllo"), 5);
        assert_eq!(trim_terminator("x\r\n"), "x");
    }
}
