//! Listing of known multibase encodings
//!
//! Entries are ordered case-insensitively by prefix character, with the
//! lowercase prefix ahead of its uppercase twin (`base32` before
//! `base32upper`). This ordering is what users see, so it must not change.

use std::cmp::Ordering;
use std::io::{self, Write};

use crate::encoding::EncodingEntry;

/// Which columns to show besides the name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisplayFlags {
    /// Show the prefix character
    pub prefix: bool,
    /// Show the numeric code
    pub numeric: bool,
}

/// Code with its character lowercased; non-scalar codes are left as is
fn folded(code: u32) -> u32 {
    char::from_u32(code)
        .map(|c| c.to_lowercase().next().unwrap_or(c) as u32)
        .unwrap_or(code)
}

/// Ordering of two entries in the listing
pub fn compare(a: &EncodingEntry, b: &EncodingEntry) -> Ordering {
    folded(a.code)
        .cmp(&folded(b.code))
        // lowercase letters have the larger code and come first
        .then_with(|| b.code.cmp(&a.code))
}

/// Sort entries into listing order
pub fn sort_entries(entries: &mut [EncodingEntry]) {
    entries.sort_by(compare);
}

/// Prefix column character; anything outside printable ASCII becomes a space
pub fn display_char(code: u32) -> char {
    match u8::try_from(code) {
        Ok(byte @ 32..=126) => char::from(byte),
        _ => ' ',
    }
}

/// Render one listing line, without the trailing newline
pub fn render_line(entry: &EncodingEntry, flags: DisplayFlags) -> String {
    let c = display_char(entry.code);
    match (flags.prefix, flags.numeric) {
        (true, true) => format!("{} {:>5}  {}", c, entry.code, entry.name),
        (true, false) => format!("{}  {}", c, entry.name),
        (false, true) => format!("{:>5}  {}", entry.code, entry.name),
        (false, false) => entry.name.to_string(),
    }
}

/// Sort and render every entry, one line each
pub fn render(entries: impl IntoIterator<Item = EncodingEntry>, flags: DisplayFlags) -> Vec<String> {
    let mut entries: Vec<EncodingEntry> = entries.into_iter().collect();
    sort_entries(&mut entries);
    entries.iter().map(|e| render_line(e, flags)).collect()
}

/// Write the listing to `out`
pub fn write_bases<W: Write>(
    out: &mut W,
    entries: impl IntoIterator<Item = EncodingEntry>,
    flags: DisplayFlags,
) -> io::Result<()> {
    for line in render(entries, flags) {
        writeln!(out, "{}", line)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::known_encodings;

    fn entry(code: char, name: &'static str) -> EncodingEntry {
        EncodingEntry {
            code: code as u32,
            name,
        }
    }

    fn small_registry() -> Vec<EncodingEntry> {
        vec![
            entry('B', "base32upper"),
            entry('b', "base32"),
            entry('0', "base2"),
        ]
    }

    #[test]
    fn lowercase_before_uppercase() {
        let lines = render(small_registry(), DisplayFlags::default());
        assert_eq!(lines, vec!["base2", "base32", "base32upper"]);
    }

    #[test]
    fn order_is_independent_of_input_order() {
        let mut reversed = known_encodings();
        reversed.reverse();
        assert_eq!(
            render(known_encodings(), DisplayFlags::default()),
            render(reversed, DisplayFlags::default())
        );
    }

    #[test]
    fn sort_is_total_and_case_folded() {
        let mut entries = known_encodings();
        sort_entries(&mut entries);
        for pair in entries.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert_eq!(compare(a, b), Ordering::Less, "{} vs {}", a.name, b.name);
            if folded(a.code) == folded(b.code) {
                assert!(a.code > b.code);
            } else {
                assert!(folded(a.code) < folded(b.code));
            }
        }
    }

    #[test]
    fn full_registry_listing() {
        let lines = render(known_encodings(), DisplayFlags::default());
        assert_eq!(
            lines,
            vec![
                "identity",
                "base2",
                "base8",
                "base10",
                "base32",
                "base32upper",
                "base32pad",
                "base32padupper",
                "base16",
                "base16upper",
                "base32z",
                "base36",
                "base36upper",
                "base64",
                "base64pad",
                "base32hexpad",
                "base32hexpadupper",
                "base64url",
                "base64urlpad",
                "base32hex",
                "base32hexupper",
                "base58btc",
                "base58flickr",
            ]
        );
        assert_eq!(lines.len(), known_encodings().len());
    }

    #[test]
    fn non_printable_codes_render_as_space() {
        assert_eq!(display_char(0), ' ');
        assert_eq!(display_char(31), ' ');
        assert_eq!(display_char(127), ' ');
        assert_eq!(display_char(0x1F680), ' ');
        assert_eq!(display_char(32), ' ');
        assert_eq!(display_char('~' as u32), '~');
        assert_eq!(display_char('b' as u32), 'b');
    }

    #[test]
    fn flag_combinations() {
        let b = entry('b', "base32");
        let both = DisplayFlags {
            prefix: true,
            numeric: true,
        };
        let prefix = DisplayFlags {
            prefix: true,
            numeric: false,
        };
        let numeric = DisplayFlags {
            prefix: false,
            numeric: true,
        };
        assert_eq!(render_line(&b, both), "b    98  base32");
        assert_eq!(render_line(&b, prefix), "b  base32");
        assert_eq!(render_line(&b, numeric), "   98  base32");
        assert_eq!(render_line(&b, DisplayFlags::default()), "base32");

        let identity = EncodingEntry {
            code: 0,
            name: "identity",
        };
        assert_eq!(render_line(&identity, both), "      0  identity");
    }

    #[test]
    fn both_flags_line_shape() {
        let both = DisplayFlags {
            prefix: true,
            numeric: true,
        };
        for line in render(known_encodings(), both) {
            let bytes = line.as_bytes();
            assert_eq!(bytes[1], b' ', "{:?}", line);
            let number = &line[2..7];
            assert!(number.trim_start().parse::<u32>().is_ok(), "{:?}", line);
            assert_eq!(&line[7..9], "  ", "{:?}", line);
            assert!(!line[9..].is_empty());
        }
    }

    #[test]
    fn write_bases_emits_one_line_per_entry() {
        let mut out = Vec::new();
        write_bases(&mut out, small_registry(), DisplayFlags::default()).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "base2\nbase32\nbase32upper\n");
    }
}
