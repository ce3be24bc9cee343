//! Pre-parse repair for hand-edited and legacy task files.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::borrow::Cow;

static AMPERSAND_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(?:#[0-9]+;|#x[0-9A-Fa-f]+;|amp;|lt;|gt;|quot;|apos;)?")
        .expect("valid ampersand regex")
});

/// Escapes every `&` that does not start a well-formed XML reference.
///
/// Legacy writers stored names such as `R&D` unescaped. Existing references
/// are left alone, so the repair is idempotent and encoder output passes
/// through unchanged. A numeric reference counts only when it names a
/// legal XML character; `&#0;` becomes the literal text `&#0;`.
pub fn repair_ampersands(text: &str) -> Cow<'_, str> {
    AMPERSAND_RE.replace_all(text, |caps: &Captures<'_>| {
        let matched = &caps[0];
        let keep = match matched.strip_prefix("&#") {
            Some(number) => is_xml_char_reference(number.trim_end_matches(';')),
            None => matched.len() > 1,
        };
        if keep {
            matched.to_string()
        } else {
            format!("&amp;{}", &matched[1..])
        }
    })
}

fn is_xml_char_reference(number: &str) -> bool {
    let code = match number.strip_prefix('x') {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => number.parse::<u32>(),
    };
    matches!(
        code,
        Ok(0x9 | 0xA | 0xD | 0x20..=0xD7FF | 0xE000..=0xFFFD | 0x10000..=0x10FFFF)
    )
}

#[cfg(test)]
mod tests {
    use super::repair_ampersands;

    #[test]
    fn bare_ampersands_are_escaped() {
        assert_eq!(
            repair_ampersands(r#"<Task name="R&D & QA"/>"#),
            r#"<Task name="R&amp;D &amp; QA"/>"#
        );
    }

    #[test]
    fn existing_references_are_kept() {
        let text = r#"<Task name="a &amp; b &lt;c&gt; &quot;d&quot; &#38; &#x26;"/>"#;
        assert_eq!(repair_ampersands(text), text);
    }

    #[test]
    fn numeric_references_outside_the_xml_range_are_escaped() {
        assert_eq!(
            repair_ampersands("a &#0; b &#99999999; c &#xD800; d &#9;"),
            "a &amp;#0; b &amp;#99999999; c &amp;#xD800; d &#9;"
        );
    }

    #[test]
    fn repair_is_idempotent() {
        let once = repair_ampersands("x & y &unknown;").into_owned();
        let twice = repair_ampersands(&once).into_owned();
        assert_eq!(once, "x &amp; y &amp;unknown;");
        assert_eq!(once, twice);
    }
}
