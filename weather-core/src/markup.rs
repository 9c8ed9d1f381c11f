//! Removal of HTML/XML markup from untrusted text.

/// Drops everything between `<` and the matching `>`, plus HTML comments.
///
/// A `<` only opens a tag when a letter, `/`, `!` or `?` follows it, so
/// text like `5 < 6` is kept. An unterminated tag swallows the rest of
/// the input.
pub fn strip_tags(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find('<') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];

        if !opens_tag(&tail[1..]) {
            out.push('<');
            rest = &tail[1..];
            continue;
        }

        let end = if tail.starts_with("<!--") {
            tail.find("-->").map(|i| i + 3)
        } else {
            tail.find('>').map(|i| i + 1)
        };

        match end {
            Some(end) => rest = &tail[end..],
            None => return out,
        }
    }

    out.push_str(rest);
    out
}

fn opens_tag(after: &str) -> bool {
    after
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || matches!(c, '/' | '!' | '?'))
}

/// `strip_tags` followed by trimming surrounding whitespace.
pub fn clean(input: &str) -> String {
    strip_tags(input).trim().to_string()
}
