//! `---` delimited front matter at the top of step markdown files.

/// Split a document into (front matter, body).
///
/// Returns `None` for the front matter when the document does not open with a
/// `---` line or the block is never closed; the body is then the whole input.
/// Delimiter lines may end in `\n` or `\r\n`.
pub fn split_front_matter(contents: &str) -> (Option<&str>, &str) {
    let Some(after) = contents
        .strip_prefix("---\n")
        .or_else(|| contents.strip_prefix("---\r\n"))
    else {
        return (None, contents);
    };

    let mut offset = 0;
    for line in after.split_inclusive('\n') {
        if line.trim_end_matches(['\n', '\r']) == "---" {
            let front = after[..offset].trim_end_matches(['\n', '\r']);
            return (Some(front), &after[offset + line.len()..]);
        }
        offset += line.len();
    }
    (None, contents)
}

/// Body of `contents` with any front matter removed.
pub fn strip_front_matter(contents: &str) -> &str {
    split_front_matter(contents).1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_front_matter_from_body() {
        let doc = "---\ntitle: Intro\nhasCode: true\n---\n# Body\n";
        let (front, body) = split_front_matter(doc);
        assert_eq!(front, Some("title: Intro\nhasCode: true"));
        assert_eq!(body, "# Body\n");
    }

    #[test]
    fn crlf_delimiters_are_recognised() {
        let doc = "---\r\ntitle: Intro\r\n---\r\n# Body\r\n";
        assert_eq!(split_front_matter(doc), (Some("title: Intro"), "# Body\r\n"));
        assert_eq!(strip_front_matter(doc), "# Body\r\n");
    }

    #[test]
    fn empty_and_unterminated_closers() {
        assert_eq!(split_front_matter("---\n---\nBody"), (Some(""), "Body"));
        assert_eq!(split_front_matter("---\nkey: v\n---"), (Some("key: v"), ""));
    }

    #[test]
    fn documents_without_front_matter_pass_through() {
        let doc = "# Body\n\n---\n\nmore\n";
        assert_eq!(split_front_matter(doc), (None, doc));
        let unclosed = "---\ntitle: x\n# Body\n";
        assert_eq!(strip_front_matter(unclosed), unclosed);
    }
}
