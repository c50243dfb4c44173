use crate::mapping::PathMapping;
use aho_corasick::{AhoCorasickBuilder, MatchKind};

/// Replaces every literal occurrence of every mapped reference in `html`.
///
/// One left-to-right pass; at each position the longest reference wins, so a
/// full url is replaced as a whole rather than through its path suffix, and
/// replacement text is never matched again.
#[tracing::instrument(skip(html, mapping))]
pub fn rewrite_references(html: &str, mapping: &PathMapping) -> String {
    if mapping.is_empty() {
        return html.to_string();
    }
    let mut references: Vec<&str> = Vec::with_capacity(mapping.len());
    let mut local_paths: Vec<&str> = Vec::with_capacity(mapping.len());
    for (reference, local) in mapping.iter() {
        references.push(reference);
        local_paths.push(local);
    }
    let ac = AhoCorasickBuilder::new()
        .match_kind(MatchKind::LeftmostLongest)
        .build(&references);
    ac.replace_all(html, &local_paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping() -> PathMapping {
        let mut mapping = PathMapping::default();
        mapping.register("https://example.test/css/a.css", "/css/a.css", "./css/a.css");
        mapping.register(
            "https://example.test/img/logo.png?v=2",
            "/img/logo.png",
            "./img/logo.png",
        );
        mapping
    }

    #[test]
    fn test_absolute_and_root_relative_references() {
        let html = r#"<link rel="stylesheet" href="https://example.test/css/a.css"><img src="/img/logo.png">"#;
        let out = rewrite_references(html, &mapping());
        assert_eq!(
            out,
            r#"<link rel="stylesheet" href="./css/a.css"><img src="./img/logo.png">"#
        );
    }

    #[test]
    fn test_every_occurrence_is_replaced() {
        let html = "<!-- /css/a.css --><script>load('/css/a.css')</script><a href=\"/css/a.css\">";
        let out = rewrite_references(html, &mapping());
        assert!(!out.contains("'/css/a.css'"));
        assert_eq!(out.matches("./css/a.css").count(), 3);
    }

    #[test]
    fn test_metacharacters_match_literally() {
        let html = r#"<img src="https://example.test/img/logo.png?v=2"><img src="https://example.test/img/logoXpng">"#;
        let out = rewrite_references(html, &mapping());
        assert!(out.contains(r#"<img src="./img/logo.png">"#));
        assert!(out.contains("logoXpng"));
        assert!(!out.contains("https://example.test/img/logo.png?v=2"));
    }

    #[test]
    fn test_full_url_is_not_split_by_its_path() {
        let html = r#"<link href="https://example.test/css/a.css">"#;
        let out = rewrite_references(html, &mapping());
        assert!(!out.contains("https://example.test"));
        assert!(!out.contains("../"));
    }

    #[test]
    fn test_empty_mapping_leaves_document_untouched() {
        let html = "<html><body>hi</body></html>";
        assert_eq!(rewrite_references(html, &PathMapping::default()), html);
    }
}
