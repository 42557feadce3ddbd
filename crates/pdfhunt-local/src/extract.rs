//! Shallow anchor extraction.
//!
//! This deliberately does not build a DOM. One regex pass picks up anchors of the shape
//! `<a ... href="...">text</a>` whose text has no nested tags. Known blind spots:
//! - anchors with child elements (`<a href="x"><b>t</b></a>`) are skipped
//! - HTML entities in text or href are left encoded
//! - only double-quoted `href` values match
//! - tag and attribute names are case-sensitive (`<A HREF=...>` is skipped)

use regex::Regex;
use std::sync::OnceLock;

const ANCHOR_PATTERN: &str = r#"<a[^>]*href="([^"]*)"[^>]*>([^<]*)</a>"#;

static ANCHOR_RE: OnceLock<Option<Regex>> = OnceLock::new();

fn anchor_re() -> Option<&'static Regex> {
    ANCHOR_RE
        .get_or_init(|| Regex::new(ANCHOR_PATTERN).ok())
        .as_ref()
}

/// Raw `(anchor text, href)` pair, before any filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorPair {
    pub text: String,
    pub href: String,
}

/// The single-pass, non-DOM extraction strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShallowExtractor;

impl ShallowExtractor {
    /// Every simple anchor in document order. Never fails; malformed input yields fewer (or zero)
    /// pairs.
    pub fn extract(&self, html: &str) -> Vec<AnchorPair> {
        let Some(re) = anchor_re() else {
            return Vec::new();
        };
        re.captures_iter(html)
            .map(|c| AnchorPair {
                href: c.get(1).map(|m| m.as_str()).unwrap_or("").to_string(),
                text: c.get(2).map(|m| m.as_str()).unwrap_or("").to_string(),
            })
            .collect()
    }

    /// Same as [`ShallowExtractor::extract`] over a raw response body (decoded lossily).
    pub fn extract_bytes(&self, body: &[u8]) -> Vec<AnchorPair> {
        self.extract(&String::from_utf8_lossy(body))
    }
}

pub fn extract_anchors(html: &str) -> Vec<AnchorPair> {
    ShallowExtractor.extract(html)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn anchor_pattern_compiles() {
        assert!(anchor_re().is_some());
    }

    fn pair(text: &str, href: &str) -> AnchorPair {
        AnchorPair {
            text: text.to_string(),
            href: href.to_string(),
        }
    }

    #[test]
    fn extracts_simple_anchors_in_document_order() {
        let html = r#"<a href="https://x.com/doc.pdf">My Report</a><a href="https://x.com/page.html">Other</a>"#;
        assert_eq!(
            extract_anchors(html),
            vec![
                pair("My Report", "https://x.com/doc.pdf"),
                pair("Other", "https://x.com/page.html"),
            ]
        );
    }

    #[test]
    fn tolerates_other_attributes_around_href() {
        let html = r#"
        <div class="r">
          <a class="result" data-x="1" href="/one.pdf" target="_blank">One</a>
          <a
             href="/two.pdf">Two</a>
        </div>"#;
        let got = extract_anchors(html);
        assert_eq!(got, vec![pair("One", "/one.pdf"), pair("Two", "/two.pdf")]);
    }

    #[test]
    fn keeps_whitespace_and_empty_text_for_the_ranker() {
        let got = extract_anchors(r#"<a href="a.pdf">   </a><a href="b.pdf"></a>"#);
        assert_eq!(got, vec![pair("   ", "a.pdf"), pair("", "b.pdf")]);
    }

    #[test]
    fn skips_anchors_with_nested_tags() {
        let html = r#"<a href="nested.pdf"><b>Bold</b></a><a href="plain.pdf">Plain</a>"#;
        assert_eq!(extract_anchors(html), vec![pair("Plain", "plain.pdf")]);
    }

    #[test]
    fn does_not_decode_entities() {
        let got = extract_anchors(r#"<a href="a.pdf?x=1&amp;y=2">Q&amp;A</a>"#);
        assert_eq!(got, vec![pair("Q&amp;A", "a.pdf?x=1&amp;y=2")]);
    }

    #[test]
    fn single_quoted_and_uppercase_anchors_are_blind_spots() {
        let html = "<a href='single.pdf'>S</a><A HREF=\"upper.pdf\">U</A>";
        assert!(extract_anchors(html).is_empty());
    }

    #[test]
    fn truncated_markup_yields_nothing() {
        assert!(extract_anchors(r#"<a href="doc.pdf">Title"#).is_empty());
        assert!(extract_anchors(r#"<a href="doc.pdf"#).is_empty());
        assert!(extract_anchors("").is_empty());
    }

    #[test]
    fn invalid_utf8_bodies_are_decoded_lossily() {
        let mut body = b"<a href=\"ok.pdf\">Ok</a>".to_vec();
        body.extend_from_slice(&[0xff, 0xfe, 0xfd]);
        let got = ShallowExtractor.extract_bytes(&body);
        assert_eq!(got, vec![pair("Ok", "ok.pdf")]);
    }

    proptest! {
        #[test]
        fn extraction_is_deterministic_and_never_panics(s in any::<String>()) {
            let a = extract_anchors(&s);
            let b = extract_anchors(&s);
            prop_assert_eq!(a, b);
        }

        #[test]
        fn extracted_text_never_contains_tag_open(
            parts in prop::collection::vec("[a-z<>/\"= ]{0,12}", 0..12)
        ) {
            let html = parts.join("<a href=\"x.pdf\">");
            for p in extract_anchors(&html) {
                prop_assert!(!p.text.contains('<'));
                prop_assert!(!p.href.contains('"'));
            }
        }
    }
}
