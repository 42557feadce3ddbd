//! Extension filter and result cap over extracted anchors.

use crate::extract::AnchorPair;
use crate::redirect;
use pdfhunt_core::{SearchCandidate, SearchQuery};
use std::collections::BTreeSet;

#[derive(Debug, Clone)]
pub struct RankOptions {
    /// Literal, case-sensitive suffix the link must end with.
    pub target_extension: String,
    pub max_results: usize,
    /// Off by default: duplicate links from distinct anchors each count toward the cap.
    pub dedup_links: bool,
    /// Replace click-tracking wrappers by their target before testing the suffix.
    pub unwrap_redirects: bool,
}

impl RankOptions {
    pub fn for_query(q: &SearchQuery, unwrap_redirects: bool) -> Self {
        Self {
            target_extension: q.target_extension.clone(),
            max_results: q.max_results,
            dedup_links: q.dedup_links,
            unwrap_redirects,
        }
    }
}

/// Keep pairs whose trimmed text is non-empty and whose link ends with the extension, in input
/// order, stopping at `max_results`.
pub fn rank_candidates<'a, I>(pairs: I, opts: &RankOptions) -> Vec<SearchCandidate>
where
    I: IntoIterator<Item = &'a AnchorPair>,
{
    let mut out: Vec<SearchCandidate> = Vec::new();
    if opts.max_results == 0 {
        return out;
    }
    let mut seen = BTreeSet::<String>::new();
    for p in pairs {
        let title = p.text.trim();
        if title.is_empty() {
            continue;
        }
        let link = if opts.unwrap_redirects {
            redirect::unwrap_redirect(&p.href)
        } else {
            p.href.clone()
        };
        if !link.ends_with(opts.target_extension.as_str()) {
            continue;
        }
        if opts.dedup_links && !seen.insert(link.clone()) {
            continue;
        }
        out.push(SearchCandidate {
            title: title.to_string(),
            link,
        });
        if out.len() >= opts.max_results {
            break;
        }
    }
    out
}
