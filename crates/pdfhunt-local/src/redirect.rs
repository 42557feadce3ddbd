//! Click-tracking redirect unwrapping.
//!
//! Some providers (DuckDuckGo's HTML endpoint) wrap every result as
//! `//duckduckgo.com/l/?uddg=<percent-encoded target>&rut=...`. The target is what we want to
//! filter and fetch.

/// Query parameter carrying the real target.
pub const REDIRECT_TARGET_PARAM: &str = "uddg";

const REDIRECT_HOST: &str = "duckduckgo.com";

fn is_redirect_endpoint(u: &url::Url) -> bool {
    let host_ok = u
        .host_str()
        .map(|h| h == REDIRECT_HOST || h.ends_with(".duckduckgo.com"))
        .unwrap_or(false);
    let path = u.path();
    host_ok && (path == "/l" || path.starts_with("/l/"))
}

/// Return the embedded target if `href` is a redirect wrapper, else `None`.
///
/// Accepts absolute (`https://duckduckgo.com/l/?...`), protocol-relative (`//duckduckgo.com/l/?...`)
/// and path-only (`/l/?...`) forms. A `uddg` parameter on any other host or path is left alone.
pub fn redirect_target(href: &str) -> Option<String> {
    let href = href.trim();
    if !href.contains(REDIRECT_TARGET_PARAM) {
        return None;
    }
    let base = url::Url::parse("https://duckduckgo.com/").ok()?;
    let u = match url::Url::parse(href) {
        Ok(u) => u,
        Err(_) => base.join(href).ok()?,
    };
    if !is_redirect_endpoint(&u) {
        return None;
    }
    u.query_pairs()
        .find(|(k, _)| k == REDIRECT_TARGET_PARAM)
        .map(|(_, v)| v.into_owned())
        .filter(|v| !v.trim().is_empty())
}

/// `href` with any redirect wrapper removed.
pub fn unwrap_redirect(href: &str) -> String {
    redirect_target(href).unwrap_or_else(|| href.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwraps_protocol_relative_wrapper() {
        let href = "//duckduckgo.com/l/?uddg=https%3A%2F%2Fx.com%2Fpapers%2Fa.pdf&amp;rut=abc123";
        assert_eq!(unwrap_redirect(href), "https://x.com/papers/a.pdf");
    }

    #[test]
    fn unwraps_path_only_and_absolute_wrappers() {
        assert_eq!(
            unwrap_redirect("/l/?kh=-1&uddg=https%3A%2F%2Fy.org%2Fb.pdf"),
            "https://y.org/b.pdf"
        );
        assert_eq!(
            unwrap_redirect("https://duckduckgo.com/l/?uddg=https%3A%2F%2Fz.net%2Fc.pdf"),
            "https://z.net/c.pdf"
        );
    }

    #[test]
    fn leaves_plain_links_alone() {
        assert_eq!(unwrap_redirect("https://x.com/doc.pdf"), "https://x.com/doc.pdf");
        assert_eq!(unwrap_redirect("relative/doc.pdf"), "relative/doc.pdf");
        assert!(redirect_target("https://x.com/?q=uddg").is_none());
    }

    #[test]
    fn uddg_outside_the_redirect_endpoint_is_not_unwrapped() {
        let foreign = "https://evil.example/a.html?uddg=https%3A%2F%2Fx%2Fb.pdf";
        assert!(redirect_target(foreign).is_none());
        assert_eq!(unwrap_redirect(foreign), foreign);
        let lookalike = "//duckduckgo.com.evil.example/l/?uddg=https%3A%2F%2Fx%2Fb.pdf";
        assert!(redirect_target(lookalike).is_none());
        assert!(redirect_target("https://duckduckgo.com/search?uddg=https%3A%2F%2Fx%2Fb.pdf").is_none());
        assert!(redirect_target("a.html?uddg=https%3A%2F%2Fx%2Fb.pdf").is_none());
    }

    #[test]
    fn subdomains_of_the_redirect_host_are_accepted() {
        assert_eq!(
            redirect_target("https://html.duckduckgo.com/l/?uddg=https%3A%2F%2Fx.com%2Fd.pdf"),
            Some("https://x.com/d.pdf".to_string())
        );
    }

    #[test]
    fn empty_target_is_not_a_redirect() {
        assert!(redirect_target("//duckduckgo.com/l/?uddg=&rut=x").is_none());
    }
}
