//! Optional `KEY=VALUE` env-file loader (opt-in via `PDFHUNT_ENV_FILE`).
//!
//! Sets vars only if they are not already present in the process environment, and never logs
//! values.

/// Parse `KEY=VALUE` lines. Blank lines, `#` comments and lines without `=` are skipped.
pub fn parse_env_lines(txt: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for raw in txt.lines() {
        let s = raw.trim();
        if s.is_empty() || s.starts_with('#') {
            continue;
        }
        let Some((k, v)) = s.split_once('=') else {
            continue;
        };
        let k = k.trim();
        if k.is_empty() {
            continue;
        }
        out.push((k.to_string(), v.trim().to_string()));
    }
    out
}

/// Load the file named by `PDFHUNT_ENV_FILE`, if any. Returns how many vars were set.
pub fn load_from_env() -> usize {
    let Ok(p) = std::env::var("PDFHUNT_ENV_FILE") else {
        return 0;
    };
    let p = p.trim();
    if p.is_empty() {
        return 0;
    }
    let Ok(txt) = std::fs::read_to_string(p) else {
        return 0;
    };
    let mut n = 0;
    for (k, v) in parse_env_lines(&txt) {
        // Don't override explicit process env.
        if std::env::var_os(&k).is_none() {
            std::env::set_var(&k, v);
            n += 1;
        }
    }
    n
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pairs_and_skips_noise() {
        let txt = "\n# comment\nPDFHUNT_PROVIDER = duckduckgo\nnot a pair\n=novalue\nA=b=c\n";
        assert_eq!(
            parse_env_lines(txt),
            vec![
                ("PDFHUNT_PROVIDER".to_string(), "duckduckgo".to_string()),
                ("A".to_string(), "b=c".to_string()),
            ]
        );
    }
}
