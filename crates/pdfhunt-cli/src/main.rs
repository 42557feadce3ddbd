use anyhow::Result;
use clap::{Parser, Subcommand};
use pdfhunt::selection;
use pdfhunt_core::{
    DownloadBackend, Error, SearchCandidate, SearchProvider, SearchQuery, SearchResponse,
    DEFAULT_TARGET_EXTENSION,
};
use pdfhunt_local::config::clamp_timeout_ms;
use pdfhunt_local::{DownloadConfig, HtmlSearchProvider, LocalDownloader, ProviderKind};
use std::io::Write;
use std::path::{Path, PathBuf};

mod env_file;
mod logging;

#[derive(Parser, Debug)]
#[command(name = "pdfhunt")]
#[command(about = "Search the web for PDF documents and download them", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search and print the numbered candidate list.
    Search(SearchCmd),
    /// Search, pick a candidate (prompt, --select or --all) and download it.
    Get(GetCmd),
    /// Download a known link under a sanitized title.
    Download(DownloadCmd),
    /// Print version info.
    Version(VersionCmd),
}

#[derive(clap::Args, Debug)]
struct SearchArgs {
    /// Query terms (joined with single spaces).
    #[arg(required = true, num_args = 1..)]
    query: Vec<String>,
    /// Search provider. Allowed: yahoo, duckduckgo
    #[arg(long, env = "PDFHUNT_PROVIDER", default_value = "yahoo")]
    provider: String,
    /// Override the provider's results-page URL (e.g. a local test double).
    #[arg(long)]
    endpoint: Option<String>,
    /// Target extension; used for the provider filter token and the link filter.
    #[arg(long, default_value = DEFAULT_TARGET_EXTENSION)]
    ext: String,
    #[arg(long, default_value_t = 10)]
    max_results: usize,
    /// Count each link once toward --max-results.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    dedup: bool,
    /// Search request timeout (ms).
    #[arg(long)]
    timeout_ms: Option<u64>,
}

#[derive(clap::Args, Debug)]
struct DownloadArgs {
    /// Destination directory (created if missing).
    #[arg(long, default_value = ".")]
    dir: PathBuf,
    /// Abort a download after this long without receiving data (ms).
    #[arg(long, env = "PDFHUNT_DOWNLOAD_TIMEOUT_MS")]
    download_timeout_ms: Option<u64>,
}

#[derive(clap::Args, Debug)]
struct SearchCmd {
    #[command(flatten)]
    search: SearchArgs,
    /// Output format: json|text
    #[arg(long = "output", alias = "format", default_value = "text")]
    output: String,
}

#[derive(clap::Args, Debug)]
struct GetCmd {
    #[command(flatten)]
    search: SearchArgs,
    #[command(flatten)]
    download: DownloadArgs,
    /// 1-based candidate number; skips the prompt. 0 or out of range downloads nothing.
    #[arg(long, conflicts_with = "all")]
    select: Option<usize>,
    /// Download every candidate, continuing past individual failures.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    all: bool,
    /// Output format: json|text
    #[arg(long = "output", alias = "format", default_value = "text")]
    output: String,
}

#[derive(clap::Args, Debug)]
struct DownloadCmd {
    #[arg(long)]
    link: String,
    #[arg(long)]
    title: String,
    #[arg(long, default_value = DEFAULT_TARGET_EXTENSION)]
    ext: String,
    #[command(flatten)]
    download: DownloadArgs,
    /// Output format: json|text
    #[arg(long = "output", alias = "format", default_value = "text")]
    output: String,
}

#[derive(clap::Args, Debug)]
struct VersionCmd {
    /// Output format: json|text
    #[arg(long = "output", alias = "format", default_value = "json")]
    output: String,
}

fn is_json(output: &str) -> bool {
    output.trim().eq_ignore_ascii_case("json")
}

fn error_json(e: &Error) -> serde_json::Value {
    serde_json::json!({ "kind": e.kind(), "message": e.to_string() })
}

fn candidates_json(candidates: &[SearchCandidate]) -> Vec<serde_json::Value> {
    candidates
        .iter()
        .enumerate()
        .map(|(i, c)| serde_json::json!({ "index": i + 1, "title": c.title, "link": c.link }))
        .collect()
}

/// Short diagnostic for a failed download, one line.
fn download_diagnostic(e: &Error) -> String {
    match e {
        Error::HttpStatus { status, reason } => format!("Download failed: {status} {reason}"),
        Error::LocalIo { .. } => format!("File error: {e}"),
        Error::Read(_) => format!("Copy error: {e}"),
        _ => format!("Download error: {e}"),
    }
}

fn build_query(args: &SearchArgs) -> Result<SearchQuery> {
    let q = SearchQuery::from_tokens(&args.query);
    if q.query.trim().is_empty() {
        anyhow::bail!("empty query");
    }
    Ok(q.with_extension(args.ext.clone())
        .with_max_results(args.max_results)
        .with_dedup(args.dedup))
}

fn build_provider(args: &SearchArgs) -> Result<HtmlSearchProvider> {
    let kind = ProviderKind::parse(&args.provider).ok_or_else(|| {
        anyhow::anyhow!(
            "unknown provider: {} (allowed: yahoo, duckduckgo)",
            args.provider
        )
    })?;
    let mut cfg = kind.config().with_env_overrides();
    if let Some(ep) = args.endpoint.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        cfg.endpoint = ep.to_string();
    }
    if let Some(ms) = args.timeout_ms {
        cfg.timeout = clamp_timeout_ms(ms);
    }
    HtmlSearchProvider::new(cfg).map_err(|e| anyhow::anyhow!(e.to_string()))
}

fn build_downloader(args: &DownloadArgs) -> Result<LocalDownloader> {
    let mut cfg = DownloadConfig::from_env();
    cfg.dest_dir = args.dir.clone();
    if let Some(ms) = args.download_timeout_ms {
        cfg.read_timeout = clamp_timeout_ms(ms);
    }
    LocalDownloader::new(cfg).map_err(|e| anyhow::anyhow!(e.to_string()))
}

fn ensure_dir(dir: &Path) -> std::result::Result<(), Error> {
    std::fs::create_dir_all(dir).map_err(|e| Error::LocalIo {
        path: dir.to_path_buf(),
        message: e.to_string(),
    })
}

/// Search failures are reported, never fatal.
async fn run_search(
    provider: &HtmlSearchProvider,
    q: &SearchQuery,
) -> std::result::Result<SearchResponse, Error> {
    let r = provider.search(q).await;
    if let Err(e) = &r {
        tracing::debug!(kind = e.kind(), "search failed");
    }
    r
}

async fn cmd_search(args: SearchCmd) -> Result<()> {
    let q = build_query(&args.search)?;
    let provider = build_provider(&args.search)?;
    let json = is_json(&args.output);

    match run_search(&provider, &q).await {
        Ok(r) if json => {
            let v = serde_json::json!({
                "schema_version": 1,
                "kind": "search",
                "ok": true,
                "query": q.query,
                "provider": r.provider,
                "http_status": r.http_status,
                "extracted": r.extracted,
                "results": candidates_json(&r.candidates),
                "timings_ms": r.timings_ms,
            });
            println!("{v}");
        }
        Ok(r) => {
            if r.candidates.is_empty() {
                println!("No PDFs found.");
            } else {
                println!("Found PDFs:");
                print!("{}", selection::format_candidates(&r.candidates));
            }
        }
        Err(e) if json => {
            let v = serde_json::json!({
                "schema_version": 1,
                "kind": "search",
                "ok": false,
                "query": q.query,
                "provider": provider.name(),
                "error": error_json(&e),
            });
            println!("{v}");
        }
        Err(e) => {
            eprintln!("Search error: {e}");
            println!("No PDFs found.");
        }
    }
    Ok(())
}

async fn download_one(
    dl: &LocalDownloader,
    candidate: &SearchCandidate,
    ext: &str,
    json: bool,
) -> serde_json::Value {
    match dl.download(candidate, ext).await {
        Ok(out) => {
            if !json {
                println!("Downloaded: {}", out.path.display());
            }
            serde_json::json!({
                "ok": true,
                "title": candidate.title,
                "link": candidate.link,
                "filename": out.filename,
                "path": out.path.display().to_string(),
                "bytes": out.bytes,
            })
        }
        Err(e) => {
            if !json {
                eprintln!("{}", download_diagnostic(&e));
            }
            serde_json::json!({
                "ok": false,
                "title": candidate.title,
                "link": candidate.link,
                "error": error_json(&e),
            })
        }
    }
}

async fn cmd_get(args: GetCmd) -> Result<()> {
    let q = build_query(&args.search)?;
    let provider = build_provider(&args.search)?;
    let dl = build_downloader(&args.download)?;
    let json = is_json(&args.output);

    let candidates = match run_search(&provider, &q).await {
        Ok(r) => r.candidates,
        Err(e) => {
            if json {
                let v = serde_json::json!({
                    "schema_version": 1,
                    "kind": "get",
                    "ok": false,
                    "query": q.query,
                    "error": error_json(&e),
                });
                println!("{v}");
            } else {
                eprintln!("Search error: {e}");
                println!("No PDFs found.");
            }
            return Ok(());
        }
    };

    if candidates.is_empty() {
        if json {
            let v = serde_json::json!({
                "schema_version": 1,
                "kind": "get",
                "ok": true,
                "query": q.query,
                "results": [],
                "downloads": [],
            });
            println!("{v}");
        } else {
            println!("No PDFs found.");
        }
        return Ok(());
    }

    if !json {
        println!("Found PDFs:");
        print!("{}", selection::format_candidates(&candidates));
    }

    let chosen: Vec<&SearchCandidate> = if args.all {
        candidates.iter().collect()
    } else {
        let idx = match args.select {
            Some(n) => selection::parse_selection(&n.to_string(), candidates.len()),
            None if json => {
                // Keep stdout machine-readable: the prompt goes to stderr.
                selection::prompt_selection_blocking(
                    std::io::stdin(),
                    std::io::stderr(),
                    candidates.len(),
                )
                .await?
            }
            None => {
                std::io::stdout().flush()?;
                selection::prompt_selection_blocking(
                    std::io::stdin(),
                    std::io::stdout(),
                    candidates.len(),
                )
                .await?
            }
        };
        idx.and_then(|i| candidates.get(i)).into_iter().collect()
    };

    let mut downloads: Vec<serde_json::Value> = Vec::new();
    if !chosen.is_empty() {
        if let Err(e) = ensure_dir(&dl.config().dest_dir) {
            if json {
                downloads.push(serde_json::json!({ "ok": false, "error": error_json(&e) }));
            } else {
                eprintln!("{}", download_diagnostic(&e));
            }
        } else {
            for c in chosen {
                downloads.push(download_one(&dl, c, &q.target_extension, json).await);
            }
        }
    }

    if json {
        let v = serde_json::json!({
            "schema_version": 1,
            "kind": "get",
            "ok": true,
            "query": q.query,
            "results": candidates_json(&candidates),
            "downloads": downloads,
        });
        println!("{v}");
    }
    Ok(())
}

async fn cmd_download(args: DownloadCmd) -> Result<()> {
    let json = is_json(&args.output);
    let dl = build_downloader(&args.download)?;
    let candidate = SearchCandidate {
        title: args.title.trim().to_string(),
        link: args.link,
    };
    if candidate.title.is_empty() {
        anyhow::bail!("empty title");
    }

    let result = match ensure_dir(&dl.config().dest_dir) {
        Ok(()) => download_one(&dl, &candidate, &args.ext, json).await,
        Err(e) => {
            if !json {
                eprintln!("{}", download_diagnostic(&e));
            }
            serde_json::json!({ "ok": false, "error": error_json(&e) })
        }
    };
    if json {
        let mut v = serde_json::json!({ "schema_version": 1, "kind": "download" });
        if let (Some(dst), Some(src)) = (v.as_object_mut(), result.as_object()) {
            for (k, val) in src {
                dst.insert(k.clone(), val.clone());
            }
        }
        println!("{v}");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Opt-in env file, loaded before argument parsing so `env = ...` flags see it.
    env_file::load_from_env();
    logging::init_logging();

    let cli = Cli::parse();

    match cli.command {
        Commands::Search(args) => cmd_search(args).await?,
        Commands::Get(args) => cmd_get(args).await?,
        Commands::Download(args) => cmd_download(args).await?,
        Commands::Version(args) => {
            let v = serde_json::json!({
                "schema_version": 1,
                "kind": "version",
                "ok": true,
                "name": "pdfhunt",
                "version": env!("CARGO_PKG_VERSION"),
            });
            match args.output.to_ascii_lowercase().as_str() {
                "text" => println!("pdfhunt {}", env!("CARGO_PKG_VERSION")),
                _ => println!("{}", v),
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_get_with_select() {
        let cli = Cli::try_parse_from([
            "pdfhunt", "get", "rust", "book", "--select", "2", "--dir", "out", "--dedup",
        ])
        .unwrap();
        match cli.command {
            Commands::Get(g) => {
                assert_eq!(g.search.query, vec!["rust", "book"]);
                assert_eq!(g.select, Some(2));
                assert_eq!(g.download.dir, PathBuf::from("out"));
                assert!(g.search.dedup);
                assert!(!g.all);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn select_and_all_conflict() {
        let r = Cli::try_parse_from(["pdfhunt", "get", "x", "--select", "1", "--all"]);
        assert!(r.is_err());
    }

    #[test]
    fn search_requires_a_query() {
        assert!(Cli::try_parse_from(["pdfhunt", "search"]).is_err());
    }

    #[test]
    fn blank_query_tokens_are_rejected() {
        let cli = Cli::try_parse_from(["pdfhunt", "search", " ", ""]).unwrap();
        let Commands::Search(s) = cli.command else {
            panic!("expected search");
        };
        assert!(build_query(&s.search).is_err());
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let cli = Cli::try_parse_from(["pdfhunt", "search", "x", "--provider", "bing"]).unwrap();
        let Commands::Search(s) = cli.command else {
            panic!("expected search");
        };
        let err = build_provider(&s.search).unwrap_err();
        assert!(err.to_string().contains("unknown provider"));
    }

    #[test]
    fn download_diagnostics_name_the_failure() {
        let e = Error::HttpStatus {
            status: 404,
            reason: "Not Found".to_string(),
        };
        assert_eq!(download_diagnostic(&e), "Download failed: 404 Not Found");
        let d = download_diagnostic(&Error::Transport("refused".into()));
        assert!(d.starts_with("Download error:"));
    }
}
