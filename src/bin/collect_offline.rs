//! Run a collection against search and detail pages saved on disk.
//!
//! ```text
//! collect_offline <dir> <term> <count> [--min P] [--max P] [--max-pages N]
//!                 [--max-attempts N] [--options FILE] [--raw-out FILE] [--json-logs]
//! ```
//!
//! `<dir>` holds `page-<n>.html` for each search page and
//! `detail-<item id>.html` for detail pages, the item id being the last path
//! segment of the product link. The result is printed as JSON.

use std::env;
use std::error::Error;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

use rs_product_harvest::search_page::search_url;
use rs_product_harvest::{
    split_page_bytes, Candidate, CollectRequest, Collector, DetailFetcher, FetchError, HardStops, JsonlRawStore,
    Options, PageFetcher, RawPayload, RunContext,
};

struct DirectoryPages {
    dir: PathBuf,
    base: Url,
}

#[async_trait]
impl PageFetcher for DirectoryPages {
    async fn fetch_page(&self, ctx: &RunContext, page: u32) -> Result<Vec<RawPayload>, FetchError> {
        let path = self.dir.join(format!("page-{page}.html"));
        let body = match tokio::fs::read(&path).await {
            Ok(body) => body,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no saved page; treating as empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(read_failure(&path, &e)),
        };

        let page_url = search_url(&self.base, ctx.term(), page);
        let split = split_page_bytes(&body, None, Some(page_url.as_str()))?;
        if let Some(error) = &split.embedded_error {
            tracing::warn!(page, error = %error, "embedded search data unusable; used product tiles");
        }
        Ok(split.payloads)
    }
}

struct DirectoryDetails {
    dir: PathBuf,
}

#[async_trait]
impl DetailFetcher for DirectoryDetails {
    async fn fetch_detail(&self, candidate: &Candidate) -> Result<RawPayload, FetchError> {
        let link = candidate
            .link()
            .ok_or_else(|| FetchError::Malformed("candidate has no link".to_string()))?;
        let item_id = Url::parse(link)
            .ok()
            .and_then(|u| u.path_segments().and_then(|mut s| s.next_back().map(str::to_string)))
            .filter(|id| !id.is_empty())
            .ok_or_else(|| FetchError::Malformed(format!("no item id in {link}")))?;

        let path = self.dir.join(format!("detail-{item_id}.html"));
        let body = tokio::fs::read(&path).await.map_err(|e| read_failure(&path, &e))?;
        let html = rs_product_harvest::encoding::decode_page(&body, None);
        Ok(RawPayload::html(html).with_page_url(link))
    }
}

fn read_failure(path: &Path, err: &std::io::Error) -> FetchError {
    FetchError::Crash {
        status: None,
        stderr: format!("{}: {err}", path.display()),
    }
}

struct Args {
    dir: PathBuf,
    term: String,
    count: usize,
    min: Option<Decimal>,
    max: Option<Decimal>,
    stops: HardStops,
    options: Option<PathBuf>,
    raw_out: Option<PathBuf>,
    json_logs: bool,
}

fn usage() -> String {
    "usage: collect_offline <dir> <term> <count> [--min P] [--max P] [--max-pages N] \
     [--max-attempts N] [--options FILE] [--raw-out FILE] [--json-logs]"
        .to_string()
}

fn parse_args() -> Result<Args, Box<dyn Error>> {
    let mut args = env::args().skip(1);
    let dir = PathBuf::from(args.next().ok_or_else(usage)?);
    let term = args.next().ok_or_else(usage)?;
    let count = args.next().ok_or_else(usage)?.parse()?;

    let mut parsed = Args {
        dir,
        term,
        count,
        min: None,
        max: None,
        stops: HardStops::default(),
        options: None,
        raw_out: None,
        json_logs: false,
    };

    while let Some(flag) = args.next() {
        if flag == "--json-logs" {
            parsed.json_logs = true;
            continue;
        }
        let value = args.next().ok_or_else(|| format!("{flag} needs a value"))?;
        match flag.as_str() {
            "--min" => parsed.min = Some(Decimal::from_str(&value)?),
            "--max" => parsed.max = Some(Decimal::from_str(&value)?),
            "--max-pages" => parsed.stops.max_pages = value.parse()?,
            "--max-attempts" => parsed.stops.max_attempts = value.parse()?,
            "--options" => parsed.options = Some(PathBuf::from(value)),
            "--raw-out" => parsed.raw_out = Some(PathBuf::from(value)),
            other => return Err(format!("unknown flag {other}\n{}", usage()).into()),
        }
    }

    Ok(parsed)
}

fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,rs_product_harvest=info".into());
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = parse_args()?;
    init_logging(args.json_logs);

    let options = match &args.options {
        Some(path) => Options::from_json(&tokio::fs::read_to_string(path).await?)?,
        None => Options::default(),
    };
    let base = Url::parse(&options.base_url)?;

    let mut collector = Collector::new(Arc::new(DirectoryPages {
        dir: args.dir.clone(),
        base,
    }))
    .with_detail_fetcher(Arc::new(DirectoryDetails { dir: args.dir }))
    .with_options(options);
    if let Some(path) = args.raw_out {
        collector = collector.with_raw_store(Arc::new(JsonlRawStore::new(path)));
    }

    let request = CollectRequest::new(args.term, args.count)
        .with_bounds(args.min, args.max)
        .with_hard_stops(args.stops);
    let result = collector.collect(request).await?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
