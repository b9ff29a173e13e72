//! CLI binary for base64ai-client.
//!
//! A thin shim over the library crate that maps CLI flags to a
//! `ClientConfig`, assembles input items, and prints per-item results.

use anyhow::{Context, Result};
use base64ai_client::{
    execute_stream, list_flows, search_flows, BinaryPayload, ClientConfig, Credentials,
    ExecutionPolicy, HttpTransport, InputItem, SchemaVersion,
};
use clap::Parser;
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use std::io::{self, Read as _, Write as _};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Scan a document by URL, simplified output
  base64ai --resource document --operation recognizeDocument \
           --param documentInputSource=url \
           --param documentUrl=https://example.com/invoice.pdf \
           --param simplify=true

  # Scan a local file (attached as a binary property)
  base64ai --resource document --operation recognizeDocument \
           --param documentInputSource=binary \
           --param documentBinaryPropertyName=data \
           --file data=./invoice.pdf

  # Run a whole batch from a JSON items file, continuing past failures
  base64ai --continue-on-fail items.json

  # Retrieve flow results, newest first, processed only
  base64ai --resource result --operation getFlowResults \
           --param resultFlow=2fa8fca0-b41d-3280-8b6e-0c47ddd22673 \
           --param 'resultFilters={"filter":"processed","limit":50}' \
           --param 'resultSorting={"orderBy":"-updatedAt"}'

  # List the flows this account can upload to
  base64ai --list-flows
  base64ai --list-flows --flow-filter invoice

  # Check that the credential pair works
  base64ai --verify

RESOURCES AND OPERATIONS:
  Resource    Operation                 Endpoint
  ─────────   ───────────────────────   ─────────────────────
  document    recognizeDocument         POST /scan
  document    recognizeDocumentAsync    POST /scan/async
  document    getAsyncScanResult        GET  /scan/async/{uuid}
  signature   recognizeSignature        POST /signature
  signature   verifySignature           POST /signature
  face        recognizeFace             POST /face
  face        verifyFace                POST /face
  flow        listFlows                 GET  /flow
  result      getFlowResults            GET  /result
  result      getResultByUuid           GET  /result/{uuid}

  With --schema-version v1 the legacy aliases scan:scanDocument,
  async:createAsyncScan, and async:getAsyncScanResult are accepted too.

ITEMS FILE FORMAT:
  A JSON array of items; each item has "params" (flat map of the parameters
  above) and optionally "binary" (property name → { "data": base64,
  "mime_type": …, "file_name": … }). Pass "-" to read from stdin.

ENVIRONMENT VARIABLES:
  BASE64AI_EMAIL     Account email (the --email flag overrides it)
  BASE64AI_API_KEY   API key (the --api-key flag overrides it)

SETUP:
  1. Set credentials:  export BASE64AI_EMAIL=you@example.com
                       export BASE64AI_API_KEY=...
  2. Scan:             base64ai --resource document --operation recognizeDocument \
                                --param documentInputSource=url --param documentUrl=...
"#;

/// Dispatch document, signature, face, flow, and result operations against
/// the Base64.ai API.
#[derive(Parser, Debug)]
#[command(
    name = "base64ai",
    version,
    about = "Batch dispatcher for the Base64.ai document understanding API",
    long_about = "Send document scans, signature and face recognition, flow listing, and \
result-retrieval requests to the Base64.ai API. Operations are selected per item by a \
resource/operation pair; items run strictly sequentially and each yields either the \
provider response or an {\"error\": …} envelope.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// JSON items file ("-" for stdin). Omit when building one item via --resource.
    input: Option<String>,

    /// Account email for authentication.
    #[arg(long, env = "BASE64AI_EMAIL")]
    email: Option<String>,

    /// API key for authentication.
    #[arg(long, env = "BASE64AI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Parameter schema generation: v1 (legacy) or v2.
    #[arg(long, env = "BASE64AI_SCHEMA_VERSION", value_enum, default_value = "v2")]
    schema_version: SchemaVersionArg,

    /// Override the API base URL (defaults to the schema version's endpoint).
    #[arg(long, env = "BASE64AI_BASE_URL")]
    base_url: Option<String>,

    /// Resource of a single inline item (e.g. document, result).
    #[arg(long, requires = "operation", conflicts_with = "input")]
    resource: Option<String>,

    /// Operation of a single inline item (e.g. recognizeDocument).
    #[arg(long, requires = "resource")]
    operation: Option<String>,

    /// Inline item parameter as key=value; value parsed as JSON when possible.
    /// Repeatable.
    #[arg(long = "param", value_name = "KEY=VALUE")]
    params: Vec<String>,

    /// Attach a file as a binary property: property=path. Repeatable.
    #[arg(long = "file", value_name = "PROPERTY=PATH")]
    files: Vec<String>,

    /// Collect failing items as {"error": …} results instead of aborting.
    #[arg(long, env = "BASE64AI_CONTINUE_ON_FAIL")]
    continue_on_fail: bool,

    /// Per-request timeout in seconds.
    #[arg(long, env = "BASE64AI_TIMEOUT", default_value_t = 120)]
    timeout: u64,

    /// List flows visible to the credential instead of dispatching items.
    #[arg(long, conflicts_with_all = ["input", "resource"])]
    list_flows: bool,

    /// Case-insensitive name/ID filter for --list-flows.
    #[arg(long, requires = "list_flows")]
    flow_filter: Option<String>,

    /// Verify the credential pair and print the account record.
    #[arg(long, conflicts_with_all = ["input", "resource", "list_flows"])]
    verify: bool,

    /// Compact JSON output (one result per line) instead of a pretty array.
    #[arg(long)]
    compact: bool,

    /// Disable the progress bar.
    #[arg(long, env = "BASE64AI_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "BASE64AI_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and results.
    #[arg(short, long, env = "BASE64AI_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum SchemaVersionArg {
    V1,
    V2,
}

impl From<SchemaVersionArg> for SchemaVersion {
    fn from(v: SchemaVersionArg) -> Self {
        match v {
            SchemaVersionArg::V1 => SchemaVersion::V1,
            SchemaVersionArg::V2 => SchemaVersion::V2,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Results go to stdout; logs and the progress bar go to stderr, so
    // piped output stays clean JSON.
    let show_progress = !cli.quiet && !cli.no_progress;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Config and transport ─────────────────────────────────────────────
    let credentials = match (cli.email.clone(), cli.api_key.clone()) {
        (Some(email), Some(api_key)) => Credentials::new(email, api_key),
        _ => Credentials::from_env().context(
            "Credentials missing: pass --email/--api-key or set BASE64AI_EMAIL and BASE64AI_API_KEY",
        )?,
    };

    let mut builder = ClientConfig::builder()
        .schema_version(cli.schema_version.into())
        .policy(if cli.continue_on_fail {
            ExecutionPolicy::ContinueOnFailure
        } else {
            ExecutionPolicy::Abort
        })
        .request_timeout_secs(cli.timeout);
    if let Some(ref url) = cli.base_url {
        builder = builder.base_url(url.clone());
    }
    let config = builder.build().context("Invalid configuration")?;

    let transport = HttpTransport::new(credentials).context("Failed to build HTTP client")?;

    // ── Credential verification mode ─────────────────────────────────────
    if cli.verify {
        let account = transport
            .verify_credentials(&config)
            .await
            .context("Credential verification failed")?;
        println!("{}", serde_json::to_string_pretty(&account)?);
        if !cli.quiet {
            eprintln!("{} credentials accepted", green("✔"));
        }
        return Ok(());
    }

    // ── Flow-listing mode ────────────────────────────────────────────────
    if cli.list_flows {
        let flows = match cli.flow_filter {
            Some(ref filter) => search_flows(&transport, &config, filter).await,
            None => list_flows(&transport, &config).await,
        }
        .context("Failed to list flows")?;

        if cli.compact {
            for flow in &flows {
                println!("{}", serde_json::to_string(flow)?);
            }
        } else {
            for flow in &flows {
                println!("{}  {}", flow.flow_id, dim(&flow.name));
            }
        }
        if !cli.quiet {
            eprintln!("{} {} flows", green("✔"), bold(&flows.len().to_string()));
        }
        return Ok(());
    }

    // ── Assemble items ───────────────────────────────────────────────────
    let items = if let Some(ref input) = cli.input {
        load_items(input).await?
    } else if cli.resource.is_some() {
        vec![build_inline_item(&cli).await?]
    } else {
        anyhow::bail!("Nothing to do: pass an items file, --resource/--operation, --list-flows, or --verify");
    };

    // ── Run the batch ────────────────────────────────────────────────────
    let total = items.len();
    let start = Instant::now();
    let bar = if show_progress {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  \
                 [{bar:42.green/238}] {pos:>3}/{len} items  \
                 ⏱ {elapsed_precise}  ETA {eta_precise}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  ")
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.set_prefix("Dispatching");
        bar.enable_steady_tick(Duration::from_millis(80));
        Some(bar)
    } else {
        None
    };

    let mut stream = execute_stream(transport, config.clone(), items);
    let mut outputs: Vec<Value> = Vec::with_capacity(total);
    let mut failed = 0usize;

    while let Some((index, result)) = stream.next().await {
        let ok = result.is_success();
        if let Some(ref bar) = bar {
            let tick = if ok { green("✓") } else { red("✗") };
            bar.println(format!("  {} Item {:>3}/{:<3}", tick, index + 1, total));
            bar.inc(1);
        }
        if !ok {
            failed += 1;
            if config.policy == ExecutionPolicy::Abort {
                if let Some(ref bar) = bar {
                    bar.finish_and_clear();
                }
                anyhow::bail!(
                    "Item {} failed: {} (use --continue-on-fail to collect errors instead)",
                    index,
                    result.to_json()["error"].as_str().unwrap_or("unknown error")
                );
            }
        }
        outputs.push(result.to_json());
    }

    if let Some(bar) = bar {
        bar.finish_and_clear();
    }

    // ── Print results ────────────────────────────────────────────────────
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if cli.compact {
        for output in &outputs {
            writeln!(handle, "{}", serde_json::to_string(output)?)?;
        }
    } else {
        writeln!(handle, "{}", serde_json::to_string_pretty(&outputs)?)?;
    }

    if !cli.quiet {
        let elapsed_ms = start.elapsed().as_millis();
        eprintln!(
            "{}  {}/{} items  {}ms",
            if failed == 0 { green("✔") } else { cyan("⚠") },
            bold(&(total - failed).to_string()),
            total,
            elapsed_ms,
        );
        if failed > 0 {
            eprintln!("  {} items failed", red(&failed.to_string()));
        }
    }

    Ok(())
}

/// Read a JSON items file (or stdin for "-").
async fn load_items(input: &str) -> Result<Vec<InputItem>> {
    let raw = if input == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read items from stdin")?;
        buf
    } else {
        tokio::fs::read_to_string(input)
            .await
            .with_context(|| format!("Failed to read items file {input:?}"))?
    };
    let items: Vec<InputItem> =
        serde_json::from_str(&raw).context("Items file must be a JSON array of items")?;
    Ok(items)
}

/// Build a single item from --resource/--operation/--param/--file flags.
async fn build_inline_item(cli: &Cli) -> Result<InputItem> {
    let mut params = serde_json::Map::new();
    params.insert(
        "resource".to_string(),
        Value::String(cli.resource.clone().unwrap_or_default()),
    );
    params.insert(
        "operation".to_string(),
        Value::String(cli.operation.clone().unwrap_or_default()),
    );
    for pair in &cli.params {
        let (key, value) = pair
            .split_once('=')
            .with_context(|| format!("--param must be KEY=VALUE, got '{pair}'"))?;
        // JSON values pass through typed; anything unparseable is a string.
        let value = serde_json::from_str(value)
            .unwrap_or_else(|_| Value::String(value.to_string()));
        params.insert(key.to_string(), value);
    }

    let mut item = InputItem::new(params);
    for pair in &cli.files {
        let (property, path) = pair
            .split_once('=')
            .with_context(|| format!("--file must be PROPERTY=PATH, got '{pair}'"))?;
        let path = PathBuf::from(path);
        let data = tokio::fs::read(&path)
            .await
            .with_context(|| format!("Failed to read attachment {path:?}"))?;
        let mut payload = BinaryPayload::new(data, guess_mime_type(&path).map(str::to_string));
        payload.file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned());
        item = item.with_binary(property, payload);
    }
    Ok(item)
}

/// Minimal extension-based MIME guess for the formats the API accepts.
fn guess_mime_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    Some(match ext.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "tif" | "tiff" => "image/tiff",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "heic" => "image/heic",
        _ => return None,
    })
}
