//! `docvault` CLI — command-line client for the `docvault` server.
//!
//! A standalone HTTP client that communicates with the `docvault` server.
//! No internal crate dependencies — talks exclusively via the REST API.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;

// ── ANSI color helpers ───────────────────────────────────────────────

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";

// ── CLI structure ────────────────────────────────────────────────────

/// docvault — a wallet-gated document vault demo.
#[derive(Parser)]
#[command(
    name = "docvault",
    version,
    about = "docvault CLI — connect a wallet, upload, share, and verify documents",
    long_about = None,
    after_help = format!(
        "{DIM}Environment variables:{RESET}\n  \
         DOCVAULT_ADDR     Server address (default: http://127.0.0.1:8200)\n  \
         DOCVAULT_WALLET   Wallet address sent as X-Wallet-Address\n\n\
         {DIM}Examples:{RESET}\n  \
         docvault connect 0x1234abcd\n  \
         docvault upload ./report.pdf --policy nft-gated\n  \
         docvault share 7f9c0b1a 0xfedc9876\n  \
         docvault verify 7f9c0b1a"
    ),
)]
struct Cli {
    /// docvault server address.
    #[arg(long, env = "DOCVAULT_ADDR", default_value = "http://127.0.0.1:8200")]
    addr: String,

    /// Wallet address to act as.
    #[arg(long, env = "DOCVAULT_WALLET")]
    wallet: Option<String>,

    /// Disable colored output.
    #[arg(long, default_value = "false")]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Server health and registry counts.
    Status,
    /// Connect a wallet session.
    Connect {
        /// Wallet address to connect.
        address: String,
    },
    /// Drop the current wallet session.
    Disconnect,
    /// Show the current session.
    Session,
    /// Upload a file through the store → encrypt → deploy pipeline.
    Upload {
        /// File to upload.
        file: PathBuf,
        /// Access policy: public, private, nft-gated, payment-gated.
        #[arg(long, default_value = "private")]
        policy: String,
        /// Register under this name instead of the file name.
        #[arg(long)]
        name: Option<String>,
    },
    /// List registered documents.
    List,
    /// Share a document with another wallet address.
    Share {
        /// Document id.
        id: String,
        /// Recipient wallet address.
        recipient: String,
    },
    /// Check whether your wallet may access a document.
    Verify {
        /// Document id.
        id: String,
    },
    /// Record a view on a document.
    View {
        /// Document id.
        id: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let color = !cli.no_color;
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if color {
                eprintln!("{RED}error:{RESET} {err:#}");
            } else {
                eprintln!("error: {err:#}");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let client = ApiClient::new(cli.addr, cli.wallet)?;

    match cli.command {
        Commands::Status => status(&client).await,
        Commands::Connect { address } => connect(&client, &address).await,
        Commands::Disconnect => disconnect(&client).await,
        Commands::Session => session(&client).await,
        Commands::Upload { file, policy, name } => upload(&client, &file, &policy, name).await,
        Commands::List => list(&client).await,
        Commands::Share { id, recipient } => share(&client, &id, &recipient).await,
        Commands::Verify { id } => verify(&client, &id).await,
        Commands::View { id } => view(&client, &id).await,
    }
}

// ── API client ───────────────────────────────────────────────────────

struct ApiClient {
    http: reqwest::Client,
    addr: String,
    wallet: Option<String>,
}

impl ApiClient {
    fn new(addr: String, wallet: Option<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            addr: addr.trim_end_matches('/').to_owned(),
            wallet,
        })
    }

    fn wallet(&self) -> Result<&str> {
        self.wallet
            .as_deref()
            .context("no wallet address set (use --wallet or DOCVAULT_WALLET)")
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.addr)
    }

    async fn get(&self, path: &str) -> Result<Value> {
        let mut req = self.http.get(self.url(path));
        if let Some(wallet) = &self.wallet {
            req = req.header("X-Wallet-Address", wallet);
        }
        Self::handle(req.send().await).await
    }

    async fn post(&self, path: &str, body: Option<Value>) -> Result<Value> {
        let mut req = self.http.post(self.url(path));
        if let Some(wallet) = &self.wallet {
            req = req.header("X-Wallet-Address", wallet);
        }
        if let Some(body) = body {
            req = req.json(&body);
        }
        Self::handle(req.send().await).await
    }

    async fn post_bytes(&self, path: &str, bytes: Vec<u8>) -> Result<Value> {
        let wallet = self.wallet()?.to_owned();
        let req = self
            .http
            .post(self.url(path))
            .header("X-Wallet-Address", wallet)
            .body(bytes);
        Self::handle(req.send().await).await
    }

    /// Surface API errors as their `message` field.
    async fn handle(response: reqwest::Result<reqwest::Response>) -> Result<Value> {
        let response = response.context("request failed (is the server running?)")?;
        let status = response.status();
        if status == reqwest::StatusCode::NO_CONTENT {
            return Ok(Value::Null);
        }
        let body: Value = response
            .json()
            .await
            .with_context(|| format!("invalid response body (HTTP {status})"))?;
        if status.is_success() {
            return Ok(body);
        }
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown error");
        bail!("{message} (HTTP {status})")
    }
}

// ── Commands ─────────────────────────────────────────────────────────

async fn status(client: &ApiClient) -> Result<()> {
    let health = client.get("/v1/sys/health").await?;
    println!("{BOLD}docvault server{RESET}");
    println!(
        "  status:     {GREEN}{}{RESET}",
        health.get("status").and_then(Value::as_str).unwrap_or("?")
    );
    println!(
        "  documents:  {}",
        health.get("documents").and_then(Value::as_u64).unwrap_or(0)
    );
    println!(
        "  sessions:   {}",
        health.get("sessions").and_then(Value::as_u64).unwrap_or(0)
    );
    Ok(())
}

async fn connect(client: &ApiClient, address: &str) -> Result<()> {
    let session = client
        .post(
            "/v1/session/connect",
            Some(serde_json::json!({ "address": address })),
        )
        .await?;
    let addr = session.get("address").and_then(Value::as_str).unwrap_or(address);
    println!("{GREEN}connected{RESET} {BOLD}{addr}{RESET}");
    println!("{DIM}pass --wallet {addr} (or export DOCVAULT_WALLET={addr}) on later calls{RESET}");
    Ok(())
}

async fn disconnect(client: &ApiClient) -> Result<()> {
    client.wallet()?;
    client.post("/v1/session/disconnect", None).await?;
    println!("{YELLOW}disconnected{RESET}");
    Ok(())
}

async fn session(client: &ApiClient) -> Result<()> {
    client.wallet()?;
    let session = client.get("/v1/session").await?;
    println!(
        "{BOLD}{}{RESET}  {DIM}({}){RESET}",
        session.get("address").and_then(Value::as_str).unwrap_or("?"),
        session.get("state").and_then(Value::as_str).unwrap_or("?"),
    );
    Ok(())
}

async fn upload(
    client: &ApiClient,
    file: &Path,
    policy: &str,
    name: Option<String>,
) -> Result<()> {
    client.wallet()?;
    let bytes =
        std::fs::read(file).with_context(|| format!("cannot read {}", file.display()))?;
    let name = match name {
        Some(name) => name,
        None => file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .context("file has no name; pass --name")?,
    };

    println!(
        "{DIM}uploading {name} ({}) — store → encrypt → deploy…{RESET}",
        format_size(bytes.len() as u64)
    );

    let path = format!(
        "/v1/documents?name={}&policy={}",
        urlencoding::encode(&name),
        urlencoding::encode(policy)
    );
    let doc = client.post_bytes(&path, bytes).await?;

    println!("{GREEN}upload complete{RESET}");
    print_document(&doc);
    Ok(())
}

async fn list(client: &ApiClient) -> Result<()> {
    client.wallet()?;
    let response = client.get("/v1/documents").await?;
    let docs = response
        .get("documents")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    if docs.is_empty() {
        println!("{DIM}no documents registered{RESET}");
        return Ok(());
    }

    println!("{BOLD}{} document(s){RESET}", docs.len());
    for doc in &docs {
        print_document(doc);
    }
    Ok(())
}

async fn share(client: &ApiClient, id: &str, recipient: &str) -> Result<()> {
    client.wallet()?;
    let receipt = client
        .post(
            &format!("/v1/documents/{id}/share"),
            Some(serde_json::json!({ "recipient": recipient })),
        )
        .await?;
    println!(
        "{GREEN}shared{RESET} with {BOLD}{recipient}{RESET}  {DIM}shares: {}  tx: {}{RESET}",
        receipt.get("share_count").and_then(Value::as_u64).unwrap_or(0),
        receipt.get("transaction_id").and_then(Value::as_str).unwrap_or("?"),
    );
    Ok(())
}

async fn verify(client: &ApiClient, id: &str) -> Result<()> {
    client.wallet()?;
    let decision = client
        .post(&format!("/v1/documents/{id}/verify"), None)
        .await?;
    if decision.get("granted").and_then(Value::as_bool) == Some(true) {
        println!("{GREEN}access granted{RESET}");
    } else {
        println!("{RED}access denied{RESET}");
    }
    Ok(())
}

async fn view(client: &ApiClient, id: &str) -> Result<()> {
    client.wallet()?;
    let response = client.post(&format!("/v1/documents/{id}/view"), None).await?;
    println!(
        "views: {}",
        response.get("views").and_then(Value::as_u64).unwrap_or(0)
    );
    Ok(())
}

// ── Output helpers ───────────────────────────────────────────────────

fn print_document(doc: &Value) {
    let field = |key: &str| doc.get(key).and_then(Value::as_str).unwrap_or("?");
    let size = doc.get("size").and_then(Value::as_u64).unwrap_or(0);
    let shares = doc
        .get("recipients")
        .and_then(Value::as_array)
        .map_or(0, Vec::len);
    let views = doc.get("views").and_then(Value::as_u64).unwrap_or(0);

    println!(
        "  {CYAN}{}{RESET}  {BOLD}{}{RESET}  [{}]",
        field("id"),
        field("name"),
        field("policy"),
    );
    println!(
        "    {DIM}{}  uploaded {}  shares {shares}  views {views}{RESET}",
        format_size(size),
        field("uploaded_at"),
    );
    println!(
        "    {DIM}storage {}  contract {}{RESET}",
        field("storage_ref"),
        field("contract_address"),
    );
}

fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{size:.2} {}", UNITS[unit])
    }
}
