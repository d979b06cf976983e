//! `etb` - command line client for the Evidential Tool Bus.
//!
//! Thin wrapper over [`etb_client::EtbSession`]: each subcommand is one
//! session operation. Results print as text by default, or as JSON with
//! `--json` so other tools can consume them.

use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use etb_client::{AnswerSet, ClaimSet, EtbConfig, EtbSession, FileRef, QueryId};

#[derive(Parser, Debug)]
#[command(name = "etb")]
#[command(about = "Client for the Evidential Tool Bus", version)]
struct Args {
    /// ETB host (overrides ETB_HOST)
    #[arg(long, global = true)]
    host: Option<String>,

    /// ETB port (overrides ETB_PORT)
    #[arg(short, long, global = true)]
    port: Option<u16>,

    /// ETB name, for servers behind a routing proxy (overrides ETB_NAME)
    #[arg(short, long, global = true)]
    name: Option<String>,

    /// Timeout in seconds for ordinary calls (overrides ETB_TIMEOUT_SECS)
    #[arg(long, global = true)]
    call_timeout: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check that the server answers
    Ping,
    /// Upload a file
    Put {
        src: PathBuf,
        /// Remote name (defaults to SRC)
        dst: Option<String>,
    },
    /// Upload a directory recursively, skipping .git
    PutDir { src: PathBuf, dst: String },
    /// Download a file by its reference
    Get {
        fileref: String,
        dst: PathBuf,
        /// Treat FILEREF as a path in the server's working tree
        #[arg(long)]
        path: bool,
    },
    /// Submit a query and print its id
    Query {
        query: String,
        /// Wait for completion and print the answers
        #[arg(long)]
        wait: bool,
        /// Give up waiting after this many seconds
        #[arg(long)]
        timeout: Option<u64>,
        #[arg(long)]
        json: bool,
    },
    /// Print whether a query has finished
    Done { qid: String },
    /// Block until a query has finished
    Wait {
        qid: String,
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Print the answers of a query
    Answers {
        qid: String,
        #[arg(long)]
        json: bool,
    },
    /// Print the claims of a query
    Claims {
        #[arg(required_unless_present = "everything")]
        qid: Option<String>,
        /// All claims produced for the query, not just matching ones
        #[arg(long)]
        all: bool,
        /// Every claim the server holds, regardless of query
        #[arg(long, conflicts_with_all = ["qid", "all"])]
        everything: bool,
        #[arg(long)]
        json: bool,
    },
}

/// Expand a leading `~/` the way a shell would.
fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

/// Remote name for `put` when none is given: the source path itself, as
/// long as it stays inside the server's working tree.
fn default_remote_name(src: &Path) -> Result<String> {
    let escapes = src
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        bail!(
            "{} is absolute or contains '..'; give an explicit destination",
            src.display()
        );
    }
    Ok(src.to_string_lossy().into_owned())
}

fn resolve_config(args: &Args) -> Result<EtbConfig> {
    let mut config = EtbConfig::from_env()?;
    if let Some(host) = &args.host {
        config.host = host.clone();
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(name) = &args.name {
        config.name = Some(name.clone());
    }
    if let Some(secs) = args.call_timeout {
        config.call_timeout = Duration::from_secs(secs);
    }
    Ok(config)
}

fn print_answers(answers: &AnswerSet, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(answers)?);
        return Ok(());
    }
    if answers.is_empty() {
        println!("no answers");
    }
    for (i, answer) in answers.iter().enumerate() {
        println!("answer {}:", i + 1);
        for binding in answer {
            println!("  {}: {}", binding.name(), binding.value_str());
        }
    }
    Ok(())
}

fn print_claims(claims: &ClaimSet, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(claims)?);
        return Ok(());
    }
    for claim in claims {
        println!("  {}", claim);
    }
    Ok(())
}

fn run(args: Args) -> Result<()> {
    let config = resolve_config(&args)?;
    let session = EtbSession::connect(&config)
        .with_context(|| format!("Cannot connect to the ETB at {}:{}", config.host, config.port))?;

    match args.command {
        Command::Ping => println!("ETB at {}:{} is alive", config.host, config.port),
        Command::Put { src, dst } => {
            let src = expand_home(&src);
            let dst = match dst {
                Some(dst) => dst,
                None => default_remote_name(&src)?,
            };
            let fileref = session.upload_file(&src, &dst)?;
            println!("{}", fileref);
        }
        Command::PutDir { src, dst } => {
            let refs = session.upload_dir(expand_home(&src), &dst)?;
            for (path, fileref) in &refs {
                println!("{}: {}", path.display(), fileref);
            }
        }
        Command::Get { fileref, dst, path } => {
            let dst = expand_home(&dst);
            if path {
                session.download_path(&fileref, dst)?;
            } else {
                session.download_file(&FileRef::new(fileref), dst)?;
            }
        }
        Command::Query {
            query,
            wait,
            timeout,
            json,
        } => {
            if wait {
                let (qid, answers) =
                    session.run_query(&query, timeout.map(Duration::from_secs))?;
                tracing::info!("Query {} complete", qid);
                print_answers(&answers, json)?;
            } else {
                println!("{}", session.submit_query(&query)?);
            }
        }
        Command::Done { qid } => {
            println!("{}", session.is_query_done(&QueryId::new(qid))?);
        }
        Command::Wait { qid, timeout } => {
            session.wait_query(&QueryId::new(qid), timeout.map(Duration::from_secs))?;
        }
        Command::Answers { qid, json } => {
            print_answers(&session.get_answers(&QueryId::new(qid))?, json)?;
        }
        Command::Claims {
            qid,
            all,
            everything,
            json,
        } => {
            let claims = match qid.map(QueryId::new) {
                _ if everything => session.all_claims()?,
                Some(qid) if all => session.get_all_claims(&qid)?,
                Some(qid) => session.get_claims(&qid)?,
                None => bail!("a query id is required unless --everything is given"),
            };
            print_claims(&claims, json)?;
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr so stdout stays clean for results
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "etb_client=info,etb=info".into()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    tracing::debug!("etb v{}", env!("CARGO_PKG_VERSION"));
    run(args)
}
