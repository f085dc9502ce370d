//! diffweave - render review diffs and commit graphs as addressable rows
//!
//! Usage: diffweave <rows|graph|relocate> [options]
//!
//! Output is JSON on stdout (or SVG for `graph --svg`); logs go to stderr.

use std::collections::{BTreeMap, HashSet};
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use diffweave::config::load_config;
use diffweave::graph::{render_graph, svg, GraphRow};
use diffweave::line_map::relocate_threads;
use diffweave::review::{Comparison, Review, Thread};
use diffweave::view::{render_diff, CommitMessage, DiffSnapshot};
use diffweave::{vcs, ParsedDiff, Selection};

#[derive(Parser)]
#[command(name = "diffweave", version)]
#[command(about = "Render review diffs and commit graphs as addressable rows")]
struct Cli {
    /// Context lines kept around changes (overrides config)
    #[arg(long, global = true)]
    context: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decompose a diff and weave threads into it
    Rows(RowsArgs),
    /// Render graph rows to drawing primitives
    Graph {
        /// JSON array of graph rows (`-` for stdin)
        #[arg(long)]
        rows: PathBuf,
        /// Emit an SVG document instead of JSON
        #[arg(long)]
        svg: bool,
    },
    /// Map thread positions through a diff
    Relocate {
        /// Diff from the threads' commit to the viewed commit (`-` for stdin)
        #[arg(long)]
        diff: PathBuf,
        /// JSON array of threads
        #[arg(long)]
        threads: PathBuf,
    },
}

#[derive(Args)]
struct RowsArgs {
    /// Unified diff file (`-` for stdin)
    #[arg(long, conflicts_with = "repo")]
    diff: Option<PathBuf>,
    /// Repository to diff instead of reading a file
    #[arg(long)]
    repo: Option<PathBuf>,
    /// Defaults to the review's base when `--review` is given
    #[arg(long)]
    from: Option<String>,
    /// Defaults to the working copy
    #[arg(long)]
    to: Option<String>,
    /// JSON array of threads
    #[arg(long, conflicts_with = "review")]
    threads: Option<PathBuf>,
    /// Review JSON supplying threads and revision history
    #[arg(long)]
    review: Option<PathBuf>,
    /// Only show threads created at or before this revision
    #[arg(long)]
    revision: Option<u32>,
    /// Collapsed run id to show expanded (repeatable)
    #[arg(long = "expand")]
    expand: Vec<String>,
    /// Comment selection as `file:start-end`
    #[arg(long)]
    select: Option<Selection>,
    /// Expand runs hiding thread anchors or the selection
    #[arg(long)]
    auto_expand: bool,
    /// Change id for the commit message header
    #[arg(long)]
    change_id: Option<String>,
    /// Commit message file (read from the repo when omitted)
    #[arg(long, requires = "change_id")]
    message: Option<PathBuf>,
    /// Earlier commit message to diff against
    #[arg(long, requires = "change_id")]
    previous_message: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("diffweave=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = load_config()?;
    if let Some(context) = cli.context {
        config.context_radius = context;
    }

    match cli.command {
        Commands::Rows(args) => rows(args, config.context_radius),
        Commands::Graph { rows, svg: as_svg } => {
            let rows: Vec<GraphRow> = read_json(&rows)?;
            let rendered = render_graph(&rows, &config.graph);
            info!(rows = rows.len(), "rendered graph");
            if as_svg {
                print!("{}", svg::to_svg(&rendered, &config.graph));
                Ok(())
            } else {
                print_json(&rendered)
            }
        }
        Commands::Relocate { diff, threads } => {
            let diff = ParsedDiff::parse(&read_input(&diff)?);
            let threads: Vec<Thread> = read_json(&threads)?;
            let positions: BTreeMap<_, _> = relocate_threads(&threads, &diff).into_iter().collect();
            print_json(&positions)
        }
    }
}

fn rows(args: RowsArgs, context_radius: usize) -> Result<()> {
    let review = match &args.review {
        Some(path) => {
            let review: Review = read_json(path)?;
            let review = match review.working_commit_id.clone() {
                Some(working) => review.with_pending_revision(&working),
                None => review,
            };
            info!(
                change_id = %review.change_id,
                open_threads = review.open_thread_count(),
                "loaded review"
            );
            Some(review)
        }
        None => None,
    };

    let diff_text = match (&args.diff, &args.repo) {
        (Some(path), _) => read_input(path)?,
        (None, Some(repo)) => match (&args.from, &review) {
            (Some(from), _) => vcs::full_diff(repo, from, args.to.as_deref())?,
            (None, Some(review)) => {
                let comparison =
                    Comparison::latest(review).context("Review has no revisions to compare")?;
                let (from, to) = comparison
                    .commits(review)
                    .with_context(|| format!("Cannot resolve {comparison}"))?;
                info!(%comparison, "diffing review revisions");
                vcs::full_diff(repo, from, Some(to))?
            }
            (None, None) => bail!("--repo needs --from or --review"),
        },
        (None, None) => bail!("either --diff or --repo is required"),
    };

    let threads: Vec<Thread> = match (&args.threads, review) {
        (Some(path), _) => read_json(path)?,
        (None, Some(review)) => review.threads,
        (None, None) => Vec::new(),
    };

    let commit_message = match &args.change_id {
        Some(change_id) => {
            let message = match (&args.message, &args.repo) {
                (Some(path), _) => read_input(path)?,
                (None, Some(repo)) => {
                    vcs::commit_message(repo, args.to.as_deref().unwrap_or("@"))?
                }
                (None, None) => bail!("--change-id needs --message or --repo"),
            };
            let previous = args
                .previous_message
                .as_deref()
                .map(read_input)
                .transpose()?;
            Some(CommitMessage {
                change_id: change_id.clone(),
                message,
                previous,
            })
        }
        None => None,
    };

    let snapshot = DiffSnapshot {
        diff_text,
        threads,
        expanded: args.expand.into_iter().collect::<HashSet<_>>(),
        selection: args.select,
        commit_message,
        context_radius,
        auto_expand: args.auto_expand,
        revision: args.revision,
    };
    let rendered = render_diff(&snapshot);
    info!(
        rows = rendered.rows.len(),
        threads_shown = rendered.index.thread_rows.len(),
        "rendered diff"
    );
    print_json(&rendered)
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = read_input(path)?;
    serde_json::from_str(&contents).with_context(|| format!("Failed to parse {}", path.display()))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{json}");
    Ok(())
}
