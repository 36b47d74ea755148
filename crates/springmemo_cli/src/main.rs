//! `springmemo` command line client.
//!
//! # Responsibility
//! - Drive the memo desk against the local store without a window host.
//! - Route every write through a note session so edits follow the same
//!   save path as the desktop host.

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use log::{debug, warn};
use springmemo_core::codec;
use springmemo_core::{
    init_logging, load_config, CloseOutcome, DeskError, LocalMemoService, Memo, MemoDesk, MemoId,
    MemoKind, MemoService, MemoServiceError, NoteHost, SaveStatus, SessionHandle,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "springmemo", version, about = "Sticky memos with autosave")]
struct Cli {
    /// TOML config file; environment overrides still apply.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Memo database path, overriding the config.
    #[arg(long)]
    db: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List all memos, most recently updated first.
    List,
    /// Create a memo.
    New {
        /// `normal`, `todo`, `schedule`, or the code 1, 2, 3.
        #[arg(long, default_value = "normal", value_parser = parse_kind)]
        kind: MemoKind,
        title: String,
    },
    /// Print one memo's body.
    Show { id: MemoId },
    /// Replace a memo's body. Lines are separated by `\n`.
    Edit { id: MemoId, text: String },
    Rename { id: MemoId, title: String },
    /// Show or hide a memo's window.
    Toggle { id: MemoId },
    Delete { id: MemoId },
}

fn parse_kind(value: &str) -> Result<MemoKind, String> {
    MemoKind::parse(value).ok_or_else(|| format!("unknown memo kind `{value}`"))
}

/// Host that reports session outcomes on the terminal.
struct ConsoleHost;

impl NoteHost for ConsoleHost {
    fn status_changed(&self, memo_id: MemoId, status: SaveStatus) {
        debug!("event=status_changed module=cli memo_id={memo_id} status={status:?}");
    }

    fn save_failed(&self, memo_id: MemoId, error: &MemoServiceError) {
        eprintln!("save failed for {memo_id}: {error}");
    }

    fn visibility_changed(&self, memo_id: MemoId, is_open: bool) {
        println!("{memo_id} is_open={is_open}");
    }

    fn close_completed(&self, memo_id: MemoId, outcome: CloseOutcome) {
        if outcome == CloseOutcome::Unsaved {
            warn!("event=session_close module=cli status=unsaved memo_id={memo_id}");
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_deref())?;
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    if let Some(log_dir) = &config.log_dir {
        let log_dir = std::env::current_dir()?.join(log_dir);
        init_logging(&config.log_level, &log_dir)
            .map_err(|err| anyhow!("logging init failed: {err}"))?;
    }

    let service = Arc::new(
        LocalMemoService::open(&config.db_path)
            .with_context(|| format!("opening {}", config.db_path.display()))?,
    );
    let mut desk = MemoDesk::new(service.clone(), Arc::new(ConsoleHost), config.autosave);

    match cli.command {
        Command::List => {
            for memo in desk.list().await? {
                println!(
                    "{}\t{}\t{}\t{}",
                    memo.id,
                    memo.kind.as_str(),
                    if memo.is_open { "open" } else { "hidden" },
                    memo.title
                );
            }
        }
        Command::New { kind, title } => {
            let _dialog = desk
                .begin_new_memo()
                .ok_or(DeskError::DialogBusy)?;
            let handle = desk.create_memo(kind, &title).await?;
            println!("created memo_id={}", handle.memo_id());
        }
        Command::Show { id } => {
            let memo = fetch(service.as_ref(), id).await?;
            println!("# {}", memo.title);
            println!("{}", codec::decode(&memo.source));
        }
        Command::Edit { id, text } => {
            let handle = open(&mut desk, service.as_ref(), id).await?;
            handle.edit_text(text.replace("\\n", "\n"))?;
        }
        Command::Rename { id, title } => {
            let handle = open(&mut desk, service.as_ref(), id).await?;
            handle.rename(title)?;
        }
        Command::Toggle { id } => {
            let handle = open(&mut desk, service.as_ref(), id).await?;
            handle.toggle_open()?;
        }
        Command::Delete { id } => {
            desk.delete_memo(id).await?;
            println!("deleted memo_id={id}");
        }
    }

    for (id, outcome) in desk.quit().await {
        if outcome == CloseOutcome::Unsaved {
            bail!("changes to {id} were not saved");
        }
        println!("saved memo_id={id}");
    }
    Ok(())
}

async fn fetch(service: &LocalMemoService, id: MemoId) -> Result<Memo> {
    service
        .get(id)
        .await?
        .ok_or_else(|| anyhow!("memo not found: {id}"))
}

async fn open(
    desk: &mut MemoDesk,
    service: &LocalMemoService,
    id: MemoId,
) -> Result<SessionHandle> {
    let memo = fetch(service, id).await?;
    Ok(desk.open_memo(memo))
}
