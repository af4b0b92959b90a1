use crate::domain::traits::{ProcessControl, Prompter};
use crate::infrastructure::event_ndjson::spawn_ndjson_printer;
use crate::infrastructure::process_sysinfo::SysinfoProcessControl;
use crate::infrastructure::terminal_prompter::{AutoConfirmPrompter, TerminalPrompter};
use crate::interface::config::Settings;
use crate::interface::logging;
use crate::usecase::event::SortEvent;
use crate::usecase::sort_bookmarks::{perform_sort, SortOutcome, SUCCESS_MESSAGE};
use anyhow::{anyhow, Result};
use std::env;
use tokio::sync::mpsc;
use tracing::{error, info};

pub async fn run() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    run_with_args(&args).await
}

/// Sort failures and cancellation are reported to the user and still
/// return `Ok`; only bad command-line usage is an `Err`.
pub async fn run_with_args(args: &[String]) -> Result<()> {
    parse_args(args)?;
    logging::init();

    let settings = Settings::from_env();
    let processes = SysinfoProcessControl;
    if settings.assume_yes {
        let prompter = AutoConfirmPrompter::new(TerminalPrompter, true);
        run_with_settings(&settings, &processes, &prompter).await;
    } else {
        run_with_settings(&settings, &processes, &TerminalPrompter).await;
    }
    Ok(())
}

/// Runs one sort and shows at most one message: an error, the success
/// notice, or nothing when the user cancelled. Messages go through the
/// prompter, never stdout, which carries only NDJSON events.
pub async fn run_with_settings(
    settings: &Settings,
    processes: &dyn ProcessControl,
    prompter: &dyn Prompter,
) -> Option<SortOutcome> {
    let job = match settings.job() {
        Ok(job) => job,
        Err(e) => {
            error!(error = %e, "could not resolve the SourceTree data directory");
            prompter.error(&format!(
                "Unable to locate the SourceTree data directory because: {e:#}"
            ));
            return None;
        }
    };
    info!(data_dir = %job.data_dir.display(), "sorting bookmarks");

    let (tx, rx) = mpsc::channel::<SortEvent>(64);
    let (sink, printer) = if settings.emit_events {
        (Some(tx), Some(spawn_ndjson_printer(rx)))
    } else {
        drop(rx);
        (None, None)
    };

    let result = perform_sort(&job, processes, prompter, sink).await;

    if let Some(handle) = printer {
        handle.await.ok();
    }

    match result {
        Ok(SortOutcome::Completed(stats)) => {
            prompter.success(SUCCESS_MESSAGE);
            Some(SortOutcome::Completed(stats))
        }
        Ok(SortOutcome::Cancelled) => Some(SortOutcome::Cancelled),
        Err(e) => {
            error!(error = %e, "sort failed");
            prompter.error(&e.to_string());
            None
        }
    }
}

fn parse_args(args: &[String]) -> Result<()> {
    match args.get(1).map(String::as_str) {
        None => Ok(()),
        Some("-h") | Some("--help") => Err(anyhow!(usage())),
        Some(other) => Err(anyhow!(format!("unknown arg: {other}\n\n{}", usage()))),
    }
}

fn usage() -> &'static str {
    "Usage:\n  sourcetree-bookmark-sorter\n\nSorts SourceTree's bookmarks.xml alphabetically at every level. The previous file is kept as bookmarks.xml.bak.\n\nEnvironment:\n  SOURCETREE_DATA_DIR          use this directory instead of <local data dir>/Atlassian/SourceTree\n  SOURCETREE_PROCESS_NAME      host process to close first (default: sourcetree)\n  SOURCETREE_SORT_ASSUME_YES   close a running SourceTree without asking\n  SOURCETREE_SORT_EMIT_EVENTS  write NDJSON progress events to stdout\n  RUST_LOG                     log filter (default: warn)\n\nNDJSON events are written to stdout; messages, prompts and logs go to stderr."
}
