use crate::domain::sort::{forest_stats, sort_forest};
use crate::domain::traits::{HostProcess, ProcessControl, Prompter};
use crate::infrastructure::locations::bookmarks_path;
use crate::infrastructure::xml_document::{
    move_to_backup, read_bookmarks_file, write_bookmarks_file,
};
use crate::usecase::error::SortError;
use crate::usecase::event::SortEvent;
use crate::usecase::stats::SortStats;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::{fs, task, time};
use tracing::{debug, info};

pub const DEFAULT_PROCESS_NAME: &str = "sourcetree";
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

pub const CLOSE_HOST_QUESTION: &str =
    "SourceTree is running. Would you like to close it? Selecting 'No' will cancel the sort.";
pub const SUCCESS_MESSAGE: &str = "Sort completed!";

#[derive(Debug, Clone)]
pub struct SortJob {
    /// The host application's data directory; must already exist.
    pub data_dir: PathBuf,
    pub process_name: String,
    /// How long each running host instance gets to exit after being asked.
    pub shutdown_timeout: Duration,
    pub poll_interval: Duration,
    /// Where the sorted document is written; `None` means back in place.
    pub output_path: Option<PathBuf>,
}

impl SortJob {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            process_name: DEFAULT_PROCESS_NAME.to_string(),
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            output_path: None,
        }
    }

    pub fn bookmarks_path(&self) -> PathBuf {
        bookmarks_path(&self.data_dir)
    }

    pub fn output_path(&self) -> PathBuf {
        self.output_path
            .clone()
            .unwrap_or_else(|| self.bookmarks_path())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortOutcome {
    Completed(SortStats),
    /// The user chose to keep the host application running.
    Cancelled,
}

/// Loads, sorts, backs up and rewrites the bookmarks document.
///
/// Each step either succeeds or ends the run with the matching
/// [`SortError`]. The document on disk is only touched by the backup rename
/// and the final write, so any failure before the backup leaves it as it was.
pub async fn perform_sort(
    job: &SortJob,
    processes: &dyn ProcessControl,
    prompter: &dyn Prompter,
    sink: Option<mpsc::Sender<SortEvent>>,
) -> Result<SortOutcome, SortError> {
    // Let the runtime finish starting up before doing any IO.
    task::yield_now().await;

    if !is_dir(&job.data_dir).await {
        return Err(SortError::HostNotInstalled(job.data_dir.clone()));
    }

    let bookmarks = job.bookmarks_path();
    if !is_file(&bookmarks).await {
        return Err(SortError::BookmarksNotFound(bookmarks));
    }

    let running = processes.find_by_name(&job.process_name);
    if !running.is_empty() {
        debug!(count = running.len(), name = %job.process_name, "host application is running");
        if !prompter.confirm(CLOSE_HOST_QUESTION) {
            info!("user declined to close the host application; nothing changed");
            return Ok(SortOutcome::Cancelled);
        }

        emit(&sink, SortEvent::PhaseStarted { name: "close_host".into() }).await;
        for process in &running {
            close_host(job, processes, process, &sink).await?;
        }
        emit(&sink, SortEvent::PhaseFinished { name: "close_host".into() }).await;
    }

    emit(&sink, SortEvent::PhaseStarted { name: "load".into() }).await;
    let mut forest = read_bookmarks_file(&bookmarks)
        .await
        .map_err(SortError::load)?
        .ok_or_else(|| SortError::load("the document contains no bookmark list"))?;
    emit(&sink, SortEvent::PhaseFinished { name: "load".into() }).await;

    emit(&sink, SortEvent::PhaseStarted { name: "sort".into() }).await;
    sort_forest(Some(&mut forest)).map_err(SortError::sort)?;
    let stats = SortStats::from_forest(forest_stats(&forest), running.len());
    info!(
        folders = stats.folders,
        entries = stats.entries,
        max_depth = stats.max_depth,
        "sorted bookmarks"
    );
    emit(&sink, SortEvent::PhaseFinished { name: "sort".into() }).await;

    emit(&sink, SortEvent::PhaseStarted { name: "backup".into() }).await;
    let backup = move_to_backup(&bookmarks).await.map_err(SortError::backup)?;
    info!(backup = %backup.display(), "moved previous bookmarks aside");
    emit(
        &sink,
        SortEvent::BackupCreated {
            path: backup.display().to_string(),
        },
    )
    .await;
    emit(&sink, SortEvent::PhaseFinished { name: "backup".into() }).await;

    emit(&sink, SortEvent::PhaseStarted { name: "save".into() }).await;
    let output = job.output_path();
    write_bookmarks_file(&output, &forest)
        .await
        .map_err(SortError::save)?;
    debug!(output = %output.display(), "wrote sorted bookmarks");
    emit(&sink, SortEvent::PhaseFinished { name: "save".into() }).await;

    emit(
        &sink,
        SortEvent::Finished {
            stats: stats.clone(),
        },
    )
    .await;
    Ok(SortOutcome::Completed(stats))
}

async fn close_host(
    job: &SortJob,
    processes: &dyn ProcessControl,
    process: &HostProcess,
    sink: &Option<mpsc::Sender<SortEvent>>,
) -> Result<(), SortError> {
    processes
        .request_close(process)
        .map_err(|e| SortError::HostNotClosed {
            reason: format!("{e:#}"),
        })?;
    info!(pid = process.pid, "asked host application to close");
    emit(sink, SortEvent::HostCloseRequested { pid: process.pid }).await;

    let exited = async {
        while processes.is_running(process) {
            time::sleep(job.poll_interval).await;
        }
    };
    time::timeout(job.shutdown_timeout, exited)
        .await
        .map_err(|_| SortError::close_timeout(process.pid, job.shutdown_timeout))
}

async fn is_dir(path: &Path) -> bool {
    fs::metadata(path).await.map(|m| m.is_dir()).unwrap_or(false)
}

async fn is_file(path: &Path) -> bool {
    fs::metadata(path).await.map(|m| m.is_file()).unwrap_or(false)
}

async fn emit(sink: &Option<mpsc::Sender<SortEvent>>, ev: SortEvent) {
    if let Some(tx) = sink {
        let _ = tx.send(ev).await;
    }
}
