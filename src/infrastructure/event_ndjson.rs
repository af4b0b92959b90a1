use crate::usecase::event::SortEvent;
use serde_json::json;
use std::io::{self, Write};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

fn sort_event_to_json(ev: &SortEvent) -> serde_json::Value {
    match ev {
        SortEvent::PhaseStarted { name } => json!({"type":"phase_started","name":name}),
        SortEvent::PhaseFinished { name } => json!({"type":"phase_finished","name":name}),
        SortEvent::HostCloseRequested { pid } => {
            json!({"type":"host_close_requested","pid":pid})
        }
        SortEvent::BackupCreated { path } => json!({"type":"backup_created","path":path}),
        SortEvent::Finished { stats } => json!({"type":"finished","stats":stats}),
    }
}

/// Prints every event of a run to stdout, one JSON object per line, until
/// the run drops its sender.
pub fn spawn_ndjson_printer(rx: mpsc::Receiver<SortEvent>) -> JoinHandle<io::Stdout> {
    spawn_ndjson_writer(rx, io::stdout())
}

/// Like [`spawn_ndjson_printer`] but into any writer, which is handed back
/// once the channel closes.
pub fn spawn_ndjson_writer<W>(mut rx: mpsc::Receiver<SortEvent>, mut out: W) -> JoinHandle<W>
where
    W: Write + Send + 'static,
{
    tokio::spawn(async move {
        while let Some(ev) = rx.recv().await {
            let line = sort_event_to_json(&ev);
            if let Err(e) = writeln!(out, "{line}").and_then(|()| out.flush()) {
                tracing::warn!(error = %e, "could not write progress event");
            }
        }
        out
    })
}
