use crate::domain::traits::{HostProcess, ProcessControl};
use anyhow::{anyhow, Result};
use sysinfo::{Pid, ProcessesToUpdate, Signal, System};

/// Process table access backed by `sysinfo`.
///
/// Closing is a SIGTERM so the host gets to shut down on its own terms.
#[derive(Debug, Default, Clone, Copy)]
pub struct SysinfoProcessControl;

impl ProcessControl for SysinfoProcessControl {
    fn find_by_name(&self, name: &str) -> Vec<HostProcess> {
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::All, true);

        let mut found: Vec<HostProcess> = sys
            .processes()
            .iter()
            .filter(|(_, p)| matches_process_name(&p.name().to_string_lossy(), name))
            .map(|(pid, _)| HostProcess { pid: pid.as_u32() })
            .collect();
        found.sort_by_key(|p| p.pid);
        found
    }

    fn request_close(&self, process: &HostProcess) -> Result<()> {
        let pid = Pid::from_u32(process.pid);
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);

        let Some(proc_) = sys.process(pid) else {
            // Already gone.
            return Ok(());
        };
        match proc_.kill_with(Signal::Term) {
            Some(true) => Ok(()),
            Some(false) => Err(anyhow!("process {} refused the termination request", process.pid)),
            None => Err(anyhow!("graceful shutdown is not supported on this platform")),
        }
    }

    fn is_running(&self, process: &HostProcess) -> bool {
        let pid = Pid::from_u32(process.pid);
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
        sys.process(pid).is_some()
    }
}

/// Case-insensitive match that ignores a trailing `.exe`.
pub fn matches_process_name(candidate: &str, wanted: &str) -> bool {
    fn stem(s: &str) -> String {
        let lower = s.trim().to_lowercase();
        match lower.strip_suffix(".exe") {
            Some(stripped) => stripped.to_string(),
            None => lower,
        }
    }
    !wanted.trim().is_empty() && stem(candidate) == stem(wanted)
}
