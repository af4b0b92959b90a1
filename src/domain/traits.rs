use anyhow::Result;

/// A running instance of the host application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HostProcess {
    pub pid: u32,
}

pub trait ProcessControl {
    fn find_by_name(&self, name: &str) -> Vec<HostProcess>;

    /// Asks the process to shut itself down. Does not wait.
    fn request_close(&self, process: &HostProcess) -> Result<()>;

    fn is_running(&self, process: &HostProcess) -> bool;
}

pub trait Prompter {
    /// Yes/no question. `false` means the user declined.
    fn confirm(&self, question: &str) -> bool;

    fn error(&self, message: &str);

    fn success(&self, message: &str);
}
