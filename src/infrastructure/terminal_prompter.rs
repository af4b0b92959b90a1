use crate::domain::traits::Prompter;
use colored::Colorize;
use dialoguer::Confirm;

/// Modal-style prompts on the terminal. Everything goes to stderr so stdout
/// stays free for the NDJSON event stream.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn confirm(&self, question: &str) -> bool {
        let answer = Confirm::new()
            .with_prompt(question)
            .default(false)
            .interact_opt();
        accepted(answer)
    }

    fn error(&self, message: &str) {
        eprintln!("{}", format!("Error: {message}").red());
    }

    fn success(&self, message: &str) {
        eprintln!("{}", message.green());
    }
}

/// No terminal, end of input or Esc all count as "no".
fn accepted(answer: dialoguer::Result<Option<bool>>) -> bool {
    match answer {
        Ok(Some(yes)) => yes,
        Ok(None) => false,
        Err(e) => {
            tracing::debug!(error = %e, "confirmation prompt unavailable; treating as no");
            false
        }
    }
}

/// Answers every confirmation with `answer` and forwards the rest.
#[derive(Debug, Clone)]
pub struct AutoConfirmPrompter<P> {
    inner: P,
    answer: bool,
}

impl<P: Prompter> AutoConfirmPrompter<P> {
    pub fn new(inner: P, answer: bool) -> Self {
        Self { inner, answer }
    }
}

impl<P: Prompter> Prompter for AutoConfirmPrompter<P> {
    fn confirm(&self, question: &str) -> bool {
        tracing::info!(question, answer = self.answer, "auto-answering confirmation");
        self.answer
    }

    fn error(&self, message: &str) {
        self.inner.error(message);
    }

    fn success(&self, message: &str) {
        self.inner.success(message);
    }
}
