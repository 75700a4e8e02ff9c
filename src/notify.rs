use std::io::{self, BufRead, Write};

/// The confirmation/notification surface the pipeline talks to. The core
/// never renders UI itself; it asks this collaborator.
pub trait Notifier {
    fn confirm(&self, question: &str) -> bool;
    fn notify(&self, message: &str);
    fn report(&self, submitted: usize, failed: usize);
}

/// Console rendition: questions on stdout, answers from stdin.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn confirm(&self, question: &str) -> bool {
        print!("{question} [y/N] ");
        if io::stdout().flush().is_err() {
            return false;
        }

        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }

        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }

    fn notify(&self, message: &str) {
        println!("{message}");
    }

    fn report(&self, submitted: usize, failed: usize) {
        println!("Run results:");
        println!("- rows submitted successfully: {submitted}");
        println!("- rows not submitted: {failed}");
    }
}
