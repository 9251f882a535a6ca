//! Navigation for a terminal host.
//!
//! There is no page to move, so requests are printed and remembered. Each
//! invocation is a fresh process, which is what a full reload asks for.

use parking_lot::Mutex;
use portfolio_hub::navigation::Navigator;
use std::io::Write;

/// How a navigation request was made
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Redirect {
    Navigate(String),
    Reload(String),
}

/// Navigator that reports redirects to the user
#[derive(Debug, Default)]
pub struct TerminalNavigator {
    quiet: bool,
    last: Mutex<Option<Redirect>>,
}

impl TerminalNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember redirects without printing them
    pub fn quiet() -> Self {
        Self {
            quiet: true,
            ..Self::default()
        }
    }

    /// The most recent redirect, if any
    pub fn last_redirect(&self) -> Option<Redirect> {
        self.last.lock().clone()
    }

    fn record(&self, redirect: Redirect) {
        if !self.quiet {
            let line = match &redirect {
                Redirect::Navigate(path) => format!("-> {}", path),
                Redirect::Reload(path) => format!("-> {} (session changed, reloading)", path),
            };
            let _ = writeln!(std::io::stdout(), "{}", line);
        }
        *self.last.lock() = Some(redirect);
    }
}

impl Navigator for TerminalNavigator {
    fn navigate(&self, path: &str) {
        self.record(Redirect::Navigate(path.to_string()));
    }

    fn reload(&self, path: &str) {
        tracing::info!("Full reload requested at {}", path);
        self.record(Redirect::Reload(path.to_string()));
    }
}
