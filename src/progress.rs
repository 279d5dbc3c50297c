//! Progress reporting and user-visible notifications
//!
//! Commands talk to a [`ProgressReporter`] instead of printing directly, so
//! the same flow can drive a spinner on a terminal, plain lines in a pipe, or
//! nothing at all in tests.

use std::{
    path::Path,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::{Duration, Instant},
};

/// Phase of a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// Loading configuration
    LoadingConfig,
    /// Waiting on the data source
    Fetching(&'static str),
    /// Laying out a document
    Generating,
    /// Writing the document to disk
    Writing,
    /// Completed successfully
    Completed,
    /// Failed with error
    Failed(String),
}

impl Phase {
    fn message(&self) -> String {
        match self {
            Phase::LoadingConfig => "📋 Loading configuration...".to_owned(),
            Phase::Fetching(what) => format!("📡 Fetching {what}..."),
            Phase::Generating => "📄 Generating document...".to_owned(),
            Phase::Writing => "💾 Writing document...".to_owned(),
            Phase::Completed => "✅ Completed!".to_owned(),
            Phase::Failed(e) => format!("❌ Failed: {e}"),
        }
    }
}

pub trait ProgressReporter: Send + Sync {
    fn set_phase(&self, phase: Phase);

    /// Record a document written to `path`.
    fn document_written(&self, path: &Path, pages: usize);

    fn log_info(&self, message: &str);

    /// Surface a problem that did not stop the command.
    fn log_warn(&self, message: &str);

    /// Surface the error that stopped the command.
    fn log_error(&self, message: &str);

    /// Finish and clean up the display.
    fn finish(&self);
}

/// A no-op reporter for when progress display is disabled.
pub struct NullReporter;

impl ProgressReporter for NullReporter {
    fn set_phase(&self, _phase: Phase) {}
    fn document_written(&self, _path: &Path, _pages: usize) {}
    fn log_info(&self, _message: &str) {}
    fn log_warn(&self, _message: &str) {}
    fn log_error(&self, _message: &str) {}
    fn finish(&self) {}
}

#[derive(Debug)]
struct Stats {
    documents: usize,
    pages: usize,
    warnings: usize,
    errors: usize,
    start_time: Instant,
}

impl Stats {
    fn new() -> Mutex<Self> {
        Mutex::new(Self {
            documents: 0,
            pages: 0,
            warnings: 0,
            errors: 0,
            start_time: Instant::now(),
        })
    }
}

fn lock(stats: &Mutex<Stats>) -> MutexGuard<'_, Stats> {
    stats.lock().unwrap_or_else(PoisonError::into_inner)
}

fn print_summary(stats: &Stats) {
    if stats.documents == 0 && stats.warnings == 0 && stats.errors == 0 {
        return;
    }
    eprintln!();
    eprintln!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    eprintln!("📊 Summary");
    eprintln!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    eprintln!("   📄 Documents: {} ({} pages)", stats.documents, stats.pages);
    if stats.warnings > 0 {
        eprintln!("   ⚠️  Warnings:  {}", stats.warnings);
    }
    if stats.errors > 0 {
        eprintln!("   ❌ Errors:    {}", stats.errors);
    }
    eprintln!(
        "   ⏱️  Duration:  {:.2}s",
        stats.start_time.elapsed().as_secs_f64()
    );
    eprintln!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
}

/// A simple reporter that just prints to stderr (for non-TTY).
pub struct SimpleReporter {
    stats: Mutex<Stats>,
}

impl SimpleReporter {
    pub fn new() -> Self {
        Self {
            stats: Stats::new(),
        }
    }
}

impl Default for SimpleReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for SimpleReporter {
    fn set_phase(&self, phase: Phase) {
        eprintln!("{}", phase.message());
    }

    fn document_written(&self, path: &Path, pages: usize) {
        let mut stats = lock(&self.stats);
        stats.documents += 1;
        stats.pages += pages;
        eprintln!("   ✓ {} ({pages} pages)", path.display());
    }

    fn log_info(&self, message: &str) {
        eprintln!("ℹ️  {message}");
    }

    fn log_warn(&self, message: &str) {
        lock(&self.stats).warnings += 1;
        eprintln!("⚠️  {message}");
    }

    fn log_error(&self, message: &str) {
        lock(&self.stats).errors += 1;
        eprintln!("❌ {message}");
    }

    fn finish(&self) {
        print_summary(&lock(&self.stats));
    }
}

/// Spinner-based reporter (for TTY).
pub struct FancyReporter {
    phase_bar: indicatif::ProgressBar,
    stats: Mutex<Stats>,
}

impl FancyReporter {
    pub fn new() -> Self {
        let phase_bar = indicatif::ProgressBar::new_spinner();
        if let Ok(style) = indicatif::ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")
        {
            phase_bar.set_style(style);
        }
        phase_bar.enable_steady_tick(Duration::from_millis(100));
        Self {
            phase_bar,
            stats: Stats::new(),
        }
    }
}

impl Default for FancyReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for FancyReporter {
    fn set_phase(&self, phase: Phase) {
        match phase {
            Phase::Completed | Phase::Failed(_) => {
                self.phase_bar.finish_with_message(phase.message())
            }
            _ => self.phase_bar.set_message(phase.message()),
        }
    }

    fn document_written(&self, path: &Path, pages: usize) {
        let mut stats = lock(&self.stats);
        stats.documents += 1;
        stats.pages += pages;
        self.phase_bar
            .println(format!("   ✓ {} ({pages} pages)", path.display()));
    }

    fn log_info(&self, message: &str) {
        self.phase_bar.println(format!("ℹ️  {message}"));
    }

    fn log_warn(&self, message: &str) {
        lock(&self.stats).warnings += 1;
        self.phase_bar.println(format!("⚠️  {message}"));
    }

    fn log_error(&self, message: &str) {
        lock(&self.stats).errors += 1;
        self.phase_bar.println(format!("❌ {message}"));
    }

    fn finish(&self) {
        if !self.phase_bar.is_finished() {
            self.phase_bar.finish_and_clear();
        }
        print_summary(&lock(&self.stats));
    }
}

/// Create an appropriate reporter based on terminal capabilities.
pub fn create_reporter() -> Arc<dyn ProgressReporter> {
    if console::Term::stderr().is_term() {
        Arc::new(FancyReporter::new())
    } else {
        Arc::new(SimpleReporter::new())
    }
}
