use std::fs::{File, OpenOptions};
use std::io::Write;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use camino::Utf8Path;
use chrono::Local;

use crate::app::{ProgressEvent, ProgressSink};

/// Progress sink that stamps every message with local time, appends it to
/// the run log and optionally echoes it to stdout.
///
/// Write failures are reported once through `tracing` and otherwise ignored.
pub struct Logbook {
    file: Mutex<Option<File>>,
    echo: bool,
    failed: AtomicBool,
}

impl Logbook {
    pub fn open(path: &Utf8Path, echo: bool) -> Self {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_std_path());
        let file = match file {
            Ok(file) => Some(file),
            Err(err) => {
                tracing::warn!(path = %path, error = %err, "run log unavailable");
                None
            }
        };
        Self {
            file: Mutex::new(file),
            echo,
            failed: AtomicBool::new(false),
        }
    }

    fn append(&self, line: &str) {
        let Ok(mut guard) = self.file.lock() else {
            return;
        };
        let Some(file) = guard.as_mut() else {
            return;
        };
        if let Err(err) = writeln!(file, "{line}") {
            if !self.failed.swap(true, Ordering::Relaxed) {
                tracing::warn!(error = %err, "failed to append to run log");
            }
        }
    }
}

pub fn format_line(timestamp: &str, event: &ProgressEvent) -> String {
    match event.elapsed {
        Some(elapsed) => format!(
            "[{timestamp}] {} ({:.1}s)",
            event.message,
            elapsed.as_secs_f64()
        ),
        None => format!("[{timestamp}] {}", event.message),
    }
}

impl ProgressSink for Logbook {
    fn event(&self, event: ProgressEvent) {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let line = format_line(&timestamp, &event);
        tracing::info!("{}", event.message);
        if self.echo {
            println!("{line}");
        }
        self.append(&line);
    }
}
