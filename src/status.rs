// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use overlay_kit::LoadError;

/// Diagnostic message with timestamp
#[derive(Debug, Clone)]
pub struct DiagnosticMessage {
    pub timestamp: DateTime<Utc>,
    pub level: DiagnosticLevel,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DiagnosticLevel {
    Info,
    Warning,
    Error,
}

/// Progress and diagnostics of the overlay load pass
#[derive(Debug)]
pub struct LoadJournal {
    expected: usize,
    loaded: usize,
    failed: usize,
    finished: bool,
    started_at: DateTime<Utc>,

    // Diagnostic messages (keep last 50)
    diagnostics: VecDeque<DiagnosticMessage>,
    max_diagnostics: usize,
}

impl LoadJournal {
    pub fn new(expected: usize) -> Self {
        Self {
            expected,
            loaded: 0,
            failed: 0,
            finished: false,
            started_at: Utc::now(),
            diagnostics: VecDeque::with_capacity(50),
            max_diagnostics: 50,
        }
    }

    pub fn expected(&self) -> usize {
        self.expected
    }

    pub fn loaded(&self) -> usize {
        self.loaded
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn diagnostics(&self) -> &VecDeque<DiagnosticMessage> {
        &self.diagnostics
    }

    pub fn record_loaded(&mut self, label: &str, features: usize) {
        self.loaded += 1;
        self.add_diagnostic(
            DiagnosticLevel::Info,
            format!("{label}: {features} feições"),
        );
    }

    pub fn record_failed(&mut self, label: &str, error: &LoadError) {
        self.failed += 1;
        let level = if error.is_transport() {
            DiagnosticLevel::Warning
        } else {
            DiagnosticLevel::Error
        };
        self.add_diagnostic(level, format!("{label}: {error}"));
    }

    /// A source loaded but its label was already taken
    pub fn record_rejected(&mut self, label: &str) {
        self.failed += 1;
        self.add_diagnostic(
            DiagnosticLevel::Warning,
            format!("{label}: camada duplicada ignorada"),
        );
    }

    /// Close the pass. Totals come from this journal, so a source rejected as
    /// a duplicate counts as a failure here too.
    pub fn finish(&mut self) {
        self.finished = true;
        let elapsed = (Utc::now() - self.started_at).num_milliseconds();
        self.add_diagnostic(
            DiagnosticLevel::Info,
            format!(
                "Carga concluída em {elapsed} ms: {} ok, {} falhas",
                self.loaded, self.failed
            ),
        );
    }

    /// Add a diagnostic message
    pub fn add_diagnostic(&mut self, level: DiagnosticLevel, message: String) {
        let diagnostic = DiagnosticMessage {
            timestamp: Utc::now(),
            level,
            message,
        };

        self.diagnostics.push_back(diagnostic);

        // Keep only the last N messages
        while self.diagnostics.len() > self.max_diagnostics {
            self.diagnostics.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use overlay_kit::{OverlayDocument, ParseError};

    use super::*;

    #[test]
    fn test_counts_and_levels() {
        let mut journal = LoadJournal::new(3);
        journal.record_loaded("APP", 12);

        let io = LoadError::Io {
            path: "missing.geojson".into(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        journal.record_failed("Geologia", &io);

        let parse = OverlayDocument::parse("{").unwrap_err();
        assert!(matches!(parse, ParseError::Json(_)));
        journal.record_failed("Vegetação", &LoadError::Parse(parse));

        journal.finish();

        assert_eq!((journal.loaded(), journal.failed()), (1, 2));
        assert!(journal.is_finished());
        let last = journal.diagnostics().back().map(|d| d.message.as_str()).unwrap();
        assert!(last.ends_with(": 1 ok, 2 falhas"), "{last}");
        let levels: Vec<_> = journal.diagnostics().iter().map(|d| d.level).collect();
        assert_eq!(
            levels,
            vec![
                DiagnosticLevel::Info,
                DiagnosticLevel::Warning,
                DiagnosticLevel::Error,
                DiagnosticLevel::Info
            ]
        );
    }

    #[test]
    fn test_diagnostics_are_bounded() {
        let mut journal = LoadJournal::new(0);
        for i in 0..80 {
            journal.add_diagnostic(DiagnosticLevel::Info, format!("message {i}"));
        }
        assert_eq!(journal.diagnostics().len(), 50);
        assert_eq!(journal.diagnostics().front().map(|d| d.message.as_str()), Some("message 30"));
    }
}
