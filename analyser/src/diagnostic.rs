use std::fmt;
use std::ops::Range;

use codespan_reporting::diagnostic::{Diagnostic, Label};

/// Reported once per classifier that targets a key already set for the block.
pub const CONFLICT_MESSAGE: &str = "multiple modifiers with conflicting meaning";

/// Receiver of non-fatal findings. `context` is the byte span of the block the
/// finding is about.
pub trait DiagnosticSink {
    fn report(&mut self, context: Range<usize>, message: &str);
}

/// A non-fatal finding with source location information.
#[derive(Debug, Clone, PartialEq)]
pub struct Warning {
    pub message: String,
    pub span: Range<usize>,
    pub source_id: usize,
}

impl Warning {
    /// Convert to a codespan-reporting Diagnostic for display.
    pub fn to_diagnostic(&self) -> Diagnostic<usize> {
        Diagnostic::warning()
            .with_message(self.message.clone())
            .with_labels(vec![Label::primary(self.source_id, self.span.clone())])
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "warning: {}", self.message)
    }
}

/// Sink that keeps every report as a [`Warning`] against one source file.
#[derive(Debug, Default)]
pub struct WarningCollector {
    source_id: usize,
    warnings: Vec<Warning>,
}

impl WarningCollector {
    pub fn new(source_id: usize) -> Self {
        WarningCollector {
            source_id,
            warnings: Vec::new(),
        }
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn into_warnings(self) -> Vec<Warning> {
        self.warnings
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }
}

impl DiagnosticSink for WarningCollector {
    fn report(&mut self, context: Range<usize>, message: &str) {
        self.warnings.push(Warning {
            message: message.to_string(),
            span: context,
            source_id: self.source_id,
        });
    }
}
