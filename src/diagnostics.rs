use std::fmt;

// ---------------------------------------------------------------------------
// Severity-tagged diagnostic lines
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Info,
    Warn,
    Error,
}

impl Severity {
    /// The tag embedded in every emitted line.
    pub fn tag(self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.tag())
    }
}

/// One line written by the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
}

impl Diagnostic {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.severity, self.message)
    }
}

// ---------------------------------------------------------------------------
// Sink
// ---------------------------------------------------------------------------

/// Append-only destination for pipeline diagnostics.
///
/// Implementations must not fail or block; a sink that cannot keep a line
/// drops it.
pub trait DiagnosticSink {
    fn emit(&mut self, diagnostic: Diagnostic);

    fn info(&mut self, message: &str) {
        self.emit(Diagnostic::new(Severity::Info, message));
    }

    fn warn(&mut self, message: &str) {
        self.emit(Diagnostic::new(Severity::Warn, message));
    }

    fn error(&mut self, message: &str) {
        self.emit(Diagnostic::new(Severity::Error, message));
    }
}

/// Collects every line, mostly useful in tests.
impl DiagnosticSink for Vec<Diagnostic> {
    fn emit(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// Forwards diagnostics to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn emit(&mut self, diagnostic: Diagnostic) {
        forward_to_log(&diagnostic);
    }
}

pub fn forward_to_log(diagnostic: &Diagnostic) {
    match diagnostic.severity {
        Severity::Info => log::info!("{}", diagnostic.message),
        Severity::Warn => log::warn!("{}", diagnostic.message),
        Severity::Error => log::error!("{}", diagnostic.message),
    }
}
