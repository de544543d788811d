use crate::model::Location;
use std::fmt;
use std::sync::Mutex;
use strum_macros::{AsRefStr, Display, EnumIter, IntoStaticStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
pub enum Severity {
    #[strum(serialize = "error")]
    Fatal,
    #[strum(serialize = "warning")]
    NonFatal,
}

/// Analysis outcome taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, EnumIter)]
pub enum Classification {
    #[strum(to_string = "no accessible service provider")]
    ProviderNotFound,
    #[strum(to_string = "static methods cannot be woven")]
    StaticUnsupported,
    #[strum(to_string = "aspect attribute on a non-method symbol")]
    InvalidAspectTarget,
    #[strum(to_string = "call bypasses interception")]
    Uninterceptable,
    #[strum(to_string = "aspect configuration out of bounds")]
    InvalidConfiguration,
    #[strum(to_string = "parameter cannot be captured")]
    UnsupportedParameter,
    #[strum(to_string = "aspect declared with divergent orders")]
    DivergentOrder,
}

impl Classification {
    pub fn code(self) -> &'static str {
        match self {
            Self::ProviderNotFound => "AW001",
            Self::StaticUnsupported => "AW002",
            Self::InvalidAspectTarget => "AW003",
            Self::Uninterceptable => "AW004",
            Self::InvalidConfiguration => "AW005",
            Self::UnsupportedParameter => "AW006",
            Self::DivergentOrder => "AW007",
        }
    }

    pub fn severity(self) -> Severity {
        match self {
            Self::Uninterceptable | Self::DivergentOrder => Severity::NonFatal,
            _ => Severity::Fatal,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Diagnostic {
    pub classification: Classification,
    pub severity: Severity,
    pub location: Location,
    /// Method, attribute or argument the diagnostic is about
    pub subject: String,
}

impl Diagnostic {
    pub fn new(classification: Classification, location: Location, subject: impl Into<String>) -> Self {
        Self {
            classification,
            severity: classification.severity(),
            location,
            subject: subject.into(),
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.severity == Severity::Fatal
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} {}: {} ({})",
            self.location,
            self.severity,
            self.classification.code(),
            self.classification,
            self.subject
        )
    }
}

/// Receiver of analysis diagnostics
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, diagnostic: Diagnostic);
}

/// Sink that keeps every diagnostic in arrival order
#[derive(Debug, Default)]
pub struct CollectingSink {
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics
            .lock()
            .map(|diagnostics| diagnostics.clone())
            .unwrap_or_default()
    }

    pub fn codes(&self) -> Vec<&'static str> {
        self.diagnostics()
            .iter()
            .map(|diagnostic| diagnostic.classification.code())
            .collect()
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, diagnostic: Diagnostic) {
        if let Ok(mut diagnostics) = self.diagnostics.lock() {
            diagnostics.push(diagnostic);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_codes_are_unique_and_ordered() {
        let codes: Vec<_> = Classification::iter().map(Classification::code).collect();
        assert_eq!(codes, vec!["AW001", "AW002", "AW003", "AW004", "AW005", "AW006", "AW007"]);
    }

    #[test]
    fn test_only_call_pattern_and_order_notes_are_non_fatal() {
        let non_fatal: Vec<_> = Classification::iter()
            .filter(|classification| classification.severity() == Severity::NonFatal)
            .collect();
        assert_eq!(
            non_fatal,
            vec![Classification::Uninterceptable, Classification::DivergentOrder]
        );
    }

    #[test]
    fn test_display() {
        let diagnostic = Diagnostic::new(
            Classification::StaticUnsupported,
            Location::new("src/lib.rs", 3, 9),
            "Clock::now",
        );
        assert_eq!(
            diagnostic.to_string(),
            "src/lib.rs:3:9: error AW002: static methods cannot be woven (Clock::now)"
        );
    }

    #[test]
    fn test_collecting_sink_keeps_order() {
        let sink = CollectingSink::new();
        let location = Location::new("a.rs", 1, 1);
        sink.report(Diagnostic::new(Classification::Uninterceptable, location.clone(), "a"));
        sink.report(Diagnostic::new(Classification::ProviderNotFound, location, "b"));
        assert_eq!(sink.codes(), vec!["AW004", "AW001"]);
    }
}
