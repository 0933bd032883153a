#![forbid(unsafe_code)]

//! Source identifiers, locations, and call-site spans.
//!
//! Lines in a [`Location`] are 1-based (source convention); columns are
//! 0-based. Editors number lines from 0, so every crossing of that boundary
//! goes through [`to_editor_line`] / [`to_source_line`].

use std::fmt;

/// Opaque, stable identifier for a source file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(String);

impl SourceId {
    /// Create a source id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw id.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SourceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for SourceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A point in a source: 1-based line, 0-based column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Location {
    pub source_id: SourceId,
    pub line: u32,
    pub column: u32,
}

impl Location {
    #[must_use]
    pub fn new(source_id: impl Into<SourceId>, line: u32, column: u32) -> Self {
        Self {
            source_id: source_id.into(),
            line,
            column,
        }
    }

    /// Same source and line, different column.
    #[must_use]
    pub fn with_column(&self, column: u32) -> Self {
        Self {
            source_id: self.source_id.clone(),
            line: self.line,
            column,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.source_id, self.line, self.column)
    }
}

/// A `[start, end)` source range.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Span {
    pub start: Location,
    pub end: Location,
}

impl Span {
    #[must_use]
    pub fn new(start: Location, end: Location) -> Self {
        Self { start, end }
    }

    /// Span on a single line covering columns `[start_column, end_column)`.
    #[must_use]
    pub fn on_line(
        source_id: impl Into<SourceId>,
        line: u32,
        start_column: u32,
        end_column: u32,
    ) -> Self {
        let source_id = source_id.into();
        Self {
            start: Location::new(source_id.clone(), line, start_column),
            end: Location::new(source_id, line, end_column),
        }
    }

    #[must_use]
    pub fn is_single_line(&self) -> bool {
        self.start.line == self.end.line
    }

    /// Whether `(line, column)` falls inside this single-line span.
    ///
    /// Multi-line spans never contain anything.
    #[must_use]
    pub fn contains(&self, line: u32, column: u32) -> bool {
        self.is_single_line()
            && self.start.line == line
            && self.start.column <= column
            && column < self.end.column
    }
}

/// One call expression inside a source line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallSite {
    pub location: Span,
}

impl CallSite {
    #[must_use]
    pub fn new(location: Span) -> Self {
        Self { location }
    }

    /// Only single-line call sites take part in breakpoint resolution.
    #[must_use]
    pub fn is_single_line(&self) -> bool {
        self.location.is_single_line()
    }

    #[must_use]
    pub fn source_id(&self) -> &SourceId {
        &self.location.start.source_id
    }
}

/// A position as the editor reports it: 0-based line and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EditorPosition {
    pub line: u32,
    pub column: u32,
}

impl EditorPosition {
    #[must_use]
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// Convert a 1-based source line to the editor's 0-based line.
#[must_use]
pub const fn to_editor_line(line: u32) -> u32 {
    line.saturating_sub(1)
}

/// Convert an editor's 0-based line to a 1-based source line.
#[must_use]
pub const fn to_source_line(editor_line: u32) -> u32 {
    editor_line.saturating_add(1)
}
