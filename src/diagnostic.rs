//! @ai:module:intent Typed, coded and positioned compatibility findings
//! @ai:module:layer domain
//! @ai:module:public_api Issue, Severity, Diagnostic, Diagnostics
//! @ai:module:depends_on model
//! @ai:module:stateless true

use crate::model::Location;
use serde::{Deserialize, Serialize};
use std::fmt;

/// @ai:intent Kind of incompatibility, with a stable numeric code
///
/// Codes are part of the public contract: reports print them and policies
/// suppress by them. Never renumber.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Issue {
    RemovedPackage,
    RemovedClass,
    RemovedMethod,
    RemovedField,
    RemovedInterface,
    ChangedStatic,
    ChangedFinal,
    ChangedType,
    ChangedValue,
    ChangedSuperclass,
    ChangedScope,
    ChangedAbstract,
    ChangedThrows,
    ChangedClass,
    InvalidNullConversion,
}

impl Issue {
    pub const ALL: [Issue; 15] = [
        Issue::RemovedPackage,
        Issue::RemovedClass,
        Issue::RemovedMethod,
        Issue::RemovedField,
        Issue::RemovedInterface,
        Issue::ChangedStatic,
        Issue::ChangedFinal,
        Issue::ChangedType,
        Issue::ChangedValue,
        Issue::ChangedSuperclass,
        Issue::ChangedScope,
        Issue::ChangedAbstract,
        Issue::ChangedThrows,
        Issue::ChangedClass,
        Issue::InvalidNullConversion,
    ];

    pub fn code(&self) -> u32 {
        match self {
            Issue::RemovedPackage => 7,
            Issue::RemovedClass => 8,
            Issue::RemovedMethod => 9,
            Issue::RemovedField => 10,
            Issue::RemovedInterface => 11,
            Issue::ChangedStatic => 12,
            Issue::ChangedFinal => 13,
            Issue::ChangedType => 16,
            Issue::ChangedValue => 17,
            Issue::ChangedSuperclass => 18,
            Issue::ChangedScope => 19,
            Issue::ChangedAbstract => 20,
            Issue::ChangedThrows => 21,
            Issue::ChangedClass => 23,
            Issue::InvalidNullConversion => 40,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Issue::RemovedPackage => "RemovedPackage",
            Issue::RemovedClass => "RemovedClass",
            Issue::RemovedMethod => "RemovedMethod",
            Issue::RemovedField => "RemovedField",
            Issue::RemovedInterface => "RemovedInterface",
            Issue::ChangedStatic => "ChangedStatic",
            Issue::ChangedFinal => "ChangedFinal",
            Issue::ChangedType => "ChangedType",
            Issue::ChangedValue => "ChangedValue",
            Issue::ChangedSuperclass => "ChangedSuperclass",
            Issue::ChangedScope => "ChangedScope",
            Issue::ChangedAbstract => "ChangedAbstract",
            Issue::ChangedThrows => "ChangedThrows",
            Issue::ChangedClass => "ChangedClass",
            Issue::InvalidNullConversion => "InvalidNullConversion",
        }
    }

    /// @ai:intent Look up an issue by its numeric code
    /// @ai:example (23) -> Some(ChangedClass)
    /// @ai:example (1) -> None
    pub fn from_code(code: u32) -> Option<Issue> {
        Issue::ALL.into_iter().find(|issue| issue.code() == code)
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name(), self.code())
    }
}

/// @ai:intent Severity level for a finding
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    #[default]
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// @ai:intent A single compatibility finding
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Diagnostic {
    pub issue: Issue,
    pub code: u32,
    pub severity: Severity,
    pub message: String,
    /// The element complained about, e.g. `test.pkg.MyTest.convert3(Float)`.
    pub target: String,
    /// Where the element is declared: the previous file for removals, the
    /// current file for changes.
    pub location: Location,
}

impl Diagnostic {
    /// @ai:intent Create a warning for an issue
    pub fn warning(
        issue: Issue,
        message: impl Into<String>,
        target: impl Into<String>,
        location: Location,
    ) -> Self {
        Self {
            issue,
            code: issue.code(),
            severity: Severity::Warning,
            message: message.into(),
            target: target.into(),
            location,
        }
    }
}

impl fmt::Display for Diagnostic {
    /// `api.txt:5: warning: Removed class test.pkg.Foo [RemovedClass:8]`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}: {} [{}]",
            self.location, self.severity, self.message, self.issue
        )
    }
}

/// @ai:intent Ordered, append-only findings of one comparison run
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Diagnostics {
    pub previous: String,
    pub current: String,
    diagnostics: Vec<Diagnostic>,
    errors: usize,
    warnings: usize,
}

impl Diagnostics {
    pub fn new(previous: impl Into<String>, current: impl Into<String>) -> Self {
        Self {
            previous: previous.into(),
            current: current.into(),
            ..Default::default()
        }
    }

    /// @ai:intent Append a finding and update counts
    pub(crate) fn push(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Error => self.errors += 1,
            Severity::Warning => self.warnings += 1,
        }
        self.diagnostics.push(diagnostic);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn errors(&self) -> usize {
        self.errors
    }

    pub fn warnings(&self) -> usize {
        self.warnings
    }

    /// @ai:intent Check if any finding is fatal under the applied policy
    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }

    /// @ai:intent Count findings of one issue kind
    pub fn count(&self, issue: Issue) -> usize {
        self.diagnostics.iter().filter(|d| d.issue == issue).count()
    }

    /// @ai:intent Numeric codes in emission order
    pub fn codes(&self) -> Vec<u32> {
        self.diagnostics.iter().map(|d| d.code).collect()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.iter()
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.into_iter()
    }
}
