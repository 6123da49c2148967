//! Analysis output types.

use serde::Serialize;

/// Category of a content problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// A label no path from the start reaches.
    Unreachable,
    /// A choice whose target label does not exist.
    OrphanChoice,
    /// A `jump` or `if` whose target label does not exist.
    DanglingJump,
    /// A label defined more than once.
    DuplicateLabel,
    /// `jump` and `choices` on the same command; `jump` wins at runtime.
    AmbiguousBranch,
    /// A `choices` list with no options.
    EmptyChoices,
    /// Commands that jump among themselves without ever displaying,
    /// suspending or testing a condition.
    SilentLoop,
}

impl IssueKind {
    /// Default severity for this kind.
    #[must_use]
    pub fn severity(self) -> Severity {
        match self {
            Self::Unreachable | Self::AmbiguousBranch => Severity::Warning,
            Self::OrphanChoice
            | Self::DanglingJump
            | Self::DuplicateLabel
            | Self::EmptyChoices
            | Self::SilentLoop => Severity::Error,
        }
    }
}

/// How serious an issue is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
}

/// One content problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    #[serde(rename = "type")]
    pub kind: IssueKind,
    pub severity: Severity,
    pub message: String,
    /// Position of the offending command.
    pub position: usize,
}

impl Issue {
    pub(crate) fn new(kind: IssueKind, position: usize, message: String) -> Self {
        Self {
            kind,
            severity: kind.severity(),
            message,
            position,
        }
    }
}

/// Liveness of one label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelReport {
    pub label: String,
    pub defined_at: usize,
    /// Positions of commands that jump, branch or offer a choice to it.
    pub referenced_from: Vec<usize>,
    pub is_reachable: bool,
}

/// Result of analyzing one script.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReachabilityReport {
    /// One entry per distinct label, in script order.
    pub labels: Vec<LabelReport>,
    /// Problems ordered by position.
    pub issues: Vec<Issue>,
    /// Visited positions in ascending order.
    pub live_positions: Vec<usize>,
}

impl ReachabilityReport {
    /// Looks up the report for `label`.
    #[must_use]
    pub fn label(&self, label: &str) -> Option<&LabelReport> {
        self.labels.iter().find(|l| l.label == label)
    }

    /// Returns `true` if `position` is reachable from the start.
    #[must_use]
    pub fn is_live(&self, position: usize) -> bool {
        self.live_positions.binary_search(&position).is_ok()
    }

    /// Issues of one kind.
    pub fn issues_of(&self, kind: IssueKind) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(move |issue| issue.kind == kind)
    }

    /// Returns `true` if any issue is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.issues
            .iter()
            .any(|issue| issue.severity == Severity::Error)
    }
}
