//! Storyloom — static reachability analysis.
//!
//! Treats a script as a directed graph and reports which labels can ever be
//! reached and which jump targets are malformed. Both sides of every `if`
//! are considered live, so the analysis over-approximates any single
//! playthrough.

pub mod reachability;
pub mod report;

pub use reachability::{analyze, analyze_with_index};
pub use report::{Issue, IssueKind, LabelReport, ReachabilityReport, Severity};
