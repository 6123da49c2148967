//! Breadth-first reachability over the command graph.

use std::collections::VecDeque;

use storyloom_core::label::{LabelIndex, Resolution};
use storyloom_core::script::{ReferenceKind, Script};
use tracing::debug;

use crate::report::{Issue, IssueKind, LabelReport, ReachabilityReport};

/// Analyzes `script`, building its label index first.
#[must_use]
pub fn analyze(script: &Script) -> ReachabilityReport {
    let index = LabelIndex::build(script);
    analyze_with_index(script, &index)
}

/// Analyzes `script` using an index already built from it.
#[must_use]
pub fn analyze_with_index(script: &Script, index: &LabelIndex) -> ReachabilityReport {
    let visited = traverse(script, index);

    let mut issues = Vec::new();
    let mut labels = Vec::with_capacity(index.len());

    for (label, defined_at) in index.definitions() {
        let referenced_from: Vec<usize> = index.referrers(label).collect();
        let is_reachable = visited[*defined_at];
        if !is_reachable {
            let message = if referenced_from.is_empty() {
                format!("label '{label}' is never referenced and cannot be reached")
            } else {
                format!(
                    "label '{label}' is referenced from {} but no path from the start reaches it",
                    format_positions(&referenced_from)
                )
            };
            issues.push(Issue::new(IssueKind::Unreachable, *defined_at, message));
        }
        labels.push(LabelReport {
            label: label.clone(),
            defined_at: *defined_at,
            referenced_from,
            is_reachable,
        });
    }

    for duplicate in index.duplicates() {
        issues.push(Issue::new(
            IssueKind::DuplicateLabel,
            duplicate.duplicate,
            format!(
                "label '{}' is defined at positions {} and {}; jumps resolve to {}",
                duplicate.label, duplicate.first, duplicate.duplicate, duplicate.first
            ),
        ));
    }

    for reference in index.references() {
        if index.resolve(&reference.label) != Resolution::NotFound {
            continue;
        }
        let issue = match reference.kind {
            ReferenceKind::Choice(choice) => Issue::new(
                IssueKind::OrphanChoice,
                reference.from,
                format!(
                    "choice {} targets undefined label '{}'",
                    choice + 1,
                    reference.label
                ),
            ),
            ReferenceKind::Jump => Issue::new(
                IssueKind::DanglingJump,
                reference.from,
                format!("jump targets undefined label '{}'", reference.label),
            ),
            ReferenceKind::Condition => Issue::new(
                IssueKind::DanglingJump,
                reference.from,
                format!("conditional jump targets undefined label '{}'", reference.label),
            ),
        };
        issues.push(issue);
    }

    for (position, command) in script.commands.iter().enumerate() {
        if command.jump.is_some() && command.choices.is_some() {
            issues.push(Issue::new(
                IssueKind::AmbiguousBranch,
                position,
                "command has both jump and choices; the jump is taken and the choices are never shown"
                    .to_owned(),
            ));
        }
        if command.primary_choices().is_some_and(<[_]>::is_empty) {
            issues.push(Issue::new(
                IssueKind::EmptyChoices,
                position,
                "choices list is empty; playback would wait forever".to_owned(),
            ));
        }
    }

    for start in silent_loops(script, index) {
        issues.push(Issue::new(
            IssueKind::SilentLoop,
            start,
            format!("commands loop back to position {start} without displaying anything"),
        ));
    }

    issues.sort_by_key(|issue| (issue.position, issue.kind));

    let live_positions: Vec<usize> = visited
        .iter()
        .enumerate()
        .filter_map(|(position, &live)| live.then_some(position))
        .collect();

    debug!(
        title = %script.title,
        commands = script.len(),
        live = live_positions.len(),
        issues = issues.len(),
        "analyzed script"
    );

    ReachabilityReport {
        labels,
        issues,
        live_positions,
    }
}

/// Outgoing edges of the command at `position`.
///
/// - `jump` edges only to its target.
/// - `if` edges to its target and, like any command without choices, to
///   the next position.
/// - `choices` edge to every resolvable target and never fall through.
pub(crate) fn successors(script: &Script, index: &LabelIndex, position: usize) -> Vec<usize> {
    let command = &script.commands[position];

    if let Some(target) = &command.jump {
        return index.resolve(target).position().into_iter().collect();
    }

    let mut edges = Vec::new();
    if let Some(condition) = &command.condition {
        edges.extend(index.resolve(&condition.jump).position());
    }
    match &command.choices {
        Some(choices) => {
            edges.extend(
                choices
                    .iter()
                    .filter_map(|choice| index.resolve(&choice.jump).position()),
            );
        }
        None if position + 1 < script.len() => edges.push(position + 1),
        None => {}
    }
    edges
}

/// Marks every position reachable from position 0.
fn traverse(script: &Script, index: &LabelIndex) -> Vec<bool> {
    let mut visited = vec![false; script.len()];
    if script.is_empty() {
        return visited;
    }

    let mut queue = VecDeque::from([0]);
    visited[0] = true;
    while let Some(position) = queue.pop_front() {
        for next in successors(script, index, position) {
            if !visited[next] {
                visited[next] = true;
                queue.push_back(next);
            }
        }
    }
    visited
}

/// Finds cycles made only of commands that neither display nor suspend and
/// have a single forced successor. Returns the lowest position of each
/// cycle, ascending.
fn silent_loops(script: &Script, index: &LabelIndex) -> Vec<usize> {
    #[derive(Clone, Copy, PartialEq, Eq)]
    enum Mark {
        Unseen,
        OnPath,
        Done,
    }

    let forced_successor = |position: usize| -> Option<usize> {
        let command = &script.commands[position];
        if command.is_suspending() {
            return None;
        }
        match (&command.jump, &command.condition) {
            (Some(target), _) => index.resolve(target).position(),
            (None, Some(_)) => None,
            (None, None) => Some(position + 1).filter(|&next| next < script.len()),
        }
    };

    let mut marks = vec![Mark::Unseen; script.len()];
    let mut loops = Vec::new();

    for start in 0..script.len() {
        if marks[start] != Mark::Unseen {
            continue;
        }
        let mut path = Vec::new();
        let mut cursor = Some(start);
        while let Some(position) = cursor {
            match marks[position] {
                Mark::Done => break,
                Mark::OnPath => {
                    let cycle_start = path
                        .iter()
                        .position(|&p| p == position)
                        .unwrap_or_default();
                    if let Some(&lowest) = path[cycle_start..].iter().min() {
                        loops.push(lowest);
                    }
                    break;
                }
                Mark::Unseen => {
                    marks[position] = Mark::OnPath;
                    path.push(position);
                    cursor = forced_successor(position);
                }
            }
        }
        for position in path {
            marks[position] = Mark::Done;
        }
    }

    loops.sort_unstable();
    loops
}

fn format_positions(positions: &[usize]) -> String {
    let joined: Vec<String> = positions.iter().map(ToString::to_string).collect();
    if positions.len() == 1 {
        format!("position {}", joined[0])
    } else {
        format!("positions {}", joined.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use storyloom_test_support::fixtures;

    use super::*;

    #[test]
    fn test_dangling_jump_is_the_only_issue() {
        // Arrange
        let script = fixtures::dangling_jump();

        // Act
        let report = analyze(&script);

        // Assert
        assert!(report.label("a").unwrap().is_reachable);
        assert_eq!(report.issues.len(), 1);
        let issue = &report.issues[0];
        assert_eq!(issue.kind, IssueKind::DanglingJump);
        assert_eq!(issue.position, 1);
        assert!(issue.message.contains("missing"));
    }

    #[test]
    fn test_choice_targets_are_reachable() {
        let report = analyze(&fixtures::two_way_choice());

        assert!(report.label("l1").unwrap().is_reachable);
        assert!(report.label("l2").unwrap().is_reachable);
        assert_eq!(report.label("l1").unwrap().referenced_from, vec![1]);
        assert!(report.issues.is_empty());
        assert_eq!(report.live_positions, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_both_sides_of_a_condition_are_live() {
        // Arrange
        let script = fixtures::flag_branch();

        // Act
        let report = analyze(&script);

        // Assert
        assert!(report.label("L").unwrap().is_reachable);
        // the fallthrough line after the `if`
        assert!(report.is_live(3));
        assert!(report.issues.is_empty());
    }

    #[test]
    fn test_jump_does_not_fall_through() {
        // Arrange
        let script = fixtures::script(json!({
            "script": [
                {"jump": "end"},
                {"label": "skipped", "text": "never"},
                {"label": "end", "text": "bye"}
            ]
        }));

        // Act
        let report = analyze(&script);

        // Assert
        assert!(!report.is_live(1));
        assert!(report.is_live(2));
        let unreachable: Vec<_> = report.issues_of(IssueKind::Unreachable).collect();
        assert_eq!(unreachable.len(), 1);
        assert_eq!(unreachable[0].position, 1);
        assert!(unreachable[0].message.contains("never referenced"));
    }

    #[test]
    fn test_referenced_but_unreachable_label_has_distinct_message() {
        // Arrange: "island" is only referenced from unreachable code.
        let script = fixtures::script(json!({
            "script": [
                {"text": "start"},
                {"jump": "end"},
                {"label": "dead", "jump": "island"},
                {"label": "island", "text": "lost"},
                {"label": "end", "text": "bye"}
            ]
        }));

        // Act
        let report = analyze(&script);

        // Assert
        let island = report.label("island").unwrap();
        assert!(!island.is_reachable);
        assert_eq!(island.referenced_from, vec![2]);

        let messages: Vec<_> = report
            .issues_of(IssueKind::Unreachable)
            .map(|issue| issue.message.as_str())
            .collect();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].contains("never referenced"));
        assert!(messages[1].contains("referenced from position 2"));
    }

    #[test]
    fn test_choices_do_not_fall_through() {
        let script = fixtures::script(json!({
            "script": [
                {"choices": [{"label": "go", "jump": "b"}]},
                {"label": "a", "text": "skipped"},
                {"label": "b", "text": "chosen"}
            ]
        }));

        let report = analyze(&script);

        assert!(!report.label("a").unwrap().is_reachable);
        assert!(report.label("b").unwrap().is_reachable);
    }

    #[test]
    fn test_orphan_choice_is_reported_per_choice() {
        // Arrange
        let script = fixtures::script(json!({
            "script": [
                {"choices": [
                    {"label": "ok", "jump": "b"},
                    {"label": "broken", "jump": "nowhere"}
                ]},
                {"label": "b", "text": "fine"}
            ]
        }));

        // Act
        let report = analyze(&script);

        // Assert
        let orphans: Vec<_> = report.issues_of(IssueKind::OrphanChoice).collect();
        assert_eq!(orphans.len(), 1);
        assert_eq!(orphans[0].position, 0);
        assert!(orphans[0].message.contains("choice 2"));
        assert!(report.has_errors());
    }

    #[test]
    fn test_loops_terminate_and_are_live() {
        // Arrange: a legal loop guarded by a condition.
        let script = fixtures::script(json!({
            "script": [
                {"label": "top", "text": "again?"},
                {"if": {"var": "done", "is": true, "jump": "out"}},
                {"jump": "top"},
                {"label": "out", "text": "bye"}
            ]
        }));

        // Act
        let report = analyze(&script);

        // Assert
        assert_eq!(report.live_positions, vec![0, 1, 2, 3]);
        assert!(report.issues.is_empty());
    }

    #[test]
    fn test_duplicate_label_names_both_positions() {
        let script = fixtures::script(json!({
            "script": [
                {"label": "x", "text": "first"},
                {"label": "x", "text": "second"}
            ]
        }));

        let report = analyze(&script);

        let duplicates: Vec<_> = report.issues_of(IssueKind::DuplicateLabel).collect();
        assert_eq!(duplicates.len(), 1);
        assert_eq!(duplicates[0].position, 1);
        assert!(duplicates[0].message.contains("0 and 1"));
        assert_eq!(report.labels.len(), 1);
    }

    #[test]
    fn test_jump_with_choices_is_flagged_ambiguous() {
        // Arrange
        let script = fixtures::script(json!({
            "script": [
                {"jump": "a", "choices": [{"label": "c", "jump": "b"}]},
                {"label": "a", "text": "jumped"},
                {"label": "b", "text": "chosen"}
            ]
        }));

        // Act
        let report = analyze(&script);

        // Assert
        let ambiguous: Vec<_> = report.issues_of(IssueKind::AmbiguousBranch).collect();
        assert_eq!(ambiguous.len(), 1);
        assert_eq!(ambiguous[0].severity, crate::report::Severity::Warning);
        // jump wins: the choice target is only reachable by falling through "a"
        assert!(report.label("b").unwrap().is_reachable);
        assert_eq!(successors(&script, &LabelIndex::build(&script), 0), vec![1]);
    }

    #[test]
    fn test_empty_choices_are_flagged() {
        let script = fixtures::script(json!({"script": [{"text": "pick", "choices": []}]}));

        let report = analyze(&script);

        assert_eq!(report.issues_of(IssueKind::EmptyChoices).count(), 1);
    }

    #[test]
    fn test_silent_self_loop_is_flagged() {
        // Arrange
        let script = fixtures::script(json!({
            "script": [
                {"text": "before"},
                {"label": "spin", "set": {"name": "x", "value": 1}},
                {"jump": "spin"}
            ]
        }));

        // Act
        let report = analyze(&script);

        // Assert
        let loops: Vec<_> = report.issues_of(IssueKind::SilentLoop).collect();
        assert_eq!(loops.len(), 1);
        assert_eq!(loops[0].position, 1);
    }

    #[test]
    fn test_displaying_loop_is_not_silent() {
        let script = fixtures::script(json!({
            "script": [
                {"label": "top", "text": "forever"},
                {"jump": "top"}
            ]
        }));

        let report = analyze(&script);

        assert_eq!(report.issues_of(IssueKind::SilentLoop).count(), 0);
    }

    #[test]
    fn test_visited_set_is_closed_under_edges() {
        // Arrange
        let script = fixtures::every_state();
        let index = LabelIndex::build(&script);

        // Act
        let report = analyze_with_index(&script, &index);

        // Assert
        for &position in &report.live_positions {
            for next in successors(&script, &index, position) {
                assert!(report.is_live(next), "{position} -> {next} escapes");
            }
        }
    }

    #[test]
    fn test_every_target_resolves_or_is_an_issue() {
        // Arrange
        let script = fixtures::script(json!({
            "script": [
                {"jump": "a"},
                {"label": "a", "if": {"var": "v", "is": 1, "jump": "gone"}},
                {"choices": [{"label": "x", "jump": "a"}, {"label": "y", "jump": "void"}]}
            ]
        }));
        let index = LabelIndex::build(&script);

        // Act
        let report = analyze_with_index(&script, &index);

        // Assert
        for reference in index.references() {
            let resolved = index.resolve(&reference.label).position().is_some();
            let flagged = report.issues.iter().any(|issue| {
                issue.position == reference.from
                    && matches!(issue.kind, IssueKind::DanglingJump | IssueKind::OrphanChoice)
                    && issue.message.contains(&format!("'{}'", reference.label))
            });
            assert!(resolved ^ flagged, "reference {reference:?}");
        }
    }

    #[test]
    fn test_empty_script_has_empty_report() {
        let report = analyze(&Script::default());

        assert_eq!(report, ReachabilityReport::default());
    }
}
