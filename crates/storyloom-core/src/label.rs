//! Label index and jump-target resolution.
//!
//! Both the reachability analyzer and playback resolve targets through the
//! same index, so a label that one of them considers dangling is dangling
//! for the other too.

use std::collections::HashMap;

use serde::Serialize;

use crate::script::{ReferenceKind, Script};

/// A label defined more than once.
///
/// Resolution uses the first definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateLabel {
    /// The label name.
    pub label: String,
    /// Position of the definition that wins.
    pub first: usize,
    /// Position of the ignored definition.
    pub duplicate: usize,
}

/// A reference to a label from some command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelReference {
    /// The referenced label name.
    pub label: String,
    /// Position of the referring command.
    pub from: usize,
    /// Which field of the command refers to the label.
    pub kind: ReferenceKind,
}

/// Result of resolving a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The label is defined at this position.
    Found(usize),
    /// No command carries the label.
    NotFound,
}

impl Resolution {
    /// Returns the position, if found.
    #[must_use]
    pub fn position(self) -> Option<usize> {
        match self {
            Self::Found(position) => Some(position),
            Self::NotFound => None,
        }
    }
}

/// Mapping from label name to command position, derived from one script.
#[derive(Debug, Clone, Default)]
pub struct LabelIndex {
    positions: HashMap<String, usize>,
    definitions: Vec<(String, usize)>,
    duplicates: Vec<DuplicateLabel>,
    references: Vec<LabelReference>,
}

impl LabelIndex {
    /// Builds the index with a single pass over `script`.
    ///
    /// Duplicate definitions are collected rather than rejected; the first
    /// occurrence stays resolvable.
    #[must_use]
    pub fn build(script: &Script) -> Self {
        let mut index = Self::default();
        for (position, command) in script.commands.iter().enumerate() {
            if let Some(label) = &command.label {
                match index.positions.get(label) {
                    Some(&first) => index.duplicates.push(DuplicateLabel {
                        label: label.clone(),
                        first,
                        duplicate: position,
                    }),
                    None => {
                        index.positions.insert(label.clone(), position);
                        index.definitions.push((label.clone(), position));
                    }
                }
            }
            for (kind, label) in command.references() {
                index.references.push(LabelReference {
                    label: label.to_owned(),
                    from: position,
                    kind,
                });
            }
        }
        index
    }

    /// Resolves `label` to a position.
    #[must_use]
    pub fn resolve(&self, label: &str) -> Resolution {
        self.positions
            .get(label)
            .map_or(Resolution::NotFound, |&position| Resolution::Found(position))
    }

    /// Winning label definitions in script order.
    #[must_use]
    pub fn definitions(&self) -> &[(String, usize)] {
        &self.definitions
    }

    /// Labels defined more than once.
    #[must_use]
    pub fn duplicates(&self) -> &[DuplicateLabel] {
        &self.duplicates
    }

    /// Every label reference in script order.
    #[must_use]
    pub fn references(&self) -> &[LabelReference] {
        &self.references
    }

    /// Positions of the commands referring to `label`.
    pub fn referrers<'a>(&'a self, label: &'a str) -> impl Iterator<Item = usize> + 'a {
        self.references
            .iter()
            .filter(move |r| r.label == label)
            .map(|r| r.from)
    }

    /// Number of distinct labels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns `true` if the script defines no labels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::Command;

    fn labeled(label: &str) -> Command {
        Command {
            label: Some(label.to_owned()),
            text: Some("line".into()),
            ..Command::default()
        }
    }

    fn jump(target: &str) -> Command {
        Command {
            jump: Some(target.to_owned()),
            ..Command::default()
        }
    }

    #[test]
    fn test_build_maps_labels_to_positions() {
        // Arrange
        let script = Script::new("t", vec![labeled("a"), jump("b"), labeled("b")]);

        // Act
        let index = LabelIndex::build(&script);

        // Assert
        assert_eq!(index.resolve("a"), Resolution::Found(0));
        assert_eq!(index.resolve("b"), Resolution::Found(2));
        assert_eq!(index.len(), 2);
        assert!(index.duplicates().is_empty());
    }

    #[test]
    fn test_missing_label_is_not_found() {
        let index = LabelIndex::build(&Script::new("t", vec![labeled("a")]));

        assert_eq!(index.resolve("nope"), Resolution::NotFound);
        assert_eq!(index.resolve("nope").position(), None);
    }

    #[test]
    fn test_duplicate_label_reports_both_positions_and_keeps_first() {
        // Arrange
        let script = Script::new("t", vec![labeled("a"), labeled("x"), labeled("a")]);

        // Act
        let index = LabelIndex::build(&script);

        // Assert
        assert_eq!(index.resolve("a"), Resolution::Found(0));
        assert_eq!(
            index.duplicates(),
            &[DuplicateLabel {
                label: "a".to_owned(),
                first: 0,
                duplicate: 2,
            }]
        );
        assert_eq!(index.definitions().len(), 2);
    }

    #[test]
    fn test_references_are_recorded_with_origin() {
        let script = Script::new("t", vec![jump("b"), labeled("b"), jump("b")]);

        let index = LabelIndex::build(&script);

        assert_eq!(index.referrers("b").collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(index.references()[0].kind, ReferenceKind::Jump);
    }
}
