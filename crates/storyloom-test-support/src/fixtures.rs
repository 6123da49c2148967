//! Script fixtures.
//!
//! Scripts are written in the same JSON shape the editor produces so tests
//! read like real content.

use serde_json::json;
use storyloom_core::script::{Command, Script};

/// Parses a script from a JSON value.
///
/// # Panics
///
/// Panics if `value` is not a valid script.
#[must_use]
pub fn script(value: serde_json::Value) -> Script {
    serde_json::from_value(value).expect("fixture must be a valid script")
}

/// Parses a single command from a JSON value.
///
/// # Panics
///
/// Panics if `value` is not a valid command.
#[must_use]
pub fn command(value: serde_json::Value) -> Command {
    serde_json::from_value(value).expect("fixture must be a valid command")
}

/// `[ {label:"a", text:"hi"}, {jump:"missing"} ]`
#[must_use]
pub fn dangling_jump() -> Script {
    script(json!({
        "title": "dangling",
        "script": [
            {"label": "a", "text": "hi"},
            {"jump": "missing"}
        ]
    }))
}

/// A line followed by a two-way choice landing on `"one"` or `"two"`.
#[must_use]
pub fn two_way_choice() -> Script {
    script(json!({
        "title": "choice",
        "script": [
            {"text": "x"},
            {"choices": [
                {"label": "A", "jump": "l1"},
                {"label": "B", "jump": "l2"}
            ]},
            {"label": "l1", "text": "one"},
            {"label": "l2", "text": "two"}
        ]
    }))
}

/// Sets `flag` to `true`, then branches on it to label `L`.
///
/// Playback lands on `"taken"`; the fallthrough line is `"not taken"`.
#[must_use]
pub fn flag_branch() -> Script {
    script(json!({
        "title": "flag",
        "script": [
            {"text": "start", "set": {"name": "flag", "value": true}},
            {"text": "middle"},
            {"if": {"var": "flag", "is": true, "jump": "L"}},
            {"text": "not taken"},
            {"jump": "done"},
            {"label": "L", "text": "taken"},
            {"label": "done", "text": "end"}
        ]
    }))
}

/// `count` plain text lines `"line 0"`, `"line 1"`, …
#[must_use]
pub fn linear(count: usize) -> Script {
    let lines: Vec<_> = (0..count)
        .map(|i| json!({"text": format!("line {i}")}))
        .collect();
    script(json!({"title": "linear", "script": lines}))
}

/// Lines that each set a counter variable, for rollback tests.
#[must_use]
pub fn counting() -> Script {
    script(json!({
        "title": "counting",
        "script": [
            {"text": "zero", "set": {"name": "count", "value": 0}},
            {"text": "one", "set": {"name": "count", "value": 1}},
            {"text": "two", "set": {"name": "count", "value": 2}},
            {"text": "three", "set": {"name": "count", "value": 3}},
            {"text": "four", "set": {"name": "count", "value": 4}}
        ]
    }))
}

/// One command of every suspending kind, in order: text, wait, input,
/// video, choices.
#[must_use]
pub fn every_state() -> Script {
    script(json!({
        "title": "every state",
        "script": [
            {"speaker": "Aki", "text": "hello"},
            {"wait": 1.5},
            {"input": {"var": "name", "prompt": "Your name?", "default": "Sam"}},
            {"video": {"path": "intro.webm", "skippable": true}},
            {"choices": [
                {"label": "Left", "jump": "left"},
                {"label": "Right", "jump": "right", "default": true}
            ]},
            {"label": "left", "text": "went left"},
            {"label": "right", "text": "went right"}
        ]
    }))
}
