//! The playback session aggregate.

use std::fmt;
use std::sync::Arc;

use storyloom_core::clock::Clock;
use storyloom_core::event::EventMetadata;
use storyloom_core::label::{LabelIndex, Resolution};
use storyloom_core::localized::LocalizedString;
use storyloom_core::script::{Choice, Command, Presentation, Script};
use storyloom_core::value::{Value, Variables};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::actions::PlaybackAction;
use super::error::PlaybackError;
use super::events::{
    Advanced, ChoiceSelected, Ended, InputSubmitted, Jumped, MediaFinished, ModeChanged,
    PlaybackEvent, PlaybackEventKind, RolledBack, Started, VariableSet,
};
use super::history::{BacklogEntry, HistoryEntry};
use super::projection::{ChoiceView, Display, EndReason, Projection, StateKind};
use super::schedule::{PlaybackMode, TimerKind, TimerRequest, TimerToken, seconds};
use crate::config::PlaybackConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Cursor {
    At(usize),
    Ended(EndReason),
}

/// Where control goes when a command is left.
enum Flow {
    To(usize),
    Unresolved(String),
}

/// One interactive playtest of a script.
///
/// The session owns its cursor, variables and history; the script is shared
/// read-only with the caller. Every method takes `&mut self`, so two
/// transitions can never interleave. Illegal actions are rejected with a
/// `PlaybackError` and leave the session untouched; broken content ends
/// playback instead of failing.
pub struct PlaybackSession {
    id: Uuid,
    script: Arc<Script>,
    index: LabelIndex,
    config: PlaybackConfig,
    clock: Arc<dyn Clock>,
    cursor: Cursor,
    variables: Variables,
    history: Vec<HistoryEntry>,
    effects: Presentation,
    mode: PlaybackMode,
    generation: u64,
    sequence: u64,
    uncommitted_events: Vec<PlaybackEvent>,
}

impl fmt::Debug for PlaybackSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaybackSession")
            .field("id", &self.id)
            .field("title", &self.script.title)
            .field("cursor", &self.cursor)
            .field("variables", &self.variables)
            .field("history_len", &self.history.len())
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl PlaybackSession {
    /// Starts a session at the top of `script`.
    #[must_use]
    pub fn start(script: Arc<Script>, config: PlaybackConfig, clock: Arc<dyn Clock>) -> Self {
        let index = LabelIndex::build(&script);
        let mut session = Self {
            id: Uuid::new_v4(),
            script,
            index,
            config,
            clock,
            cursor: Cursor::At(0),
            variables: Variables::new(),
            history: Vec::new(),
            effects: Presentation::default(),
            mode: PlaybackMode::Manual,
            generation: 0,
            sequence: 0,
            uncommitted_events: Vec::new(),
        };

        info!(session_id = %session.id, title = %session.script.title, "playtest started");
        session.record_event(PlaybackEventKind::Started(Started {
            title: session.script.title.clone(),
            command_count: session.script.len(),
        }));
        session.enter(0);
        session.after_transition();
        session
    }

    /// Session identifier.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The script being played.
    #[must_use]
    pub fn script(&self) -> &Script {
        &self.script
    }

    /// Position of the command on screen, or `None` once ended.
    #[must_use]
    pub fn position(&self) -> Option<usize> {
        match self.cursor {
            Cursor::At(position) => Some(position),
            Cursor::Ended(_) => None,
        }
    }

    /// Current variables.
    #[must_use]
    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    /// Current value of one variable.
    #[must_use]
    pub fn variable(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    /// Current playback mode.
    #[must_use]
    pub fn mode(&self) -> PlaybackMode {
        self.mode
    }

    /// Returns `true` if there is a step to roll back to.
    #[must_use]
    pub fn can_rollback(&self) -> bool {
        !self.history.is_empty()
    }

    /// Number of recorded history entries.
    #[must_use]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Returns `true` once playback has ended.
    #[must_use]
    pub fn is_ended(&self) -> bool {
        self.state() == StateKind::End
    }

    fn current(&self) -> Option<(usize, &Command)> {
        match self.cursor {
            Cursor::At(position) => self.script.get(position).map(|c| (position, c)),
            Cursor::Ended(_) => None,
        }
    }

    /// The current state, derived from the command under the cursor.
    #[must_use]
    pub fn state(&self) -> StateKind {
        self.current()
            .map_or(StateKind::End, |(_, command)| self.state_of(command))
    }

    /// The state a command puts the session in while the cursor rests on it.
    ///
    /// Must agree with the order of checks in `display`.
    fn state_of(&self, command: &Command) -> StateKind {
        if command.video.is_some() {
            StateKind::Video
        } else if command.input.is_some() {
            StateKind::Input
        } else if self.offered_choices(command).is_some() {
            StateKind::Choices
        } else if command.wait.is_some() {
            StateKind::Wait
        } else {
            StateKind::Text
        }
    }

    /// Returns `true` if the command's `if` holds for the current variables.
    fn condition_holds(&self, command: &Command) -> bool {
        command
            .condition
            .as_ref()
            .is_some_and(|condition| self.variables.get(&condition.var) == Some(&condition.is))
    }

    /// The choices that govern control flow right now.
    ///
    /// `jump` and a holding `if` both outrank `choices`, so a command whose
    /// condition holds offers nothing and branches on departure instead.
    fn offered_choices<'c>(&self, command: &'c Command) -> Option<&'c [Choice]> {
        if self.condition_holds(command) {
            return None;
        }
        command.primary_choices()
    }

    /// Returns `true` if playback stops on this command.
    fn suspends(&self, command: &Command) -> bool {
        command.has_text()
            || self.offered_choices(command).is_some()
            || command.input.is_some()
            || command.video.is_some()
            || command.wait.is_some()
    }

    fn localize(&self, text: Option<&LocalizedString>) -> Option<String> {
        text.and_then(|t| {
            t.resolve(
                self.config.language.as_deref(),
                &self.config.fallback_language,
            )
        })
        .map(str::to_owned)
    }

    fn choice_views(&self, choices: &[Choice]) -> Vec<ChoiceView> {
        choices
            .iter()
            .enumerate()
            .filter(|(_, choice)| self.index.resolve(&choice.jump) != Resolution::NotFound)
            .map(|(index, choice)| ChoiceView {
                index,
                label: self.localize(Some(&choice.label)).unwrap_or_default(),
                is_default: choice.is_default.unwrap_or(false),
            })
            .collect()
    }

    /// Choices currently offered, or an empty list outside the choices state.
    #[must_use]
    pub fn choices(&self) -> Vec<ChoiceView> {
        self.current()
            .and_then(|(_, command)| self.offered_choices(command))
            .map(|choices| self.choice_views(choices))
            .unwrap_or_default()
    }

    /// What to render for the current state.
    #[must_use]
    pub fn display(&self) -> Display {
        let Some((_, command)) = self.current() else {
            let reason = match &self.cursor {
                Cursor::Ended(reason) => reason.clone(),
                Cursor::At(_) => EndReason::Finished,
            };
            return Display::End {
                is_error: reason.is_error(),
                reason,
            };
        };

        let speaker = self.localize(command.speaker.as_ref());
        let text = self.localize(command.text.as_ref());

        if let Some(video) = &command.video {
            return Display::Video {
                path: video.path.clone(),
                skippable: video.skippable,
                looping: video.looping,
            };
        }
        if let Some(input) = &command.input {
            return Display::Input {
                speaker,
                text,
                prompt: self.localize(input.prompt.as_ref()),
                default_value: input.default_value.clone(),
            };
        }
        if let Some(choices) = self.offered_choices(command) {
            return Display::Choices {
                speaker,
                text,
                choices: self.choice_views(choices),
            };
        }
        if let Some(duration_secs) = command.wait {
            return Display::Wait {
                speaker,
                text,
                duration_secs,
            };
        }
        Display::Text { speaker, text }
    }

    /// The full renderer-facing view.
    #[must_use]
    pub fn projection(&self) -> Projection {
        Projection {
            display: self.display(),
            effects: self.effects.clone(),
            mode: self.mode,
            can_rollback: self.can_rollback(),
            is_ended: self.is_ended(),
            history_count: self.history.len(),
        }
    }

    /// Lines the player has already read, oldest first.
    #[must_use]
    pub fn backlog(&self) -> Vec<BacklogEntry> {
        self.history
            .iter()
            .filter_map(HistoryEntry::backlog_entry)
            .collect()
    }

    // ------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------

    fn require(&self, expected: StateKind, action: &'static str) -> Result<usize, PlaybackError> {
        let state = self.state();
        if state == StateKind::End {
            return Err(PlaybackError::SessionEnded);
        }
        if state != expected {
            return Err(PlaybackError::IllegalAction { action, state });
        }
        self.position().ok_or(PlaybackError::SessionEnded)
    }

    /// Moves past the current text step.
    ///
    /// The command's `set` takes effect on departure, then branching fields
    /// are evaluated in priority order: `jump`, then `if`, then the next
    /// position.
    ///
    /// # Errors
    ///
    /// Returns `PlaybackError` if the session is not showing text.
    pub fn advance(&mut self) -> Result<(), PlaybackError> {
        let from = self.require(StateKind::Text, "advance")?;
        self.leave();
        self.apply_set(from);
        let flow = self.departure(from);
        self.record_event(PlaybackEventKind::Advanced(Advanced { from }));
        self.follow(flow);
        debug!(session_id = %self.id, from, to = ?self.position(), "advanced");
        self.after_transition();
        Ok(())
    }

    /// Picks the choice at `index` in the command's choice list.
    ///
    /// A choice whose target does not exist ends playback.
    ///
    /// # Errors
    ///
    /// Returns `PlaybackError` if no choice is on offer or `index` is out of
    /// range.
    pub fn select_choice(&mut self, index: usize) -> Result<(), PlaybackError> {
        let from = self.require(StateKind::Choices, "select a choice")?;
        let script = Arc::clone(&self.script);
        let choices = self
            .offered_choices(&script.commands[from])
            .unwrap_or_default();
        let Some(choice) = choices.get(index) else {
            return Err(PlaybackError::ChoiceOutOfRange {
                index,
                count: choices.len(),
            });
        };

        let flow = self.resolve(&choice.jump);
        self.leave();
        self.apply_set(from);
        self.record_event(PlaybackEventKind::ChoiceSelected(ChoiceSelected {
            from,
            index,
            target: choice.jump.clone(),
        }));
        self.follow(flow);
        debug!(session_id = %self.id, from, index, "choice selected");
        self.after_transition();
        Ok(())
    }

    /// Stores `value` into the input variable and moves on.
    ///
    /// # Errors
    ///
    /// Returns `PlaybackError` if the session is not waiting for input.
    pub fn submit_input(&mut self, value: impl Into<String>) -> Result<(), PlaybackError> {
        let from = self.require(StateKind::Input, "submit input")?;
        let Some(var) = self.script.commands[from]
            .input
            .as_ref()
            .map(|input| input.var.clone())
        else {
            return Err(PlaybackError::IllegalAction {
                action: "submit input",
                state: self.state(),
            });
        };
        let value = value.into();

        self.leave();
        self.apply_set(from);
        self.variables
            .insert(var.clone(), Value::String(value.clone()));
        let flow = self.departure(from);
        self.record_event(PlaybackEventKind::InputSubmitted(InputSubmitted { var, value }));
        self.follow(flow);
        self.after_transition();
        Ok(())
    }

    /// Skips the current wait, or the current video if it is skippable.
    ///
    /// # Errors
    ///
    /// Returns `PlaybackError` outside the wait and video states, or for a
    /// video that cannot be skipped.
    pub fn skip_media(&mut self) -> Result<(), PlaybackError> {
        match self.state() {
            StateKind::Wait => self.finish_media(true),
            StateKind::Video => {
                let skippable = self
                    .current()
                    .and_then(|(_, command)| command.video.as_ref())
                    .is_some_and(|video| video.skippable);
                if !skippable {
                    return Err(PlaybackError::NotSkippable);
                }
                self.finish_media(true)
            }
            StateKind::End => Err(PlaybackError::SessionEnded),
            state => Err(PlaybackError::IllegalAction {
                action: "skip",
                state,
            }),
        }
    }

    /// Reports that the current video played to its natural end.
    ///
    /// # Errors
    ///
    /// Returns `PlaybackError` outside the video state, or for a looping
    /// video, which only ends by being skipped.
    pub fn complete_video(&mut self) -> Result<(), PlaybackError> {
        self.require(StateKind::Video, "complete a video")?;
        let looping = self
            .current()
            .and_then(|(_, command)| command.video.as_ref())
            .is_some_and(|video| video.looping);
        if looping {
            return Err(PlaybackError::LoopingVideo);
        }
        self.finish_media(false)
    }

    fn finish_media(&mut self, skipped: bool) -> Result<(), PlaybackError> {
        let from = self.position().ok_or(PlaybackError::SessionEnded)?;
        self.leave();
        self.apply_set(from);
        let flow = self.departure(from);
        self.record_event(PlaybackEventKind::MediaFinished(MediaFinished { from, skipped }));
        self.follow(flow);
        self.after_transition();
        Ok(())
    }

    /// Returns to the previous displayed step.
    ///
    /// # Errors
    ///
    /// Returns `PlaybackError::NothingToRollback` if history is empty.
    pub fn rollback(&mut self) -> Result<(), PlaybackError> {
        self.rollback_steps(1).map(|_| ())
    }

    /// Removes the last `steps` history entries and restores the oldest of
    /// them: its position, its variables and its effects. Returns the number
    /// of steps actually rolled back, which is capped at the history length.
    ///
    /// Rolling back also works from the end state.
    ///
    /// # Errors
    ///
    /// Returns `PlaybackError::NothingToRollback` if history is empty.
    pub fn rollback_steps(&mut self, steps: usize) -> Result<usize, PlaybackError> {
        if self.history.is_empty() {
            return Err(PlaybackError::NothingToRollback);
        }
        if steps == 0 {
            return Ok(0);
        }

        let steps = steps.min(self.history.len());
        let keep = self.history.len() - steps;
        let Some(entry) = self.history.drain(keep..).next() else {
            return Err(PlaybackError::NothingToRollback);
        };

        self.cursor = Cursor::At(entry.position);
        self.variables = entry.variables;
        self.effects = entry.effects;
        if self.mode == PlaybackMode::Skip {
            self.change_mode(PlaybackMode::Manual);
        }
        self.record_event(PlaybackEventKind::RolledBack(RolledBack {
            steps,
            to: entry.position,
        }));
        debug!(session_id = %self.id, steps, to = entry.position, "rolled back");
        self.after_transition();
        Ok(steps)
    }

    /// Starts over from the first command with no variables, no history and
    /// manual mode.
    pub fn restart(&mut self) {
        self.history.clear();
        self.variables.clear();
        self.effects = Presentation::default();
        self.change_mode(PlaybackMode::Manual);
        self.record_event(PlaybackEventKind::Restarted);
        info!(session_id = %self.id, "playtest restarted");
        self.enter(0);
        self.after_transition();
    }

    /// Debug operation: moves the cursor to `label`, bypassing the normal
    /// transitions. The departed step is still recorded so rollback can
    /// return to it; its `set` is not applied.
    ///
    /// # Errors
    ///
    /// Returns `PlaybackError::SessionEnded` once playback has ended and
    /// `PlaybackError::UnknownLabel` if the label does not exist.
    pub fn jump_to_label(&mut self, label: &str) -> Result<(), PlaybackError> {
        if self.is_ended() {
            return Err(PlaybackError::SessionEnded);
        }
        let Resolution::Found(target) = self.index.resolve(label) else {
            return Err(PlaybackError::UnknownLabel(label.to_owned()));
        };

        self.leave();
        if self.mode == PlaybackMode::Skip {
            self.change_mode(PlaybackMode::Manual);
        }
        self.record_event(PlaybackEventKind::Jumped(Jumped {
            label: label.to_owned(),
        }));
        self.enter(target);
        self.after_transition();
        Ok(())
    }

    /// Debug operation: assigns a variable. The previous values are recorded
    /// in history so rollback undoes the assignment.
    ///
    /// # Errors
    ///
    /// Returns `PlaybackError::SessionEnded` once playback has ended, since
    /// the end state has no step to record.
    pub fn set_variable(
        &mut self,
        name: impl Into<String>,
        value: Value,
    ) -> Result<(), PlaybackError> {
        if self.is_ended() {
            return Err(PlaybackError::SessionEnded);
        }
        let name = name.into();
        self.record_history();
        self.variables.insert(name.clone(), value.clone());
        self.record_event(PlaybackEventKind::VariableSet(VariableSet { name, value }));
        self.after_transition();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Modes and timers
    // ------------------------------------------------------------------

    /// Switches playback mode and returns the mode now in effect.
    ///
    /// Auto and skip are exclusive. Skip mode only runs over text, so
    /// enabling it anywhere else leaves the session in manual mode.
    pub fn set_mode(&mut self, mode: PlaybackMode) -> PlaybackMode {
        self.change_mode(mode);
        self.after_transition();
        self.mode
    }

    /// Toggles auto mode.
    pub fn toggle_auto(&mut self) -> PlaybackMode {
        let mode = if self.mode == PlaybackMode::Auto {
            PlaybackMode::Manual
        } else {
            PlaybackMode::Auto
        };
        self.set_mode(mode)
    }

    /// Toggles skip mode.
    pub fn toggle_skip(&mut self) -> PlaybackMode {
        let mode = if self.mode == PlaybackMode::Skip {
            PlaybackMode::Manual
        } else {
            PlaybackMode::Skip
        };
        self.set_mode(mode)
    }

    /// The one timer the host should have scheduled right now, if any.
    ///
    /// - wait state: the command's wait duration, in every mode
    /// - text state in auto mode: the reading delay
    /// - text state in skip mode: the skip tick
    #[must_use]
    pub fn pending_timer(&self) -> Option<TimerRequest> {
        let (_, command) = self.current()?;
        let (kind, delay) = match (self.state_of(command), self.mode) {
            (StateKind::Wait, _) => (
                TimerKind::Wait,
                seconds(command.wait.unwrap_or_default()),
            ),
            (StateKind::Text, PlaybackMode::Auto) => {
                let chars = self
                    .localize(command.text.as_ref())
                    .map_or(0, |text| text.chars().count());
                (TimerKind::Auto, self.config.auto_delay(chars))
            }
            (StateKind::Text, PlaybackMode::Skip) => (TimerKind::Skip, self.config.skip_tick()),
            _ => return None,
        };
        Some(TimerRequest {
            token: TimerToken {
                generation: self.generation,
                kind,
            },
            delay,
        })
    }

    /// Called by the host when a scheduled timer elapses.
    ///
    /// Returns `false` and does nothing if the token is stale, i.e. the
    /// session changed since the timer was requested.
    pub fn fire_timer(&mut self, token: TimerToken) -> bool {
        if self.pending_timer().map(|request| request.token) != Some(token) {
            debug!(session_id = %self.id, ?token, "ignoring stale timer");
            return false;
        }
        let result = match token.kind {
            TimerKind::Wait => self.finish_media(false),
            TimerKind::Auto | TimerKind::Skip => self.advance(),
        };
        result.is_ok()
    }

    /// Applies an abstract action from an input layer.
    ///
    /// # Errors
    ///
    /// Returns whatever the underlying operation rejects with.
    pub fn dispatch(&mut self, action: PlaybackAction) -> Result<(), PlaybackError> {
        match action {
            PlaybackAction::Advance => self.advance(),
            PlaybackAction::Rollback => self.rollback(),
            PlaybackAction::ToggleAuto => {
                self.toggle_auto();
                Ok(())
            }
            PlaybackAction::ToggleSkip => {
                self.toggle_skip();
                Ok(())
            }
            PlaybackAction::SkipMedia => self.skip_media(),
            PlaybackAction::Restart => {
                self.restart();
                Ok(())
            }
            PlaybackAction::SelectChoice(ordinal) => {
                self.require(StateKind::Choices, "select a choice")?;
                let visible = self.choices();
                let index = visible
                    .get(ordinal)
                    .map(|choice| choice.index)
                    .ok_or(PlaybackError::ChoiceOutOfRange {
                        index: ordinal,
                        count: visible.len(),
                    })?;
                self.select_choice(index)
            }
        }
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    /// Events recorded since the last `take_events`.
    #[must_use]
    pub fn uncommitted_events(&self) -> &[PlaybackEvent] {
        &self.uncommitted_events
    }

    /// Drains recorded events.
    pub fn take_events(&mut self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut self.uncommitted_events)
    }

    /// Records that the host is discarding this session.
    pub fn stop(&mut self) {
        self.record_event(PlaybackEventKind::Stopped);
        info!(session_id = %self.id, "playtest stopped");
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn resolve(&self, label: &str) -> Flow {
        match self.index.resolve(label) {
            Resolution::Found(position) => Flow::To(position),
            Resolution::NotFound => Flow::Unresolved(label.to_owned()),
        }
    }

    /// Where control goes when leaving the command at `from`.
    fn departure(&self, from: usize) -> Flow {
        let Some(command) = self.script.get(from) else {
            return Flow::To(from + 1);
        };
        if let Some(target) = &command.jump {
            return self.resolve(target);
        }
        if let Some(condition) = &command.condition {
            if self.condition_holds(command) {
                return self.resolve(&condition.jump);
            }
            if let Some(value) = self.variables.get(&condition.var) {
                if value.type_name() != condition.is.type_name() {
                    debug!(
                        session_id = %self.id,
                        var = %condition.var,
                        expected = condition.is.type_name(),
                        found = value.type_name(),
                        "condition compares values of different types; not taken"
                    );
                }
            }
        }
        Flow::To(from + 1)
    }

    fn follow(&mut self, flow: Flow) {
        match flow {
            Flow::To(position) => self.enter(position),
            Flow::Unresolved(label) => {
                warn!(session_id = %self.id, %label, "jump target does not exist; ending playback");
                self.end(EndReason::UnresolvedJump { label });
            }
        }
    }

    /// Moves the cursor to `target`, running any commands that neither
    /// display nor suspend until one that does is reached.
    ///
    /// Pass-through commands apply their `set` here. A suspending command
    /// applies it when the player leaves it.
    fn enter(&mut self, target: usize) {
        let script = Arc::clone(&self.script);
        let mut position = target;
        let mut steps = 0usize;
        loop {
            let Some(command) = script.get(position) else {
                self.end(EndReason::Finished);
                return;
            };

            self.effects.merge(&command.presentation);
            if self.suspends(command) {
                self.cursor = Cursor::At(position);
                return;
            }
            self.apply_set(position);

            steps += 1;
            if steps > self.config.max_settle_steps {
                warn!(session_id = %self.id, position, "commands loop without displaying; ending playback");
                self.end(EndReason::RunawayLoop);
                return;
            }

            match self.departure(position) {
                Flow::To(next) => position = next,
                Flow::Unresolved(label) => {
                    warn!(session_id = %self.id, %label, "jump target does not exist; ending playback");
                    self.end(EndReason::UnresolvedJump { label });
                    return;
                }
            }
        }
    }

    fn apply_set(&mut self, position: usize) {
        let script = Arc::clone(&self.script);
        if let Some(set) = script.get(position).and_then(|command| command.set.as_ref()) {
            self.variables.insert(set.name.clone(), set.value.clone());
        }
    }

    fn end(&mut self, reason: EndReason) {
        info!(session_id = %self.id, ?reason, "playtest ended");
        self.cursor = Cursor::Ended(reason.clone());
        self.record_event(PlaybackEventKind::Ended(Ended { reason }));
    }

    /// Records the step on screen, then clears the effects that belonged
    /// to it.
    fn leave(&mut self) {
        self.record_history();
        self.effects = Presentation::default();
    }

    fn record_history(&mut self) {
        let Cursor::At(position) = self.cursor else {
            return;
        };
        let entry = HistoryEntry {
            position,
            variables: self.variables.clone(),
            effects: self.effects.clone(),
            display: self.display(),
            recorded_at: self.clock.now(),
        };
        self.history.push(entry);
    }

    fn change_mode(&mut self, mode: PlaybackMode) {
        if self.mode != mode {
            self.mode = mode;
            self.record_event(PlaybackEventKind::ModeChanged(ModeChanged { mode }));
        }
    }

    /// Invalidates outstanding timer tokens and drops skip mode once the
    /// session leaves text.
    fn after_transition(&mut self) {
        self.generation += 1;
        if self.mode == PlaybackMode::Skip && self.state() != StateKind::Text {
            self.change_mode(PlaybackMode::Manual);
        }
    }

    fn record_event(&mut self, kind: PlaybackEventKind) {
        self.sequence += 1;
        let event = PlaybackEvent {
            metadata: EventMetadata {
                event_id: Uuid::new_v4(),
                event_type: kind.event_type().to_owned(),
                session_id: self.id,
                sequence_number: self.sequence,
                occurred_at: self.clock.now(),
            },
            kind,
        };
        self.uncommitted_events.push(event);
    }
}
