//! Seams to the presentation layer. The engine never draws or polls input
//! itself; it drives these traits in a single linear control flow.

use std::time::Duration;

use iat_core::{AnchorSet, Key, Stimulus};

use crate::instruction::Instruction;
use crate::session::SessionInfo;

/// Something that can put things on the participant's screen.
pub trait Screen {
    fn show_instruction(&mut self, instruction: &Instruction);
    fn show_stimulus(&mut self, stimulus: &Stimulus);
    /// The error mark shown after a wrong first answer.
    fn show_feedback(&mut self);
    /// The fixation cross shown during the inter-stimulus interval.
    fn show_fixation(&mut self);
    /// Turns the category reminders of a block on or off.
    fn set_anchors(&mut self, anchors: &AnchorSet, visible: bool);
}

/// Blocking keyboard input.
pub trait KeySource {
    /// Waits until one of `allowed` is pressed and returns the pressed keys.
    /// Returns `None` when `max_wait` elapses first.
    fn wait_keys(&mut self, allowed: &[Key], max_wait: Option<Duration>) -> Option<Vec<Key>>;
}

/// One-off capture of participant metadata before anything runs.
pub trait MetadataPrompt {
    /// `None` means the participant or operator cancelled.
    fn capture(&mut self, title: &str, conditions: &[String]) -> Option<SessionInfo>;
}
