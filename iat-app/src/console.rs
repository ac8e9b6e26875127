//! Text-only frontend: everything the participant would see is printed, and
//! key presses are read as key names, one per line.

use std::io::{BufRead, Write};
use std::time::Duration;

use iat_core::{AnchorSet, Key, Stimulus};
use iat_experiment::{Instruction, KeySource, MetadataPrompt, Screen, SessionInfo};

pub struct ConsoleScreen<W> {
    out: W,
}

impl<W: Write> ConsoleScreen<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    fn line(&mut self, text: std::fmt::Arguments<'_>) {
        if let Err(err) = writeln!(self.out, "{text}").and_then(|()| self.out.flush()) {
            tracing::warn!(error = %err, "Console write failed");
        }
    }
}

impl<W: Write> Screen for ConsoleScreen<W> {
    fn show_instruction(&mut self, instruction: &Instruction) {
        match instruction {
            Instruction::Text(text) => self.line(format_args!("\n{text}\n")),
            Instruction::Image(path) => self.line(format_args!("\n[instruction: {}]\n", path.display())),
        }
    }

    fn show_stimulus(&mut self, stimulus: &Stimulus) {
        match stimulus.image_path() {
            Some(path) => self.line(format_args!("  [image: {}]", path.display())),
            None => self.line(format_args!("  {}", stimulus.content)),
        }
    }

    fn show_feedback(&mut self) {
        self.line(format_args!("  X"));
    }

    fn show_fixation(&mut self) {
        self.line(format_args!("  +"));
    }

    fn set_anchors(&mut self, anchors: &AnchorSet, visible: bool) {
        if !visible {
            return;
        }
        let side = |left: bool| {
            anchors
                .iter()
                .filter(|a| a.position.is_left() == left)
                .map(|a| &*a.label)
                .collect::<Vec<_>>()
                .join(" / ")
        };
        let (left, right) = (side(true), side(false));
        self.line(format_args!("{left:<30}{right:>30}"));
    }
}

/// Reads key names from `input`. Unknown names are ignored; end of input is
/// reported as the abort key. The console cannot time out, so `max_wait` is
/// not honoured.
pub struct ConsoleKeys<R> {
    input: R,
    abort_key: Key,
}

impl<R: BufRead> ConsoleKeys<R> {
    pub fn new(input: R, abort_key: Key) -> Self {
        Self { input, abort_key }
    }
}

impl<R: BufRead> KeySource for ConsoleKeys<R> {
    fn wait_keys(&mut self, allowed: &[Key], _max_wait: Option<Duration>) -> Option<Vec<Key>> {
        let mut line = String::new();
        loop {
            line.clear();
            match self.input.read_line(&mut line) {
                Ok(0) | Err(_) => return Some(vec![self.abort_key.clone()]),
                Ok(_) => {}
            }
            let name = line.trim();
            if let Some(key) = allowed.iter().find(|k| &***k == name) {
                return Some(vec![key.clone()]);
            }
            tracing::trace!(key = name, "Ignored key");
        }
    }
}

/// Asks for whatever metadata was not given up front.
pub struct ConsolePrompt<R, W> {
    input: R,
    out: W,
    id: Option<String>,
    condition: Option<String>,
}

impl<R: BufRead, W: Write> ConsolePrompt<R, W> {
    pub fn new(input: R, out: W) -> Self {
        Self {
            input,
            out,
            id: None,
            condition: None,
        }
    }

    pub fn with_presets(mut self, id: Option<String>, condition: Option<String>) -> Self {
        self.id = id;
        self.condition = condition;
        self
    }

    /// `None` on an empty answer or end of input.
    fn ask(&mut self, question: &str) -> Option<String> {
        write!(self.out, "{question}: ").ok()?;
        self.out.flush().ok()?;
        let mut answer = String::new();
        match self.input.read_line(&mut answer) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(answer.trim().to_string()).filter(|a| !a.is_empty()),
        }
    }
}

impl<R: BufRead, W: Write> MetadataPrompt for ConsolePrompt<R, W> {
    fn capture(&mut self, title: &str, conditions: &[String]) -> Option<SessionInfo> {
        writeln!(self.out, "=== {title} ===").ok()?;
        let id = match self.id.take() {
            Some(id) => id,
            None => self.ask("ID")?,
        };
        let condition = match self.condition.take() {
            Some(c) => c,
            None => self.ask(&format!("Condition [{}]", conditions.join("/")))?,
        };
        Some(SessionInfo::new(id, condition))
    }
}
