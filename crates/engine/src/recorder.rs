//! Capture and replay of population snapshots.
//!
//! One buffer serves both modes, which are mutually exclusive: capture
//! appends a frame per live tick, playback consumes frames sequentially and
//! never rewinds. Frames hold agent fields only, no epoch bookkeeping.

use serde::{Deserialize, Serialize};

use crate::agent::Agent;

/// One recorded tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub agents: Vec<Agent>,
}

#[derive(Debug, Default)]
pub struct Recorder {
    frames: Vec<Frame>,
    capturing: bool,
    /// `Some(next frame index)` while playback is active.
    cursor: Option<usize>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_capturing(&self) -> bool {
        self.capturing
    }

    pub fn is_playing(&self) -> bool {
        self.cursor.is_some()
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Begin capturing, discarding any prior buffer. Refused (returns
    /// `false`) while playback is active.
    pub fn begin_capture(&mut self) -> bool {
        if self.cursor.is_some() {
            return false;
        }
        self.frames.clear();
        self.capturing = true;
        true
    }

    pub fn end_capture(&mut self) {
        self.capturing = false;
    }

    /// Append the tick's post-update population, if capturing.
    pub fn capture(&mut self, agents: &[Agent]) {
        if self.capturing {
            self.frames.push(Frame {
                agents: agents.to_vec(),
            });
        }
    }

    /// Replace the buffer unconditionally. Any playback in progress is
    /// abandoned since its cursor no longer refers to these frames.
    pub fn load(&mut self, frames: Vec<Frame>) {
        self.frames = frames;
        self.cursor = None;
    }

    /// Enter playback mode at frame zero. A no-op (returns `false`) when the
    /// buffer is empty; otherwise capture mode ends.
    pub fn begin_playback(&mut self) -> bool {
        if self.frames.is_empty() {
            return false;
        }
        self.capturing = false;
        self.cursor = Some(0);
        true
    }

    pub fn end_playback(&mut self) {
        self.cursor = None;
    }

    /// Yield the next frame and advance, or `None` once the buffer is
    /// exhausted (which also exits playback mode).
    pub fn next_frame(&mut self) -> Option<Frame> {
        let index = self.cursor?;
        match self.frames.get(index) {
            Some(frame) => {
                self.cursor = Some(index + 1);
                Some(frame.clone())
            }
            None => {
                self.cursor = None;
                None
            }
        }
    }

    /// Drop everything: buffer, capture flag, playback cursor.
    pub fn clear(&mut self) {
        self.frames.clear();
        self.capturing = false;
        self.cursor = None;
    }
}
