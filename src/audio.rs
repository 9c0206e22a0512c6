//! Fire-and-forget sound cues.
//!
//! The engine only reports which cue an event triggers; playing it is the
//! job of an [`AudioSink`]. The terminal sink rings the bell, with a
//! different number of rings per cue.
use std::io::Write;

use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCue {
    Eat,
    PowerUp,
    GameOver,
}

impl SoundCue {
    fn bells(&self) -> usize {
        match self {
            SoundCue::Eat => 1,
            SoundCue::PowerUp => 2,
            SoundCue::GameOver => 3,
        }
    }
}

/// Anything that can play a cue. Failures are swallowed.
pub trait AudioSink {
    fn play(&mut self, cue: SoundCue);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AudioState {
    Enabled,
    Muted,
}

/// Plays cues by writing BEL characters to a terminal stream
pub struct TerminalAudio<W: Write> {
    out: W,
    state: AudioState,
}

impl TerminalAudio<std::io::Stderr> {
    pub fn new(muted: bool) -> Self {
        Self::with_writer(std::io::stderr(), muted)
    }
}

impl<W: Write> TerminalAudio<W> {
    pub fn with_writer(out: W, muted: bool) -> Self {
        Self {
            out,
            state: if muted {
                AudioState::Muted
            } else {
                AudioState::Enabled
            },
        }
    }

    pub fn toggle_mute(&mut self) {
        self.state = match self.state {
            AudioState::Enabled => AudioState::Muted,
            AudioState::Muted => AudioState::Enabled,
        };
    }

    pub fn is_muted(&self) -> bool {
        self.state == AudioState::Muted
    }
}

impl<W: Write> AudioSink for TerminalAudio<W> {
    fn play(&mut self, cue: SoundCue) {
        trace!(?cue, muted = self.is_muted(), "Sound cue");
        if self.is_muted() {
            return;
        }

        let bells = "\x07".repeat(cue.bells());
        // A missed bell is not worth interrupting the game for
        let _ = self
            .out
            .write_all(bells.as_bytes())
            .and_then(|_| self.out.flush());
    }
}
