//! Animated busy bar shown while a batch of remote calls runs.
//!
//! Frames are rewritten in place with backspaces, so the indicator only
//! makes sense on an interactive terminal; [`Progress::clear`] erases the
//! message and frame before normal output resumes.

use std::io::{self, Write};

const FRAMES: [&str; 20] = [
    "▓-----",
    "▓▓----",
    "▓▓▓---",
    "▓▓▓▓--",
    "▓▓▓▓▓-",
    "▓▓▓▓▓▓",
    "-▓▓▓▓▓",
    "--▓▓▓▓",
    "---▓▓▓",
    "----▓▓",
    "-----▓",
    "----▓▓",
    "---▓▓▓",
    "--▓▓▓▓",
    "-▓▓▓▓▓",
    "▓▓▓▓▓▓",
    "▓▓▓▓▓-",
    "▓▓▓▓--",
    "▓▓▓---",
    "▓▓----",
];

pub struct Progress {
    msg_len: usize,
    ticks: usize,
}

impl Progress {
    /// Prints `msg` and returns an indicator ready to bump.
    pub fn start(msg: &str) -> Progress {
        print!("{msg}");
        flush();
        Progress {
            msg_len: msg.chars().count(),
            ticks: 0,
        }
    }

    /// Advances the animation by one frame, rewriting the previous one.
    pub fn bump(&mut self) {
        let frame = self.frame();
        if self.ticks >= 1 {
            print!("{}", "\u{8}".repeat(frame.chars().count()));
        }
        print!("{frame}");
        flush();
        self.ticks += 1;
    }

    /// Erases the message and the current frame.
    pub fn clear(&mut self) {
        let erase_len = self.frame().chars().count() + self.msg_len;
        print!("{}", "\u{8} \u{8}".repeat(erase_len));
        flush();
    }

    fn frame(&self) -> &'static str {
        FRAMES[self.ticks % FRAMES.len()]
    }
}

fn flush() {
    let _ = io::stdout().flush();
}
