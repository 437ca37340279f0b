//! Frame schedule of an animated replay of an activity log.
//!
//! Every entry is shown for a fixed number of frames depending on its tag.
//! The renderer itself lives elsewhere; this module only answers which
//! entry, and which of its frames, a global frame number falls on.

use crate::activity::Activity;
use indexmap::IndexMap;

/// Frame budget per tag, built once and handed to whoever replays a log.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderContext {
    frames: IndexMap<&'static str, usize>,
}

impl Default for RenderContext {
    fn default() -> Self {
        let frames = [
            ("Start animation", 50),
            ("State Value initiate", 30),
            ("Action Value initiate", 30),
            ("State Value update", 30),
            ("Action Value update", 30),
            ("Policy initiate", 20),
            ("Policy update", 20),
            ("Begin simulation", 50),
            ("Sampled state", 20),
            ("Sampled action", 20),
            ("End simulation", 50),
            ("End animation", 50),
        ];

        Self {
            frames: frames.into_iter().collect(),
        }
    }
}

impl RenderContext {
    /// Overrides the budget of `tag`. Unknown tags are ignored.
    pub fn with_frames(mut self, tag: &str, frames: usize) -> Self {
        if let Some(budget) = self.frames.get_mut(tag) {
            *budget = frames;
        }
        self
    }

    pub fn frames(&self, activity: &Activity) -> usize {
        self.frames.get(activity.tag()).copied().unwrap_or_default()
    }
}

/// Position inside the replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub index: usize,
    pub sub_frame: usize,
    pub budget: usize,
}

impl Frame {
    /// 0 on the first frame of an entry, 1 on its last.
    pub fn completion_ratio(&self) -> f64 {
        if self.budget <= 1 {
            1.
        } else {
            self.sub_frame as f64 / (self.budget - 1) as f64
        }
    }
}

#[derive(Debug, Clone)]
pub struct Playback {
    /// First frame of every entry, plus one past the end.
    starts: Vec<usize>,
}

impl Playback {
    pub fn new(ctx: &RenderContext, entries: &[Activity]) -> Self {
        let mut starts = Vec::with_capacity(entries.len() + 1);
        let mut next = 0;
        starts.push(next);
        for e in entries {
            next += ctx.frames(e);
            starts.push(next);
        }

        Self { starts }
    }

    /// Sum of all budgets minus one: the final frame of `End animation` is
    /// never drawn.
    pub fn total_frame_count(&self) -> usize {
        self.starts.last().copied().unwrap_or_default().saturating_sub(1)
    }

    pub fn locate(&self, frame: usize) -> Option<Frame> {
        if frame >= self.total_frame_count() {
            return None;
        }

        // entries with a zero budget share their start with the next entry
        let index = self.starts.partition_point(|&start| start <= frame) - 1;
        Some(Frame {
            index,
            sub_frame: frame - self.starts[index],
            budget: self.starts[index + 1] - self.starts[index],
        })
    }
}
