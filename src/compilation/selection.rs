//! Selection policy: which clips make the cut, and in what order.

use crate::video::types::VideoClip;

/// Result of applying the selection policy to an inventory
#[derive(Debug, Clone)]
pub struct Selection {
    /// Chosen clips, most recently created first
    pub clips: Vec<VideoClip>,

    /// Sum of the chosen clips' durations in seconds
    pub total_duration: f64,
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    /// Seconds missing against a target duration, if any
    ///
    /// A target of zero means "use everything selected" and never reports a
    /// shortfall. Being under target is a warning condition, not an error:
    /// the compiler proceeds with what it has and never pads or loops clips.
    pub fn shortfall(&self, target_duration: f64) -> Option<f64> {
        if target_duration > 0.0 && self.total_duration < target_duration {
            Some(target_duration - self.total_duration)
        } else {
            None
        }
    }
}

/// Choose and order the main clips for a compilation
///
/// Candidates are ordered by creation time, most recent first, then truncated
/// to `max_clips` so the most recent ones win.
pub fn select_clips(mut inventory: Vec<VideoClip>, max_clips: usize) -> Selection {
    inventory.sort_by(|a, b| b.created.cmp(&a.created));
    inventory.truncate(max_clips);

    let total_duration = inventory.iter().map(|clip| clip.duration).sum();

    Selection {
        clips: inventory,
        total_duration,
    }
}
