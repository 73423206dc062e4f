use std::cell::Cell;
use std::rc::Rc;

/// Frame metadata - carries frame number and timing info
#[derive(Debug, Clone, Copy)]
pub struct FrameInfo {
    pub number: u64,
    pub time: f32,
    pub delta: f32,
}

impl FrameInfo {
    pub fn new(number: u64, time: f32, delta: f32) -> Self {
        Self { number, time, delta }
    }
}

/// Infinite iterator that yields frame information
/// Use this in a loop: `for frame in frames { ... }`
pub struct FrameIterator {
    frame_number: u64,
    start_time: std::time::Instant,
    last_frame_time: std::time::Instant,
}

impl FrameIterator {
    pub fn new() -> Self {
        let now = std::time::Instant::now();
        Self {
            frame_number: 0,
            start_time: now,
            last_frame_time: now,
        }
    }

    pub fn frame_number(&self) -> u64 {
        self.frame_number
    }

    /// Restart delta measurement so the first frame after a pause is small
    pub fn reset_delta(&mut self) {
        self.last_frame_time = std::time::Instant::now();
    }
}

impl Default for FrameIterator {
    fn default() -> Self {
        Self::new()
    }
}

impl Iterator for FrameIterator {
    type Item = FrameInfo;

    fn next(&mut self) -> Option<FrameInfo> {
        let now = std::time::Instant::now();
        let delta = now.duration_since(self.last_frame_time).as_secs_f32();
        let time = now.duration_since(self.start_time).as_secs_f32();

        let info = FrameInfo::new(self.frame_number, time, delta);

        self.frame_number += 1;
        self.last_frame_time = now;

        Some(info)
    }
}

/// Shared flag that stops a repeating task once set
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Rc<Cell<bool>>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

/// Self-rescheduling per-frame task
///
/// At most one frame request is outstanding at a time, and none is issued
/// after the token is cancelled.
#[derive(Debug, Default)]
pub struct FrameTask {
    token: CancellationToken,
    scheduled: bool,
}

impl FrameTask {
    pub fn new(token: CancellationToken) -> Self {
        Self {
            token,
            scheduled: false,
        }
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Returns true when the caller should request a new frame
    pub fn try_schedule(&mut self) -> bool {
        if self.token.is_cancelled() || self.scheduled {
            return false;
        }
        self.scheduled = true;
        true
    }

    /// Consume the pending request; returns false once cancelled
    pub fn begin_frame(&mut self) -> bool {
        self.scheduled = false;
        !self.token.is_cancelled()
    }

    pub fn cancel(&mut self) {
        self.token.cancel();
        self.scheduled = false;
    }
}
