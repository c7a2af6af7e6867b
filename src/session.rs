use std::time::{Duration, Instant};

use time::OffsetDateTime;

use crate::models::{Actor, Detection, LogEntry};

/// Minimum gap between automatic clicks.
pub const AUTO_CLICK_INTERVAL: Duration = Duration::from_secs(3);

/// Number of log entries shown in the UI; the backing log is never truncated.
pub const LOG_DISPLAY_LIMIT: usize = 20;

/// Click/log controller for one user session.
///
/// Holds the run/pause flag, the detections from the most recent image, the
/// append-only click log, and the timestamp of the last automatic click.
/// All clock-dependent methods take `now` explicitly so behavior is
/// deterministic under test.
#[derive(Debug, Default)]
pub struct ClickSession {
    running: bool,
    detections: Vec<Detection>,
    log: Vec<LogEntry>,
    last_auto_click: Option<Instant>,
}

impl ClickSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn play(&mut self) {
        self.running = true;
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    /// Replace the detection list wholesale; prior detections are discarded.
    pub fn set_detections(&mut self, detections: Vec<Detection>) {
        self.detections = detections;
    }

    pub fn detections(&self) -> &[Detection] {
        &self.detections
    }

    pub fn log(&self) -> &[LogEntry] {
        &self.log
    }

    /// The newest `limit` log entries, newest first.
    pub fn recent_entries(&self, limit: usize) -> impl Iterator<Item = &LogEntry> {
        self.log.iter().rev().take(limit)
    }

    /// Simulate a manual click on detection `index`.
    ///
    /// Fires regardless of the run/pause state and with no cooldown. A
    /// stale index (detections changed since the caller rendered them) is
    /// rejected rather than logged against the wrong object.
    pub fn manual_click(&mut self, index: usize, now: OffsetDateTime) -> Option<&LogEntry> {
        let detection = self.detections.get(index)?;
        let entry = LogEntry::new(Actor::Manual, detection.class_name.clone(), now);
        self.log.push(entry);
        self.log.last()
    }

    /// Whether an automatic click would fire at `now`.
    ///
    /// Requires running, at least one detection, and at least
    /// [`AUTO_CLICK_INTERVAL`] elapsed since the last automatic click.
    /// A session that has never auto-clicked is immediately due.
    pub fn auto_click_due(&self, now: Instant) -> bool {
        if !self.running || self.detections.is_empty() {
            return false;
        }
        match self.last_auto_click {
            Some(last) => now.saturating_duration_since(last) >= AUTO_CLICK_INTERVAL,
            None => true,
        }
    }

    /// Fire the automatic click if due: log the FIRST current detection and
    /// reset the interval timer. Manual clicks never touch this timer.
    pub fn poll_auto_click(&mut self, now: Instant, wall: OffsetDateTime) -> Option<&LogEntry> {
        if !self.auto_click_due(now) {
            return None;
        }
        let target = &self.detections[0];
        let entry = LogEntry::new(Actor::Auto, target.class_name.clone(), wall);
        self.log.push(entry);
        self.last_auto_click = Some(now);
        self.log.last()
    }
}
