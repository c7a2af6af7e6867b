use std::fmt;

use time::OffsetDateTime;
use time::macros::format_description;

/// Axis-aligned bounding box in original image coordinates (x1,y1 = top-left).
#[derive(Debug, Clone, PartialEq)]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BoundingBox {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn width(&self) -> f32 {
        (self.x2 - self.x1).max(0.0)
    }

    pub fn height(&self) -> f32 {
        (self.y2 - self.y1).max(0.0)
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    pub fn center(&self) -> (f32, f32) {
        ((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
    }

    /// Intersection-over-union with another box, 0.0 when disjoint.
    pub fn iou(&self, other: &BoundingBox) -> f32 {
        let ix1 = self.x1.max(other.x1);
        let iy1 = self.y1.max(other.y1);
        let ix2 = self.x2.min(other.x2);
        let iy2 = self.y2.min(other.y2);

        let iw = (ix2 - ix1).max(0.0);
        let ih = (iy2 - iy1).max(0.0);
        let intersection = iw * ih;

        let union = self.area() + other.area() - intersection;
        if union <= 0.0 {
            return 0.0;
        }
        intersection / union
    }
}

/// One object instance found by the detector.
#[derive(Debug, Clone)]
pub struct Detection {
    pub class_name: String,
    pub confidence: f32,
    pub bbox: BoundingBox,
    /// Box center, materialized at construction.
    pub center: (f32, f32),
}

impl Detection {
    pub fn new(class_name: impl Into<String>, confidence: f32, bbox: BoundingBox) -> Self {
        let center = bbox.center();
        Self {
            class_name: class_name.into(),
            confidence,
            bbox,
            center,
        }
    }

    /// Button/label caption, e.g. "person (312, 148)".
    pub fn caption(&self) -> String {
        format!(
            "{} ({}, {})",
            self.class_name, self.center.0 as i32, self.center.1 as i32
        )
    }
}

/// Who performed a simulated click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Manual,
    Auto,
}

/// A single entry in the click log.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub actor: Actor,
    pub class_name: String,
    pub timestamp: OffsetDateTime,
}

impl LogEntry {
    pub fn new(actor: Actor, class_name: impl Into<String>, timestamp: OffsetDateTime) -> Self {
        Self {
            actor,
            class_name: class_name.into(),
            timestamp,
        }
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fmt_hms = format_description!("[hour]:[minute]:[second]");
        let clock = self
            .timestamp
            .format(&fmt_hms)
            .unwrap_or_else(|_| "??:??:??".to_string());
        match self.actor {
            Actor::Manual => write!(f, "Manual click on {} at {}", self.class_name, clock),
            Actor::Auto => write!(f, "Auto-clicked {} at {}", self.class_name, clock),
        }
    }
}
