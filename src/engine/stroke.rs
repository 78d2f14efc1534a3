use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::engine::brush::{Brush, BrushSink};
use crate::engine::processor::{Parameters, StrokeProcessor};

/// One raw pointer sample: a position and the milliseconds since the
/// gesture began. Terminality is not part of the sample — it is expressed
/// by feeding a point through [`StrokeProcessor::finish`] instead of
/// [`StrokeProcessor::feed`], so it can never end up in a saved stroke.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimedPoint {
	pub x: f32,
	pub y: f32,
	pub t: u32,
}

impl TimedPoint {
	pub fn new(x: f32, y: f32, t: u32) -> Self {
		Self { x, y, t }
	}

	pub fn position(&self) -> Vec2 {
		Vec2::new(self.x, self.y)
	}
}

#[derive(Debug, thiserror::Error)]
pub enum StrokeError {
	#[error("stroke JSON is malformed")]
	Json(#[from] serde_json::Error),
	#[error("point {index} regresses in time ({t}ms after {prev}ms)")]
	TimeRegression { index: usize, t: u32, prev: u32 },
}

static_assertions::assert_impl_all!(StrokeError: std::error::Error, Send, Sync);

/// The raw samples of one gesture, in arrival order.
///
/// Append-only while the gesture is live; replayable afterwards, e.g. to
/// repaint with different parameters. Serializes to the stored stroke
/// format `{"points": [{"x", "y", "t"}, ...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
	points: Vec<TimedPoint>,
}

impl Stroke {
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends a sample. Panics if `point` goes backwards in time; samples
	/// of a live gesture arrive in order or not at all.
	pub fn push(&mut self, point: TimedPoint) {
		if let Some(prev) = self.points.last() {
			assert!(
				point.t >= prev.t,
				"stroke timestamps regressed: {} after {}",
				point.t,
				prev.t
			);
		}
		self.points.push(point);
	}

	pub fn points(&self) -> &[TimedPoint] {
		&self.points
	}

	pub fn len(&self) -> usize {
		self.points.len()
	}

	pub fn is_empty(&self) -> bool {
		self.points.is_empty()
	}

	/// Parses the stored stroke format, validating the time order so a bad
	/// file surfaces here as an error instead of a fault mid-replay.
	pub fn from_json(json: &str) -> Result<Self, StrokeError> {
		let stroke: Self = serde_json::from_str(json)?;
		for (index, pair) in stroke.points.windows(2).enumerate() {
			if pair[1].t < pair[0].t {
				return Err(StrokeError::TimeRegression {
					index: index + 1,
					t: pair[1].t,
					prev: pair[0].t,
				});
			}
		}
		Ok(stroke)
	}

	pub fn to_json(&self) -> Result<String, StrokeError> {
		Ok(serde_json::to_string(self)?)
	}

	/// Replays the recorded gesture into `sink` through a fresh processor.
	/// The stored format carries no terminality, so the last point is fed
	/// as the terminal one here. Replaying an empty stroke is a no-op.
	pub fn replay<S: BrushSink>(&self, params: Parameters, brush: Brush, sink: S) {
		let Some((last, init)) = self.points.split_last() else {
			return;
		};
		tracing::debug!(points = self.points.len(), "replaying stroke");
		let mut processor = StrokeProcessor::new(params, brush, sink);
		for &point in init {
			processor.feed(point);
		}
		processor.finish(*last);
	}
}
