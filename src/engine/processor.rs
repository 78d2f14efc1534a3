use std::time::Instant;

use glam::{Vec2, Vec4};

use crate::engine::brush::{Brush, BrushSink, BrushStamp, SpacingFilter};
use crate::engine::stroke::TimedPoint;
use crate::geom::CubicBezier;

/// Per-gesture parameters supplied by the caller, one set per feed session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Parameters {
	/// RGBA, channels in [0, 1].
	pub color: Vec4,
}

impl Parameters {
	/// Channels clamped into [0, 1]. Out-of-range values come from callers
	/// assembling colors by hand; the pipeline itself never produces them.
	pub fn clamped(self) -> Self {
		Self {
			color: self.color.clamp(Vec4::ZERO, Vec4::ONE),
		}
	}
}

impl Default for Parameters {
	fn default() -> Self {
		// Dark gray, #333333.
		Self {
			color: Vec4::new(0.2, 0.2, 0.2, 1.0),
		}
	}
}

/// Minimum movement (in canvas units) required to accept a point that
/// arrived `elapsed_ms` after the previous accepted one.
///
/// Bursty input must travel far to register, which suppresses jitter;
/// sparse input registers on almost any movement so slow strokes keep
/// their shape.
pub fn move_threshold(elapsed_ms: u64) -> f32 {
	match elapsed_ms {
		0..=10 => 20.0,
		11..=25 => 12.0,
		26..=50 => 5.0,
		51..=100 => 1.5,
		_ => 0.1,
	}
}

/// The four most recently accepted points, oldest first. A fixed arena with
/// a rotating head; shifting overwrites the oldest slot in place.
#[derive(Debug, Clone, Copy, Default)]
struct Window {
	slots: [Vec2; 4],
	head: usize,
}

impl Window {
	fn shift(&mut self, point: Vec2) {
		self.slots[self.head] = point;
		self.head = (self.head + 1) % 4;
	}

	fn point(&self, index: usize) -> Vec2 {
		debug_assert!(index < 4);
		self.slots[(self.head + index) % 4]
	}

	fn newest(&self) -> Vec2 {
		self.point(3)
	}

	fn curve(&self) -> CubicBezier {
		CubicBezier::from_catmull_rom(self.point(0), self.point(1), self.point(2), self.point(3))
	}

	fn chord(&self) -> f32 {
		self.point(0).distance(self.point(3))
	}
}

/// Streaming smoother for one gesture.
///
/// Feed it pointer samples in temporal order as they arrive; it fits local
/// Catmull-Rom segments over a 4-point sliding window and emits brush stamps
/// through a [`SpacingFilter`] into the sink. The first 4 samples prime the
/// window without output, so gestures shorter than 4 points paint nothing.
///
/// One instance serves exactly one gesture: construct per pointer-down,
/// consume with [`finish`](Self::finish) on pointer-up. Two overlapping
/// gestures need two instances; nothing is shared.
pub struct StrokeProcessor<S> {
	output: SpacingFilter<S>,
	brush: Brush,
	/// Session color with opacity premultiplied into all four channels.
	color: Vec4,
	window: Window,
	filled: usize,
	last_accept: Instant,
	last_t: u32,
}

impl<S: BrushSink> StrokeProcessor<S> {
	pub fn new(params: Parameters, brush: Brush, sink: S) -> Self {
		Self {
			output: SpacingFilter::new(brush.min_spacing(), sink),
			brush,
			color: params.color * brush.opacity,
			window: Window::default(),
			filled: 0,
			last_accept: Instant::now(),
			last_t: 0,
		}
	}

	/// Processes one non-terminal sample. Sub-threshold movement is dropped
	/// silently; that is the intended lossy filter, not an error.
	///
	/// Panics on non-finite coordinates or a timestamp regression: the
	/// stream contract is broken and continuing would corrupt the window.
	pub fn feed(&mut self, point: TimedPoint) {
		self.advance(point, false);
	}

	/// Processes the terminal sample and consumes the processor, draining
	/// the window so the painted stroke terminates exactly at `point`.
	pub fn finish(mut self, point: TimedPoint) {
		self.advance(point, true);
	}

	fn advance(&mut self, point: TimedPoint, last: bool) {
		assert!(
			point.x.is_finite() && point.y.is_finite(),
			"non-finite stroke coordinate"
		);
		assert!(
			point.t >= self.last_t,
			"stroke timestamps regressed: {} after {}",
			point.t,
			self.last_t
		);
		self.last_t = point.t;
		let position = point.position();

		// Priming: store the first four points as-is, no output yet.
		if self.filled < 4 {
			self.window.shift(position);
			self.filled += 1;
			self.last_accept = Instant::now();
			return;
		}

		// Thresholding runs on wall-clock time since the last accepted
		// point, not on the stream's own timestamps, so replays driven
		// faster or slower than real time threshold differently than live
		// capture did.
		let elapsed_ms = self.last_accept.elapsed().as_millis() as u64;
		let move_min = move_threshold(elapsed_ms);
		if !last && self.window.newest().distance(position) <= move_min {
			tracing::trace!(elapsed_ms, move_min, "dropped sub-threshold point");
			return;
		}

		// A terminal point is shifted in three times: Catmull-Rom needs
		// context beyond a segment's endpoint, so the repeats drain the
		// window until the fitted curve actually reaches the final point.
		let repeats = if last { 3 } else { 1 };
		for _ in 0..repeats {
			self.window.shift(position);
			self.emit_segment();
		}
		if last {
			self.output.finish(self.stamp(position));
		}
		self.last_accept = Instant::now();
	}

	fn emit_segment(&mut self) {
		let curve = self.window.curve();
		// Intentional over-estimate; the spacing gate dedups the excess.
		let count = 2.0 * self.window.chord() / self.brush.step;
		for position in curve.sample(count) {
			self.output.draw(self.stamp(position));
		}
	}

	fn stamp(&self, position: Vec2) -> BrushStamp {
		BrushStamp {
			position,
			size: self.brush.size,
			sharpness: self.brush.sharpness,
			color: self.color,
		}
	}
}
