use glam::{Vec2, Vec4};

/// Brush tuning. The defaults are the calibrated values the whole pipeline
/// was tuned around; override individual fields through the builder.
#[derive(Debug, Clone, Copy, PartialEq, bon::Builder)]
pub struct Brush {
	/// Stamp diameter in canvas units.
	#[builder(default = 8.0)]
	pub size: f32,
	/// Sampling step as a fraction of the brush size.
	#[builder(default = 0.12)]
	pub step: f32,
	/// Edge falloff of a stamp, 0 = soft, 1 = hard.
	#[builder(default = 0.73)]
	pub sharpness: f32,
	/// Multiplied into the stroke color, all four channels.
	#[builder(default = 0.3)]
	pub opacity: f32,
}

impl Brush {
	/// Minimum distance between two stamps the output gate lets through.
	pub fn min_spacing(&self) -> f32 {
		self.step * self.size
	}
}

impl Default for Brush {
	fn default() -> Self {
		Self::builder().build()
	}
}

/// One discrete paint application. The sink composites these in emission
/// order; this crate only decides where and how densely they occur.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrushStamp {
	pub position: Vec2,
	pub size: f32,
	pub sharpness: f32,
	pub color: Vec4,
}

/// Receiving end of the pipeline, typically a renderer. Stamps arrive in
/// emission order and must be applied in that order.
pub trait BrushSink {
	fn draw(&mut self, stamp: BrushStamp);
}

impl<F: FnMut(BrushStamp)> BrushSink for F {
	fn draw(&mut self, stamp: BrushStamp) {
		self(stamp)
	}
}

/// Minimum-spacing gate in front of a sink.
///
/// Remembers the position it last forwarded and silently drops candidates
/// closer than `min_spacing` to it. The very first candidate always passes.
/// State is private to one stroke; concurrent strokes need their own gate.
#[derive(Debug)]
pub struct SpacingFilter<S> {
	sink: S,
	min_spacing: f32,
	last: Option<Vec2>,
}

impl<S: BrushSink> SpacingFilter<S> {
	pub fn new(min_spacing: f32, sink: S) -> Self {
		Self {
			sink,
			min_spacing,
			last: None,
		}
	}

	/// Forwards the stamp unless it lands inside the dead zone around the
	/// previously forwarded one. Returns whether the stamp was forwarded.
	pub fn draw(&mut self, stamp: BrushStamp) -> bool {
		if let Some(last) = self.last {
			if last.distance(stamp.position) <= self.min_spacing {
				return false;
			}
		}
		self.last = Some(stamp.position);
		self.sink.draw(stamp);
		true
	}

	/// Stamps the stroke's terminus, bypassing the spacing test so the
	/// painted stroke ends exactly where the gesture did. Skipped only when
	/// the gate already emitted at that exact position.
	pub fn finish(&mut self, stamp: BrushStamp) {
		if self.last == Some(stamp.position) {
			return;
		}
		self.last = Some(stamp.position);
		self.sink.draw(stamp);
	}

	pub fn into_inner(self) -> S {
		self.sink
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use glam::{vec2, Vec4};
	use itertools::Itertools;

	fn stamp_at(position: Vec2) -> BrushStamp {
		BrushStamp {
			position,
			size: 8.0,
			sharpness: 0.73,
			color: Vec4::ONE,
		}
	}

	#[test]
	fn brush_defaults() {
		let brush = Brush::default();
		assert_eq!(brush.size, 8.0);
		assert_eq!(brush.step, 0.12);
		assert_eq!(brush.sharpness, 0.73);
		assert_eq!(brush.opacity, 0.3);
		assert_eq!(brush.min_spacing(), 0.96);
	}

	#[test]
	fn brush_builder_overrides() {
		let brush = Brush::builder().size(10.0).step(0.5).build();
		assert_eq!(brush.size, 10.0);
		assert_eq!(brush.step, 0.5);
		assert_eq!(brush.sharpness, 0.73);
		assert_eq!(brush.min_spacing(), 5.0);
	}

	#[test]
	fn first_candidate_always_passes() {
		let mut emitted = Vec::new();
		let mut gate = SpacingFilter::new(1.0, |stamp: BrushStamp| emitted.push(stamp));
		assert!(gate.draw(stamp_at(vec2(3.0, 4.0))));
		drop(gate);
		assert_eq!(emitted.len(), 1);
		assert_eq!(emitted[0].position, vec2(3.0, 4.0));
	}

	#[test]
	fn forwarded_stamps_respect_min_spacing() {
		let mut emitted = Vec::new();
		{
			let mut gate = SpacingFilter::new(0.96, |stamp: BrushStamp| emitted.push(stamp));
			// A dense candidate stream along a line.
			for i in 0..200 {
				gate.draw(stamp_at(vec2(0.1 * i as f32, 0.0)));
			}
		}
		assert!(emitted.len() > 1);
		for (a, b) in emitted.iter().tuple_windows() {
			assert!(a.position.distance(b.position) > 0.96);
		}
	}

	#[test]
	fn drops_are_reported() {
		let mut gate = SpacingFilter::new(2.0, |_stamp: BrushStamp| {});
		assert!(gate.draw(stamp_at(vec2(0.0, 0.0))));
		assert!(!gate.draw(stamp_at(vec2(1.0, 0.0))));
		// The dropped candidate did not move the remembered position.
		assert!(gate.draw(stamp_at(vec2(2.5, 0.0))));
	}

	#[test]
	fn finish_places_the_terminus() {
		let mut emitted = Vec::new();
		{
			let mut gate = SpacingFilter::new(0.96, |stamp: BrushStamp| emitted.push(stamp));
			gate.draw(stamp_at(vec2(0.0, 0.0)));
			assert!(!gate.draw(stamp_at(vec2(0.5, 0.0))));
			gate.finish(stamp_at(vec2(0.5, 0.0)));
		}
		assert_eq!(emitted.len(), 2);
		assert_eq!(emitted[1].position, vec2(0.5, 0.0));
	}

	#[test]
	fn finish_does_not_duplicate_the_terminus() {
		let mut emitted = Vec::new();
		{
			let mut gate = SpacingFilter::new(0.96, |stamp: BrushStamp| emitted.push(stamp));
			gate.draw(stamp_at(vec2(5.0, 5.0)));
			gate.finish(stamp_at(vec2(5.0, 5.0)));
		}
		assert_eq!(emitted.len(), 1);
	}
}
