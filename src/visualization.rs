//! Gaze overlays on eye crops and the per-frame composite image.

use crate::{
    angles::{gaze_endpoint, SmoothedGazeEstimate},
    constants::GAZE_LINE_COLOR,
};
use image::{imageops, Rgb, RgbImage};
use imageproc::drawing::draw_line_segment_mut;

/// Copy of `crop` with the gaze drawn as a line from its centre
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn annotate_eye(crop: &RgbImage, gaze: SmoothedGazeEstimate, line_length: f32) -> RgbImage {
    let mut output = crop.clone();
    let center = (f64::from(crop.width()) / 2.0, f64::from(crop.height()) / 2.0);
    let (end_x, end_y) = gaze_endpoint(gaze, center, f64::from(line_length));

    draw_line_segment_mut(
        &mut output,
        (center.0 as f32, center.1 as f32),
        (end_x as f32, end_y as f32),
        Rgb(GAZE_LINE_COLOR),
    );
    output
}

/// Right and left crops side by side
#[must_use]
pub fn subject_strip(right: &RgbImage, left: &RgbImage) -> RgbImage {
    let width = right.width() + left.width();
    let height = right.height().max(left.height());

    let mut strip = RgbImage::new(width, height);
    imageops::replace(&mut strip, right, 0, 0);
    imageops::replace(&mut strip, left, i64::from(right.width()), 0);
    strip
}

/// Stacks subject strips top to bottom into one image per frame
#[derive(Debug, Default)]
pub struct CompositeBuilder {
    strips: Vec<RgbImage>,
}

impl CompositeBuilder {
    /// Create an empty builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one subject's annotated eyes below the previous ones
    pub fn push_subject(&mut self, right: &RgbImage, left: &RgbImage) {
        self.strips.push(subject_strip(right, left));
    }

    /// Number of subjects added
    #[must_use]
    pub fn len(&self) -> usize {
        self.strips.len()
    }

    /// Whether no subject was added
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strips.is_empty()
    }

    /// The composite image, or `None` when no subject was added.
    ///
    /// Narrower strips are left-aligned on a black background.
    #[must_use]
    pub fn build(self) -> Option<RgbImage> {
        if self.strips.is_empty() {
            return None;
        }
        if self.strips.len() == 1 {
            return self.strips.into_iter().next();
        }

        let width = self.strips.iter().map(RgbImage::width).max().unwrap_or(0);
        let height = self.strips.iter().map(RgbImage::height).sum();
        let mut composite = RgbImage::new(width, height);

        let mut y = 0i64;
        for strip in &self.strips {
            imageops::replace(&mut composite, strip, 0, y);
            y += i64::from(strip.height());
        }
        Some(composite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::angles::ThetaPhi;

    fn grey(width: u32, height: u32) -> RgbImage {
        RgbImage::from_pixel(width, height, Rgb([128, 128, 128]))
    }

    #[test]
    fn test_annotate_draws_from_center() {
        let crop = grey(60, 36);
        let annotated = annotate_eye(&crop, ThetaPhi::new(0.0, 0.5), 50.0);

        assert_eq!(annotated.dimensions(), crop.dimensions());
        assert_eq!(annotated.get_pixel(30, 18), &Rgb(GAZE_LINE_COLOR));
        // Source crop is untouched
        assert_eq!(crop.get_pixel(30, 18), &Rgb([128, 128, 128]));
    }

    #[test]
    fn test_subject_strip_places_right_first() {
        let right = RgbImage::from_pixel(4, 3, Rgb([10, 0, 0]));
        let left = RgbImage::from_pixel(5, 2, Rgb([0, 20, 0]));
        let strip = subject_strip(&right, &left);

        assert_eq!(strip.dimensions(), (9, 3));
        assert_eq!(strip.get_pixel(0, 0), &Rgb([10, 0, 0]));
        assert_eq!(strip.get_pixel(4, 0), &Rgb([0, 20, 0]));
        assert_eq!(strip.get_pixel(4, 2), &Rgb([0, 0, 0]));
    }

    #[test]
    fn test_composite_stacks_subjects() {
        let mut builder = CompositeBuilder::new();
        assert!(builder.is_empty());

        builder.push_subject(&grey(6, 4), &grey(6, 4));
        builder.push_subject(&grey(3, 2), &grey(3, 2));
        assert_eq!(builder.len(), 2);

        let composite = builder.build().unwrap();
        assert_eq!(composite.dimensions(), (12, 6));
        assert_eq!(composite.get_pixel(0, 4), &Rgb([128, 128, 128]));
        assert_eq!(composite.get_pixel(11, 5), &Rgb([0, 0, 0]));
    }

    #[test]
    fn test_empty_composite() {
        assert!(CompositeBuilder::new().build().is_none());
    }
}
