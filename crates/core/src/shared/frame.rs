use image::RgbImage;
use ndarray::{ArrayView3, ArrayViewMut3};

use crate::shared::bounding_box::BoundingBox;

/// Bytes per pixel. Frames are always interleaved RGB.
pub const FRAME_CHANNELS: usize = 3;

/// A single video/image frame: contiguous RGB bytes in row-major order.
///
/// The color order is fixed at RGB; converting from a capture device's
/// native order (BGR, YUV, ...) is the transport driver's job, so every
/// consumer inside the crate can assume RGB without checking.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * FRAME_CHANNELS,
            "data length must equal width * height * 3"
        );
        Self {
            data,
            width,
            height,
        }
    }

    /// A zero-sized frame, the "no content" value.
    pub fn empty() -> Self {
        Self {
            data: Vec::new(),
            width: 0,
            height: 0,
        }
    }

    /// Fill a `width` × `height` frame with a single RGB value.
    pub fn filled(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let mut data = Vec::with_capacity((width as usize) * (height as usize) * FRAME_CHANNELS);
        for _ in 0..(width as usize) * (height as usize) {
            data.extend_from_slice(&rgb);
        }
        Self::new(data, width, height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.data.is_empty()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    pub fn as_ndarray_mut(&mut self) -> ArrayViewMut3<'_, u8> {
        ArrayViewMut3::from_shape(self.shape(), &mut self.data)
            .expect("Frame data length must match dimensions")
    }

    /// Copy out the pixels under `bbox`.
    ///
    /// Returns `None` when the box does not select at least one full
    /// pixel inside the frame; callers skip such regions.
    pub fn crop(&self, bbox: &BoundingBox) -> Option<Frame> {
        if self.is_empty() || bbox.width < 1 || bbox.height < 1 {
            return None;
        }
        if bbox.x < 0
            || bbox.y < 0
            || bbox.right() > self.width as i32
            || bbox.bottom() > self.height as i32
        {
            return None;
        }

        let (x, y) = (bbox.x as usize, bbox.y as usize);
        let (w, h) = (bbox.width as usize, bbox.height as usize);
        let stride = self.width as usize * FRAME_CHANNELS;

        let mut data = Vec::with_capacity(w * h * FRAME_CHANNELS);
        for row in y..y + h {
            let start = row * stride + x * FRAME_CHANNELS;
            data.extend_from_slice(&self.data[start..start + w * FRAME_CHANNELS]);
        }
        Some(Frame::new(data, bbox.width as u32, bbox.height as u32))
    }

    /// Downscale so the frame fits inside `max_width` × `max_height`,
    /// preserving aspect ratio.
    ///
    /// Uses an area-averaging resample; nearest-neighbor aliasing on the
    /// way down measurably hurts detector output. Frames already within
    /// bounds come back as plain copies.
    pub fn downscaled_to_fit(&self, max_width: u32, max_height: u32) -> Frame {
        if self.is_empty() || (self.width <= max_width && self.height <= max_height) {
            return self.clone();
        }
        let scale =
            (max_width as f64 / self.width as f64).min(max_height as f64 / self.height as f64);
        let new_w = ((self.width as f64 * scale).round() as u32).max(1);
        let new_h = ((self.height as f64 * scale).round() as u32).max(1);

        let resized = image::imageops::thumbnail(&self.to_rgb_image(), new_w, new_h);
        Frame::from_rgb_image(&resized)
    }

    pub fn to_rgb_image(&self) -> RgbImage {
        RgbImage::from_raw(self.width, self.height, self.data.clone())
            .expect("Frame data length must match dimensions")
    }

    pub fn from_rgb_image(image: &RgbImage) -> Frame {
        Frame::new(image.as_raw().clone(), image.width(), image.height())
    }

    fn shape(&self) -> (usize, usize, usize) {
        (self.height as usize, self.width as usize, FRAME_CHANNELS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_and_accessors() {
        let data = vec![0u8; 12]; // 2x2x3
        let frame = Frame::new(data.clone(), 2, 2);
        assert_eq!(frame.width(), 2);
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.data(), &data[..]);
        assert!(!frame.is_empty());
    }

    #[test]
    fn test_empty_frame() {
        let frame = Frame::empty();
        assert!(frame.is_empty());
        assert_eq!(frame.width(), 0);
        assert_eq!(frame.height(), 0);
    }

    #[test]
    #[should_panic(expected = "data length must equal width * height * 3")]
    fn test_mismatched_data_length_panics_in_debug() {
        Frame::new(vec![0u8; 10], 2, 2);
    }

    #[test]
    fn test_clone_is_independent() {
        let frame = Frame::filled(2, 2, [100, 100, 100]);
        let mut cloned = frame.clone();
        cloned.data_mut()[0] = 0;
        assert_eq!(frame.data()[0], 100);
        assert_eq!(cloned.data()[0], 0);
    }

    #[test]
    fn test_as_ndarray_shape_and_pixel_access() {
        let mut data = vec![0u8; 12]; // 2x2x3
        data[6] = 255; // row=1, col=0, R
        let frame = Frame::new(data, 2, 2);
        let arr = frame.as_ndarray();
        assert_eq!(arr.shape(), &[2, 2, 3]); // (height, width, channels)
        assert_eq!(arr[[1, 0, 0]], 255);
        assert_eq!(arr[[1, 0, 1]], 0);
    }

    // ── Crop ─────────────────────────────────────────────────────────

    #[test]
    fn test_crop_extracts_subregion() {
        // 4x4 frame, pixel value = column index
        let mut data = Vec::new();
        for _row in 0..4 {
            for col in 0..4u8 {
                data.extend_from_slice(&[col, col, col]);
            }
        }
        let frame = Frame::new(data, 4, 4);

        let crop = frame.crop(&BoundingBox::new(1, 1, 2, 2)).unwrap();
        assert_eq!(crop.width(), 2);
        assert_eq!(crop.height(), 2);
        // First pixel of the crop is column 1
        assert_eq!(crop.data()[0], 1);
        // Second pixel is column 2
        assert_eq!(crop.data()[3], 2);
    }

    #[test]
    fn test_crop_full_frame_is_identity() {
        let frame = Frame::filled(3, 3, [7, 8, 9]);
        let crop = frame.crop(&BoundingBox::new(0, 0, 3, 3)).unwrap();
        assert_eq!(crop, frame);
    }

    #[test]
    fn test_crop_out_of_bounds_returns_none() {
        let frame = Frame::filled(4, 4, [0, 0, 0]);
        assert!(frame.crop(&BoundingBox::new(2, 2, 10, 10)).is_none());
        assert!(frame.crop(&BoundingBox::new(-1, 0, 2, 2)).is_none());
    }

    #[test]
    fn test_crop_degenerate_box_returns_none() {
        let frame = Frame::filled(4, 4, [0, 0, 0]);
        assert!(frame.crop(&BoundingBox::new(1, 1, 0, 2)).is_none());
        assert!(frame.crop(&BoundingBox::new(1, 1, 2, -3)).is_none());
    }

    #[test]
    fn test_crop_of_empty_frame_returns_none() {
        assert!(Frame::empty().crop(&BoundingBox::new(0, 0, 1, 1)).is_none());
    }

    // ── Downscale ────────────────────────────────────────────────────

    #[test]
    fn test_downscale_noop_when_within_bounds() {
        let frame = Frame::filled(640, 480, [10, 20, 30]);
        let out = frame.downscaled_to_fit(640, 480);
        assert_eq!(out, frame);
    }

    #[test]
    fn test_downscale_preserves_aspect_ratio() {
        let frame = Frame::filled(1280, 720, [0, 0, 0]);
        let out = frame.downscaled_to_fit(640, 480);
        assert_eq!(out.width(), 640);
        assert_eq!(out.height(), 360);
    }

    #[test]
    fn test_downscale_bounded_by_height() {
        let frame = Frame::filled(800, 960, [0, 0, 0]);
        let out = frame.downscaled_to_fit(640, 480);
        assert_eq!(out.height(), 480);
        assert_eq!(out.width(), 400);
    }

    #[test]
    fn test_downscale_averages_uniform_content() {
        let frame = Frame::filled(1280, 960, [200, 100, 50]);
        let out = frame.downscaled_to_fit(640, 480);
        // Area averaging over a uniform image must reproduce the value
        assert_eq!(&out.data()[0..3], &[200, 100, 50]);
    }

    #[test]
    fn test_rgb_image_round_trip() {
        let frame = Frame::filled(5, 4, [1, 2, 3]);
        let round = Frame::from_rgb_image(&frame.to_rgb_image());
        assert_eq!(round, frame);
    }
}
