//! Viewport dimensions and device pixel ratio

/// Logical viewport size plus the pixel ratio used for the drawing buffer
///
/// The window reports physical pixels; the viewport keeps logical pixels so
/// the camera aspect does not depend on the display density. The drawing
/// buffer is `logical * pixel_ratio`, with the ratio capped at `max_pixel_ratio`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub pixel_ratio: f64,
    max_pixel_ratio: f64,
}

impl Viewport {
    /// Creates a viewport from logical dimensions and the host scale factor
    pub fn new(width: f64, height: f64, host_pixel_ratio: f64, max_pixel_ratio: f64) -> Self {
        Self {
            width,
            height,
            pixel_ratio: clamp_pixel_ratio(host_pixel_ratio, max_pixel_ratio),
            max_pixel_ratio,
        }
    }

    /// Creates a viewport from the physical size winit reports
    pub fn from_physical(
        physical_width: u32,
        physical_height: u32,
        scale_factor: f64,
        max_pixel_ratio: f64,
    ) -> Self {
        let scale = if scale_factor > 0.0 { scale_factor } else { 1.0 };
        Self::new(
            physical_width as f64 / scale,
            physical_height as f64 / scale,
            scale,
            max_pixel_ratio,
        )
    }

    /// Applies a resize; zero-sized (minimised) windows are ignored
    ///
    /// Returns `true` when the viewport was updated.
    pub fn resize(&mut self, width: f64, height: f64, host_pixel_ratio: f64) -> bool {
        if width <= 0.0 || height <= 0.0 {
            return false;
        }
        self.width = width;
        self.height = height;
        self.pixel_ratio = clamp_pixel_ratio(host_pixel_ratio, self.max_pixel_ratio);
        true
    }

    /// Physical-pixel counterpart of [`Viewport::resize`]
    pub fn resize_physical(
        &mut self,
        physical_width: u32,
        physical_height: u32,
        scale_factor: f64,
    ) -> bool {
        let scale = if scale_factor > 0.0 { scale_factor } else { 1.0 };
        self.resize(
            physical_width as f64 / scale,
            physical_height as f64 / scale,
            scale,
        )
    }

    pub fn aspect(&self) -> f32 {
        (self.width / self.height) as f32
    }

    /// Size of the render target in pixels, never smaller than 1x1
    pub fn drawing_buffer_size(&self) -> (u32, u32) {
        let width = (self.width * self.pixel_ratio).round().max(1.0) as u32;
        let height = (self.height * self.pixel_ratio).round().max(1.0) as u32;
        (width, height)
    }
}

/// `min(host, max)`, falling back to 1.0 for nonsensical host ratios
pub fn clamp_pixel_ratio(host_pixel_ratio: f64, max_pixel_ratio: f64) -> f64 {
    if !host_pixel_ratio.is_finite() || host_pixel_ratio <= 0.0 {
        return 1.0_f64.min(max_pixel_ratio);
    }
    host_pixel_ratio.min(max_pixel_ratio)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_ratio_is_capped_at_two() {
        assert_eq!(clamp_pixel_ratio(1.0, 2.0), 1.0);
        assert_eq!(clamp_pixel_ratio(1.5, 2.0), 1.5);
        assert_eq!(clamp_pixel_ratio(3.0, 2.0), 2.0);
        assert_eq!(clamp_pixel_ratio(0.0, 2.0), 1.0);
        assert_eq!(clamp_pixel_ratio(f64::NAN, 2.0), 1.0);
    }

    #[test]
    fn drawing_buffer_scales_with_ratio() {
        let viewport = Viewport::new(800.0, 600.0, 3.0, 2.0);
        assert_eq!(viewport.pixel_ratio, 2.0);
        assert_eq!(viewport.drawing_buffer_size(), (1600, 1200));
    }

    #[test]
    fn physical_size_is_converted_to_logical() {
        let viewport = Viewport::from_physical(1600, 1200, 2.0, 2.0);
        assert_eq!(viewport.width, 800.0);
        assert_eq!(viewport.height, 600.0);
        assert_eq!(viewport.drawing_buffer_size(), (1600, 1200));
    }

    #[test]
    fn zero_sized_resize_is_ignored() {
        let mut viewport = Viewport::new(800.0, 600.0, 1.0, 2.0);
        assert!(!viewport.resize(0.0, 600.0, 1.0));
        assert!(!viewport.resize_physical(1024, 0, 1.0));
        assert_eq!(viewport, Viewport::new(800.0, 600.0, 1.0, 2.0));
    }

    #[test]
    fn repeated_resize_is_idempotent() {
        let mut viewport = Viewport::new(800.0, 600.0, 1.0, 2.0);
        viewport.resize(1024.0, 768.0, 1.0);
        let once = viewport;
        viewport.resize(1024.0, 768.0, 1.0);
        assert_eq!(viewport, once);
        assert_eq!(viewport.drawing_buffer_size(), (1024, 768));
    }
}
