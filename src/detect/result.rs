/// A rectangular region believed to contain a face, in pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FaceRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Detector confidence, 0..=1.
    pub confidence: f32,
}

impl FaceRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32, confidence: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            confidence,
        }
    }

    /// Intersect with an image of the given dimensions.
    ///
    /// Detectors may return regions that extend past the frame edge; every
    /// consumer must clamp before touching pixels. Returns `None` when the
    /// intersection is empty.
    pub fn clamp_to(&self, image_width: u32, image_height: u32) -> Option<FaceRect> {
        if self.x >= image_width || self.y >= image_height {
            return None;
        }
        let width = self.width.min(image_width - self.x);
        let height = self.height.min(image_height - self.y);
        if width == 0 || height == 0 {
            return None;
        }
        Some(FaceRect {
            x: self.x,
            y: self.y,
            width,
            height,
            confidence: self.confidence,
        })
    }
}
