use nalgebra::Point2;

/// Axis-aligned bounding box in pixel coordinates of a single frame.
///
/// Stored as TLWH (top-left x, top-left y, width, height). Detectors usually
/// hand out TLBR corners, see [`Rect::from_tlbr`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    /// Top-left x coordinate
    pub x: f32,
    /// Top-left y coordinate
    pub y: f32,
    /// Width of the bounding box
    pub width: f32,
    /// Height of the bounding box
    pub height: f32,
}

/// Integer pixel region inside a frame, used for cropping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    /// Create a new Rect from top-left coordinates and dimensions (TLWH format).
    #[inline]
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a Rect from TLBR format (top-left x, top-left y, bottom-right x, bottom-right y).
    #[inline]
    pub fn from_tlbr(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            x: x1,
            y: y1,
            width: x2 - x1,
            height: y2 - y1,
        }
    }

    /// Convert to TLBR format: (x1, y1, x2, y2).
    #[inline]
    pub fn to_tlbr(&self) -> [f32; 4] {
        [self.x, self.y, self.x + self.width, self.y + self.height]
    }

    /// Get the center point of the bounding box.
    #[inline]
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    #[inline]
    pub fn centroid(&self) -> Point2<f32> {
        let (cx, cy) = self.center();
        Point2::new(cx, cy)
    }

    #[inline]
    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// Clamp the box to a `frame_width` x `frame_height` image and round it
    /// outwards to whole pixels. Returns `None` when nothing is left.
    pub fn pixel_region(&self, frame_width: u32, frame_height: u32) -> Option<PixelRegion> {
        let [x1, y1, x2, y2] = self.to_tlbr();
        if !(x1.is_finite() && y1.is_finite() && x2.is_finite() && y2.is_finite()) {
            return None;
        }

        let left = x1.floor().clamp(0.0, frame_width as f32) as u32;
        let top = y1.floor().clamp(0.0, frame_height as f32) as u32;
        let right = x2.ceil().clamp(0.0, frame_width as f32) as u32;
        let bottom = y2.ceil().clamp(0.0, frame_height as f32) as u32;

        if right <= left || bottom <= top {
            return None;
        }

        Some(PixelRegion {
            x: left,
            y: top,
            width: right - left,
            height: bottom - top,
        })
    }
}
