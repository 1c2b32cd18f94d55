/// Transparent black, returned for reads outside the canvas
pub const TRANSPARENT: [u8; 4] = [0, 0, 0, 0];

/// RGBA raster surface used for painting and reconstruction
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Canvas {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// RGBA pixel data (4 bytes per pixel, row-major order)
    pub pixels: Vec<u8>,
}

impl Canvas {
    /// Create a new canvas initialized to transparent black
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0u8; width as usize * height as usize * 4],
        }
    }

    /// Create a canvas filled with a solid color
    pub fn filled(width: u32, height: u32, color: [u8; 4]) -> Self {
        let mut canvas = Self::new(width, height);
        for chunk in canvas.pixels.chunks_exact_mut(4) {
            chunk.copy_from_slice(&color);
        }
        canvas
    }

    /// Wrap an existing RGBA buffer, rejecting buffers of the wrong length
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        (pixels.len() == width as usize * height as usize * 4).then_some(Self {
            width,
            height,
            pixels,
        })
    }

    /// (width, height)
    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Whether (x, y) addresses a pixel of this canvas
    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    #[inline]
    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        self.contains(x, y)
            .then(|| (y as usize * self.width as usize + x as usize) * 4)
    }

    /// Get pixel at (x, y); transparent black outside the canvas
    #[inline]
    pub fn get_pixel(&self, x: i32, y: i32) -> [u8; 4] {
        match self.offset(x, y) {
            Some(idx) => [
                self.pixels[idx],
                self.pixels[idx + 1],
                self.pixels[idx + 2],
                self.pixels[idx + 3],
            ],
            None => TRANSPARENT,
        }
    }

    /// Set pixel at (x, y); writes outside the canvas are dropped
    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, color: [u8; 4]) {
        if let Some(idx) = self.offset(x, y) {
            self.pixels[idx..idx + 4].copy_from_slice(&color);
        }
    }

    /// Alpha channel at (x, y)
    #[inline]
    pub fn alpha(&self, x: i32, y: i32) -> u8 {
        self.get_pixel(x, y)[3]
    }

    /// True when the pixel is fully opaque
    #[inline]
    pub fn is_solid(&self, x: i32, y: i32) -> bool {
        self.alpha(x, y) == 255
    }

    /// Number of pixels whose alpha reaches `threshold`
    pub fn count_opaque(&self, threshold: u8) -> usize {
        self.pixels
            .chunks_exact(4)
            .filter(|px| px[3] >= threshold)
            .count()
    }
}
