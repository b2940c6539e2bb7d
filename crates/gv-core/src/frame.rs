/// Octets par pixel (RGB, pas d'alpha).
pub const CHANNELS: usize = 3;

/// Frame RGB possédée. Utilisée pour remplacer une frame d'une vidéo.
///
/// Stocke les pixels en RGB row-major, 3 bytes par pixel.
///
/// # Example
/// ```
/// use gv_core::frame::FrameBuffer;
/// let fb = FrameBuffer::new(10, 10);
/// assert_eq!(fb.data.len(), 300);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameBuffer {
    /// Pixels RGB, row-major, 3 bytes par pixel.
    pub data: Vec<u8>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl FrameBuffer {
    /// Crée un buffer noir aux dimensions données.
    ///
    /// # Example
    /// ```
    /// use gv_core::frame::FrameBuffer;
    /// let fb = FrameBuffer::new(100, 50);
    /// assert_eq!(fb.width, 100);
    /// assert_eq!(fb.height, 50);
    /// ```
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            data: vec![0u8; width as usize * height as usize * CHANNELS],
            width,
            height,
        }
    }

    /// Crée un buffer uniformément rempli avec `rgb`.
    #[must_use]
    pub fn filled(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let mut fb = Self::new(width, height);
        for px in fb.data.chunks_exact_mut(CHANNELS) {
            px.copy_from_slice(&rgb);
        }
        fb
    }

    /// Vue empruntée sur ce buffer.
    #[must_use]
    pub fn as_frame(&self) -> FrameRef<'_> {
        FrameRef {
            data: &self.data,
            width: self.width,
            height: self.height,
        }
    }

    /// Accès au pixel (x, y) → (r, g, b).
    #[inline]
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> (u8, u8, u8) {
        self.as_frame().pixel(x, y)
    }
}

/// Vue en lecture seule sur une frame d'un [`crate::video::VideoBuffer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameRef<'a> {
    /// Pixels RGB, row-major.
    pub data: &'a [u8],
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl FrameRef<'_> {
    /// Accès au pixel (x, y) → (r, g, b).
    ///
    /// Hors limites : retourne (0, 0, 0). Pour une erreur explicite, voir
    /// [`crate::video::VideoBuffer::pixel`].
    ///
    /// # Example
    /// ```
    /// use gv_core::frame::FrameBuffer;
    /// let fb = FrameBuffer::filled(4, 4, [1, 2, 3]);
    /// assert_eq!(fb.as_frame().pixel(3, 3), (1, 2, 3));
    /// ```
    #[inline]
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> (u8, u8, u8) {
        if x >= self.width || y >= self.height {
            return (0, 0, 0);
        }
        let idx = (y as usize * self.width as usize + x as usize) * CHANNELS;
        if idx + 2 >= self.data.len() {
            return (0, 0, 0);
        }
        (self.data[idx], self.data[idx + 1], self.data[idx + 2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filled_sets_every_pixel() {
        let fb = FrameBuffer::filled(3, 2, [9, 8, 7]);
        for y in 0..2 {
            for x in 0..3 {
                assert_eq!(fb.pixel(x, y), (9, 8, 7));
            }
        }
    }

    #[test]
    fn pixel_is_row_major() {
        let mut fb = FrameBuffer::new(4, 3);
        // (x=1, y=2)
        let idx = (2 * 4 + 1) * CHANNELS;
        fb.data[idx] = 200;
        assert_eq!(fb.pixel(1, 2), (200, 0, 0));
        assert_eq!(fb.pixel(2, 1), (0, 0, 0));
        assert_eq!(fb.pixel(4, 0), (0, 0, 0));
    }
}
