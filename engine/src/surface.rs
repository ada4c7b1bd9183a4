use sha2::{Digest, Sha256};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn rgba_len(self) -> usize {
        (self.width as usize)
            .saturating_mul(self.height as usize)
            .saturating_mul(4)
    }
}

/// An in-memory RGBA buffer for headless rendering and tests.
#[derive(Debug, Clone)]
pub struct RgbaBufferSurface {
    size: SurfaceSize,
    buf: Vec<u8>,
}

impl RgbaBufferSurface {
    pub fn new(size: SurfaceSize) -> Self {
        Self {
            size,
            buf: vec![0u8; size.rgba_len()],
        }
    }

    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    pub fn frame(&self) -> &[u8] {
        &self.buf
    }

    pub fn frame_mut(&mut self) -> &mut [u8] {
        &mut self.buf
    }

    pub fn resize(&mut self, size: SurfaceSize) {
        self.size = size;
        self.buf.resize(size.rgba_len(), 0u8);
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.size.width || y >= self.size.height {
            return None;
        }
        let idx = (y as usize * self.size.width as usize + x as usize) * 4;
        let px = self.buf.get(idx..idx + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    pub fn hash(&self) -> String {
        frame_hash(&self.buf)
    }
}

/// Hex SHA-256 of a raw RGBA frame.
pub fn frame_hash(frame: &[u8]) -> String {
    hex::encode(Sha256::digest(frame))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resize_tracks_rgba_len() {
        let mut surface = RgbaBufferSurface::new(SurfaceSize::new(2, 2));
        assert_eq!(surface.frame().len(), 16);

        surface.resize(SurfaceSize::new(3, 1));
        assert_eq!(surface.frame().len(), 12);
        assert_eq!(surface.size(), SurfaceSize::new(3, 1));
    }

    #[test]
    fn identical_frames_hash_identically() {
        let a = RgbaBufferSurface::new(SurfaceSize::new(4, 4));
        let mut b = RgbaBufferSurface::new(SurfaceSize::new(4, 4));
        assert_eq!(a.hash(), b.hash());

        b.frame_mut()[0] = 1;
        assert_ne!(a.hash(), b.hash());
        assert_eq!(a.hash().len(), 64);
    }

    #[test]
    fn pixel_out_of_bounds_is_none() {
        let surface = RgbaBufferSurface::new(SurfaceSize::new(1, 1));
        assert_eq!(surface.pixel(0, 0), Some([0, 0, 0, 0]));
        assert_eq!(surface.pixel(1, 0), None);
    }
}
