use crate::color::Rgb;

/// A width x height grid of LED pixels, row-major.
///
/// All accessors silently ignore out-of-range coordinates so drawing code
/// can run partially off-screen without bounds arithmetic.
#[derive(Debug, Clone)]
pub struct PixelBuffer {
    width: u16,
    height: u16,
    pixels: Vec<Rgb>,
}

impl PixelBuffer {
    pub fn new(width: u16, height: u16) -> Self {
        let pixels = vec![Rgb::BLACK; (width as usize) * (height as usize)];
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn get(&self, x: u16, y: u16) -> Option<Rgb> {
        if x < self.width && y < self.height {
            Some(self.pixels[self.index(x, y)])
        } else {
            None
        }
    }

    pub fn set(&mut self, x: i32, y: i32, color: Rgb) {
        // Compare in i32: casting first would wrap e.g. 65536 to 0.
        if x >= 0 && y >= 0 && x < self.width as i32 && y < self.height as i32 {
            let idx = self.index(x as u16, y as u16);
            self.pixels[idx] = color;
        }
    }

    fn index(&self, x: u16, y: u16) -> usize {
        (y as usize) * (self.width as usize) + (x as usize)
    }

    pub fn clear(&mut self) {
        self.fill(Rgb::BLACK);
    }

    pub fn fill(&mut self, color: Rgb) {
        for pixel in &mut self.pixels {
            *pixel = color;
        }
    }

    /// Pixels that differ from `other`, as `(x, y, color)` triples.
    ///
    /// Buffers of different sizes compare as fully different.
    pub fn diff<'a>(&'a self, other: &'a PixelBuffer) -> Vec<(u16, u16, Rgb)> {
        if self.width != other.width || self.height != other.height {
            return self
                .pixels
                .iter()
                .enumerate()
                .map(|(i, &c)| self.coords(i, c))
                .collect();
        }
        self.pixels
            .iter()
            .zip(other.pixels.iter())
            .enumerate()
            .filter(|(_, (a, b))| a != b)
            .map(|(i, (&c, _))| self.coords(i, c))
            .collect()
    }

    fn coords(&self, i: usize, color: Rgb) -> (u16, u16, Rgb) {
        let x = (i % self.width as usize) as u16;
        let y = (i / self.width as usize) as u16;
        (x, y, color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_bounds_ignored() {
        let mut buf = PixelBuffer::new(4, 4);
        buf.set(-1, 0, Rgb::WHITE);
        buf.set(0, -1, Rgb::WHITE);
        buf.set(4, 0, Rgb::WHITE);
        buf.set(0, 4, Rgb::WHITE);
        // Coordinates that wrap to 0 when truncated to u16 must not
        // land in the buffer either.
        buf.set(65536, 0, Rgb::WHITE);
        buf.set(0, 65536, Rgb::WHITE);
        buf.set(i32::MAX, i32::MAX, Rgb::WHITE);
        assert!(buf.diff(&PixelBuffer::new(4, 4)).is_empty());
        assert_eq!(buf.get(0, 0), Some(Rgb::BLACK));
        assert_eq!(buf.get(4, 0), None);
    }

    #[test]
    fn test_diff_reports_changes() {
        let mut a = PixelBuffer::new(3, 2);
        let b = PixelBuffer::new(3, 2);
        a.set(2, 1, Rgb::new(9, 9, 9));
        let changes = a.diff(&b);
        assert_eq!(changes, vec![(2, 1, Rgb::new(9, 9, 9))]);
    }
}
