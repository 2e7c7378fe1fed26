//! Depth buffer
//!
//! Stores reciprocal depth (`1/w`), so larger values are closer to the
//! camera and the cleared value 0 stands for "infinitely far".

pub struct ZBuffer {
    width: usize,
    height: usize,
    depth: Vec<f64>,
}

impl ZBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            depth: vec![0.0; width * height],
        }
    }

    /// Reset every cell to 0 (nothing drawn yet)
    pub fn reset(&mut self) {
        self.depth.fill(0.0);
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some(x as usize + y as usize * self.width)
    }

    /// True when `value` is strictly closer than what is stored at (x, y).
    /// Out-of-bounds coordinates always fail.
    #[inline]
    pub fn check_depth(&self, x: i32, y: i32, value: f64) -> bool {
        match self.index(x, y) {
            Some(i) => self.depth[i] < value,
            None => false,
        }
    }

    /// Store `value` at (x, y); out-of-bounds writes are ignored
    #[inline]
    pub fn set_depth(&mut self, x: i32, y: i32, value: f64) {
        if let Some(i) = self.index(x, y) {
            self.depth[i] = value;
        }
    }

    pub fn get(&self, x: i32, y: i32) -> Option<f64> {
        self.index(x, y).map(|i| self.depth[i])
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }
}
