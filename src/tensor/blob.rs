use std::fmt;

use crate::error::{ConvError, Result};

/// A dense 3D floating-point tensor (depth x height x width).
///
/// Storage is contiguous, depth-major then row-major: element `(z, y, x)`
/// lives at `(z * h + y) * w + x`. A blob owns its buffer exclusively;
/// handing it to another component is a move.
#[derive(Debug, Clone, PartialEq)]
pub struct Blob {
    pub d: usize,
    pub h: usize,
    pub w: usize,
    data: Vec<f32>,
}

impl Blob {
    /// Allocates a blob whose contents are unspecified and must be written
    /// before they are read. Currently zero-filled; callers must not rely on
    /// that.
    pub fn alloc(d: usize, h: usize, w: usize) -> Self {
        Blob::zeros(d, h, w)
    }

    /// Allocates a zero-initialized blob.
    pub fn zeros(d: usize, h: usize, w: usize) -> Self {
        Blob {
            d,
            h,
            w,
            data: vec![0.0; d * h * w],
        }
    }

    pub fn filled(d: usize, h: usize, w: usize, val: f32) -> Self {
        Blob {
            d,
            h,
            w,
            data: vec![val; d * h * w],
        }
    }

    /// Wraps an existing buffer. Fails if its length does not match the shape.
    pub fn from_vec(d: usize, h: usize, w: usize, data: Vec<f32>) -> Result<Self> {
        if data.len() != d * h * w {
            return Err(ConvError::InvalidShape(format!(
                "buffer of {} floats cannot back a {}x{}x{} blob",
                data.len(),
                d,
                h,
                w
            )));
        }
        Ok(Blob { d, h, w, data })
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    pub fn shape(&self) -> (usize, usize, usize) {
        (self.d, self.h, self.w)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of elements in one depth slice.
    pub fn plane(&self) -> usize {
        self.h * self.w
    }

    #[inline(always)]
    fn offset(&self, z: usize, y: usize, x: usize) -> usize {
        (z * self.h + y) * self.w + x
    }

    fn check(&self, z: usize, y: usize, x: usize) -> Result<usize> {
        if z >= self.d || y >= self.h || x >= self.w {
            return Err(ConvError::IndexOutOfRange {
                z,
                y,
                x,
                shape: self.to_string(),
            });
        }
        Ok(self.offset(z, y, x))
    }

    pub fn get(&self, z: usize, y: usize, x: usize) -> Result<f32> {
        let idx = self.check(z, y, x)?;
        Ok(self.data[idx])
    }

    pub fn set(&mut self, z: usize, y: usize, x: usize, val: f32) -> Result<()> {
        let idx = self.check(z, y, x)?;
        self.data[idx] = val;
        Ok(())
    }

    /// Element read for inner loops whose indices are proven in range by the
    /// caller's shape validation. Bounds are asserted in debug builds only.
    #[inline(always)]
    pub fn at(&self, z: usize, y: usize, x: usize) -> f32 {
        debug_assert!(z < self.d && y < self.h && x < self.w);
        self.data[self.offset(z, y, x)]
    }

    #[inline(always)]
    pub fn at_mut(&mut self, z: usize, y: usize, x: usize) -> &mut f32 {
        debug_assert!(z < self.d && y < self.h && x < self.w);
        let idx = self.offset(z, y, x);
        &mut self.data[idx]
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Flat offset of the first element of row `y` in depth slice `z`.
    pub fn row_start(&self, z: usize, y: usize) -> usize {
        self.offset(z, y, 0)
    }

    /// Row `y` of depth slice `z`.
    pub fn row(&self, z: usize, y: usize) -> &[f32] {
        let start = self.offset(z, y, 0);
        &self.data[start..start + self.w]
    }

    /// Depth slice `z` as a contiguous `h * w` buffer.
    pub fn channel(&self, z: usize) -> &[f32] {
        let start = z * self.plane();
        &self.data[start..start + self.plane()]
    }

    pub fn channel_mut(&mut self, z: usize) -> &mut [f32] {
        let plane = self.plane();
        let start = z * plane;
        &mut self.data[start..start + plane]
    }

    pub fn fill(&mut self, val: f32) {
        self.data.fill(val);
    }
}

impl fmt::Display for Blob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.d, self.h, self.w)
    }
}
