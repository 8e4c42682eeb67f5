//! Pixel grids and checked neighbour lookup
//!
//! Pixels are stored interleaved and row-major: pixel `i = y * width + x`
//! occupies bytes `[i * channels, (i + 1) * channels)`.
//! Coordinates outside the grid are an expected condition (every border
//! pixel produces some) and are reported as `None`, never as an error.

use crate::TreeError;

/// Pixel adjacency model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Connectivity {
    /// Right/left and up/down neighbours
    Four,

    /// Four-connectivity plus both diagonals
    Eight,
}

impl Connectivity {
    /// Number of neighbours per pixel (4 or 8).
    pub fn neighbors(&self) -> usize {
        match self {
            Connectivity::Four => 4,
            Connectivity::Eight => 8,
        }
    }

    /// Forward edges emitted per pixel: `neighbors / 2`.
    pub fn edges_per_pixel(&self) -> usize {
        self.neighbors() / 2
    }

    /// Forward offsets `(dx, dy)`: right, down and, for eight-connectivity,
    /// down-left and down-right.
    pub fn forward_offsets(&self) -> &'static [(isize, isize)] {
        const FOUR: [(isize, isize); 2] = [(1, 0), (0, 1)];
        const EIGHT: [(isize, isize); 4] = [(1, 0), (0, 1), (-1, 1), (1, 1)];
        match self {
            Connectivity::Four => &FOUR,
            Connectivity::Eight => &EIGHT,
        }
    }
}

impl TryFrom<u8> for Connectivity {
    type Error = TreeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            4 => Ok(Connectivity::Four),
            8 => Ok(Connectivity::Eight),
            other => Err(TreeError::InvalidConnectivity(other)),
        }
    }
}

/// Borrowed view over an interleaved 8-bit image
#[derive(Debug, Clone, Copy)]
pub struct PixelGrid<'a> {
    width: usize,
    height: usize,
    channels: usize,
    data: &'a [u8],
}

impl<'a> PixelGrid<'a> {
    /// Wrap `data`, checking that it holds exactly `width * height * channels` bytes.
    pub fn new(
        width: usize,
        height: usize,
        channels: usize,
        data: &'a [u8],
    ) -> Result<Self, TreeError> {
        if channels == 0 {
            return Err(TreeError::ZeroChannels);
        }
        let expected = width
            .checked_mul(height)
            .and_then(|pixels| pixels.checked_mul(channels))
            .ok_or(TreeError::DimensionOverflow {
                width,
                height,
                channels,
            })?;
        if data.len() != expected {
            return Err(TreeError::BufferSizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// Image width in pixels
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Image height in pixels
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Channels per pixel
    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Number of pixels `N`
    #[inline]
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    /// Whether the grid has no pixels
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Raw interleaved bytes
    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    /// Channel values of pixel `index`.
    ///
    /// Panics if `index >= len()`; callers obtain indices from
    /// [`index_of`](Self::index_of) or [`neighbor`](Self::neighbor).
    #[inline]
    pub fn pixel(&self, index: usize) -> &'a [u8] {
        let start = index * self.channels;
        &self.data[start..start + self.channels]
    }

    /// Raster index of `(x, y)`, or `None` outside the grid.
    #[inline]
    pub fn index_of(&self, x: isize, y: isize) -> Option<usize> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y * self.width + x)
    }

    /// Coordinates of pixel `index`, or `None` if it is not a pixel.
    #[inline]
    pub fn point_of(&self, index: usize) -> Option<(usize, usize)> {
        if index >= self.len() {
            return None;
        }
        Some((index % self.width, index / self.width))
    }

    /// Index of the neighbour at offset `(dx, dy)` from `index`.
    #[inline]
    pub fn neighbor(&self, index: usize, dx: isize, dy: isize) -> Option<usize> {
        let (x, y) = self.point_of(index)?;
        self.index_of(x as isize + dx, y as isize + dy)
    }

    /// Like [`neighbor`](Self::neighbor) but clamps the offset to the grid.
    pub fn clamped_neighbor(&self, index: usize, dx: isize, dy: isize) -> Option<usize> {
        let (x, y) = self.point_of(index)?;
        let cx = (x as isize + dx).clamp(0, self.width as isize - 1);
        let cy = (y as isize + dy).clamp(0, self.height as isize - 1);
        self.index_of(cx, cy)
    }
}
