//! Terminal surface size measured in character cells.

use thiserror::Error;

/// Errors produced while building a [`ViewportSize`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ViewportError {
    /// Either dimension was zero.
    #[error("viewport must be at least 1x1, got {cols}x{rows}")]
    Empty { cols: u16, rows: u16 },
}

/// Columns and rows of the rendered terminal surface.
///
/// Both dimensions are always at least 1; the only way to build one is through
/// [`ViewportSize::new`], which enforces that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewportSize {
    cols: u16,
    rows: u16,
}

impl ViewportSize {
    /// The size a freshly opened surface assumes before its first measurement.
    pub const DEFAULT: ViewportSize = ViewportSize { cols: 80, rows: 24 };

    /// # Errors
    ///
    /// Returns [`ViewportError::Empty`] when `cols` or `rows` is zero.
    pub fn new(cols: u16, rows: u16) -> Result<Self, ViewportError> {
        if cols == 0 || rows == 0 {
            return Err(ViewportError::Empty { cols, rows });
        }
        Ok(Self { cols, rows })
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }
}

impl Default for ViewportSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}
