//! 26.6 fixed-point metrics
//!
//! Rasterizers report sub-pixel positions as 26.6 fixed point.
//! Every conversion to float goes through [`Fixed26_6::to_f32`], and every
//! rounding of a metric goes through [`round_extent`] or [`ceil_extent`],
//! so the atlas builder and the layout code can never drift apart.

/// Fixed-point number with 26 integer bits and 6 fractional bits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fixed26_6(pub i32);

impl Fixed26_6 {
    /// Fractional bits
    pub const SHIFT: u32 = 6;
    /// Mask of the fractional part
    const FRAC_MASK: i32 = 0x3F;
    const ONE: f32 = 64.0;

    /// Convert from float (nearest 1/64)
    pub fn from_f32(v: f32) -> Self {
        Self((v * Self::ONE).round() as i32)
    }

    /// Convert from whole pixels
    pub const fn from_int(v: i32) -> Self {
        Self(v << Self::SHIFT)
    }

    /// Convert to float
    ///
    /// Integer part via arithmetic shift (floors for negatives), plus the
    /// always-positive fractional part.
    pub fn to_f32(self) -> f32 {
        let int = (self.0 >> Self::SHIFT) as f32;
        let frac = (self.0 & Self::FRAC_MASK) as f32 / Self::ONE;
        int + frac
    }
}

/// Rounding for horizontal extents (bearing X, advance)
///
/// Half-way cases round away from zero.
#[inline]
pub fn round_extent(v: f32) -> f32 {
    v.round()
}

/// Rounding for vertical extents (bearing Y, ascent, descent)
#[inline]
pub fn ceil_extent(v: f32) -> f32 {
    v.ceil()
}
