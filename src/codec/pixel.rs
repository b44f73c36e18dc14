//! RGBA pixels and the signed deltas between them

use std::fmt;

/// A 4-channel signed delta, applied to pixels with wrapping arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeltaVector(pub [i8; 4]);

impl DeltaVector {
    /// Reserved continuation marker; never assigned to an instruction.
    pub const ZERO: DeltaVector = DeltaVector([0; 4]);

    pub fn is_zero(self) -> bool {
        self == Self::ZERO
    }
}

impl fmt::Display for DeltaVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.0;
        write!(f, "({:+}, {:+}, {:+}, {:+})", r, g, b, a)
    }
}

/// One carrier pixel: red, green, blue, alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Pixel(pub [u8; 4]);

impl Pixel {
    /// Base pixel used when a stream starts at the very first carrier pixel.
    pub const SENTINEL: Pixel = Pixel([0, 0, 0, 255]);

    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Pixel([r, g, b, a])
    }

    /// `self + delta`, each channel modulo 256.
    pub fn offset(self, delta: DeltaVector) -> Pixel {
        let mut out = self.0;
        for (channel, d) in out.iter_mut().zip(delta.0) {
            *channel = channel.wrapping_add(d as u8);
        }
        Pixel(out)
    }

    /// The delta that takes `previous` to `self`, each channel modulo 256.
    pub fn delta_from(self, previous: Pixel) -> DeltaVector {
        let mut out = [0i8; 4];
        for (i, d) in out.iter_mut().enumerate() {
            *d = self.0[i].wrapping_sub(previous.0[i]) as i8;
        }
        DeltaVector(out)
    }
}

impl fmt::Display for Pixel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.0;
        write!(f, "#{:02x}{:02x}{:02x}{:02x}", r, g, b, a)
    }
}
