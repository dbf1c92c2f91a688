use core::fmt;

/// Implicit scale factor of a raw sensor value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scale {
    Unit,
    Centi,
    Milli,
}

impl Scale {
    pub const fn divisor(self) -> u32 {
        match self {
            Scale::Unit => 1,
            Scale::Centi => 100,
            Scale::Milli => 1000,
        }
    }

    /// Number of fraction digits printed for this scale
    pub const fn digits(self) -> usize {
        match self {
            Scale::Unit => 0,
            Scale::Centi => 2,
            Scale::Milli => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedPoint {
    raw: i32,
    scale: Scale,
}

impl FixedPoint {
    pub const fn new(raw: i32, scale: Scale) -> Self {
        Self { raw, scale }
    }

    pub const fn raw(&self) -> i32 {
        self.raw
    }

    pub const fn scale(&self) -> Scale {
        self.scale
    }
}

/// Prints `integer.fraction`, the fraction zero padded to the scale's
/// digit count and the sign carried by the whole value
impl fmt::Display for FixedPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scale == Scale::Unit {
            return write!(f, "{}", self.raw);
        }
        let divisor = self.scale.divisor();
        let magnitude = self.raw.unsigned_abs();
        let sign = if self.raw < 0 { "-" } else { "" };
        write!(
            f,
            "{sign}{}.{:0width$}",
            magnitude / divisor,
            magnitude % divisor,
            width = self.scale.digits()
        )
    }
}
