use bitflags::bitflags;

bitflags! {
    /// Bit layout of the control/status register.
    ///
    /// Bits 1 through 6 are plain read/write configuration. Bits 0 and 7
    /// are special: written as 0 they pulse the reset for one side of the
    /// streams, and on read they report whether that side has been touched
    /// since its last reset. They are therefore never stored; the
    /// peripheral recomputes them on every read.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Ctrl: u8 {
        /// Output-side reset pulse (active low on write) / status on read.
        const OUT_RESET = 1 << 0;
        /// Enables overflow and underflow diagnostics.
        const ERR_REPORT = 1 << 1;
        /// Enables value-range diagnostics on completed code units.
        const RANGE_CHECK = 1 << 2;
        /// Code-unit byte order: set for big-endian, clear for little.
        const BIG_ENDIAN = 1 << 3;
        /// Transfer direction: set routes data registers to pops, clear
        /// routes them to pushes.
        const DIR_READ = 1 << 4;
        /// Low bit of the code-unit width field.
        const WIDTH0 = 1 << 5;
        /// High bit of the code-unit width field.
        const WIDTH1 = 1 << 6;
        /// Input-side reset pulse (active low on write) / status on read.
        const IN_RESET = 1 << 7;

        /// The bits that are stored and read back verbatim.
        const WRITABLE = Self::ERR_REPORT.bits()
            | Self::RANGE_CHECK.bits()
            | Self::BIG_ENDIAN.bits()
            | Self::DIR_READ.bits()
            | Self::WIDTH0.bits()
            | Self::WIDTH1.bits();
    }
}

/// Transfer direction shared by both data registers.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
pub enum Direction {
    /// Data register writes push; reads are inert.
    #[default]
    Write,
    /// Data register reads pop; writes are inert.
    Read,
}

/// Framing width of one code unit in the unit buffer.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CodeUnitWidth {
    One,
    Two,
    Four,
}

impl CodeUnitWidth {
    pub const fn bytes(self) -> usize {
        match self {
            CodeUnitWidth::One => 1,
            CodeUnitWidth::Two => 2,
            CodeUnitWidth::Four => 4,
        }
    }

    /// Decodes the two-bit width field. Both unused encodings select the
    /// widest unit, so the power-on value of 0b11 means 4 bytes.
    pub fn from_field(field: u8) -> Self {
        match field & 0b11 {
            0b00 => CodeUnitWidth::One,
            0b01 => CodeUnitWidth::Two,
            _ => CodeUnitWidth::Four,
        }
    }

    /// The canonical field encoding for this width.
    pub const fn field(self) -> u8 {
        match self {
            CodeUnitWidth::One => 0b00,
            CodeUnitWidth::Two => 0b01,
            CodeUnitWidth::Four => 0b11,
        }
    }
}

/// Reset bookkeeping for one side of the streams. A side reports 1 in its
/// control-register status bit from reset until the first push (input
/// side) or pop (output side) aimed at it.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum SideStatus {
    JustReset,
    Normal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writable_mask_excludes_the_status_bits() {
        assert!(!Ctrl::WRITABLE.contains(Ctrl::OUT_RESET));
        assert!(!Ctrl::WRITABLE.contains(Ctrl::IN_RESET));
        assert_eq!(Ctrl::WRITABLE.bits(), 0x7E);
    }

    #[test]
    fn width_field_round_trips_and_aliases() {
        assert_eq!(CodeUnitWidth::from_field(0b00), CodeUnitWidth::One);
        assert_eq!(CodeUnitWidth::from_field(0b01), CodeUnitWidth::Two);
        assert_eq!(CodeUnitWidth::from_field(0b10), CodeUnitWidth::Four);
        assert_eq!(CodeUnitWidth::from_field(0b11), CodeUnitWidth::Four);
        for width in [CodeUnitWidth::One, CodeUnitWidth::Two, CodeUnitWidth::Four] {
            assert_eq!(CodeUnitWidth::from_field(width.field()), width);
        }
    }
}
