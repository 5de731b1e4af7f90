use typed_builder::TypedBuilder;

use crate::bus::RegisterBus;
use crate::byte_buffer::ByteBuffer;
use crate::control::{CodeUnitWidth, Ctrl, Direction, SideStatus};
use crate::unit_buffer::UnitBuffer;

/// Register indices inside the peripheral's window. Everything from
/// `BYTE_LEVEL + 1` up is reserved: reads return 0, writes are dropped.
pub mod reg {
    /// Control/status register.
    pub const CTRL: u8 = 0x0;
    /// Byte buffer data port.
    pub const BYTE_DATA: u8 = 0x1;
    /// Code-unit buffer data port.
    pub const UNIT_DATA: u8 = 0x2;
    /// Combined full/empty flags for both buffers.
    pub const FLAGS: u8 = 0x3;
    /// Byte buffer fill level and flags.
    pub const BYTE_LEVEL: u8 = 0x4;
    /// Code-unit buffer fill level and flags.
    pub const UNIT_LEVEL: u8 = 0x5;
}

/// Bit assignments of the `FLAGS` register.
pub mod flags {
    pub const BYTE_FULL: u8 = 1 << 0;
    pub const BYTE_EMPTY: u8 = 1 << 1;
    pub const UNIT_FULL: u8 = 1 << 2;
    pub const UNIT_EMPTY: u8 = 1 << 3;
}

/// Shared layout of the two level registers: the low nibble carries the
/// fill level in bytes, bit 6 the full flag, bit 7 the empty flag.
pub mod level {
    pub const COUNT_MASK: u8 = 0x0F;
    pub const FULL: u8 = 1 << 6;
    pub const EMPTY: u8 = 1 << 7;
}

/// Control-register state latched at power-on.
///
/// The defaults mirror the straps the block ships with: both diagnostics
/// enabled, big-endian framing, 4-byte units, write direction.
#[derive(TypedBuilder, Clone, Copy, Debug)]
pub struct PowerOnConfig {
    #[builder(default = true)]
    pub error_reporting: bool,
    #[builder(default = true)]
    pub range_check: bool,
    #[builder(default = true)]
    pub big_endian: bool,
    #[builder(default)]
    pub direction: Direction,
    #[builder(default = CodeUnitWidth::Four)]
    pub width: CodeUnitWidth,
}

impl Default for PowerOnConfig {
    fn default() -> Self {
        PowerOnConfig::builder().build()
    }
}

impl PowerOnConfig {
    fn to_ctrl(self) -> Ctrl {
        let mut ctrl = Ctrl::from_bits_retain(self.width.field() << 5);
        ctrl.set(Ctrl::ERR_REPORT, self.error_reporting);
        ctrl.set(Ctrl::RANGE_CHECK, self.range_check);
        ctrl.set(Ctrl::BIG_ENDIAN, self.big_endian);
        ctrl.set(Ctrl::DIR_READ, self.direction == Direction::Read);
        ctrl
    }
}

/// The stream peripheral: one control/status register in front of a raw
/// byte buffer and a code-unit buffer, addressed through [`RegisterBus`].
///
/// Both buffers share the configured transfer direction. In write
/// direction the data registers push and reads of them return 0; in read
/// direction reads pop destructively and writes are dropped.
pub struct StreamPeripheral {
    /// Stored configuration bits. The two reset/status bits are computed
    /// on read from the side states below, never stored here.
    ctrl: Ctrl,
    byte: ByteBuffer,
    unit: UnitBuffer,
    input_side: SideStatus,
    output_side: SideStatus,
    power_on: PowerOnConfig,
}

impl Default for StreamPeripheral {
    fn default() -> Self {
        StreamPeripheral::new()
    }
}

impl StreamPeripheral {
    pub fn new() -> Self {
        StreamPeripheral::with_power_on(PowerOnConfig::default())
    }

    pub fn with_power_on(power_on: PowerOnConfig) -> Self {
        StreamPeripheral {
            ctrl: power_on.to_ctrl() & Ctrl::WRITABLE,
            byte: ByteBuffer::new(),
            unit: UnitBuffer::new(),
            input_side: SideStatus::JustReset,
            output_side: SideStatus::JustReset,
            power_on,
        }
    }

    /// Full power-on reset: buffers cleared, configuration restored to the
    /// latched power-on state, both status bits reading 1 again.
    pub fn reset(&mut self) {
        *self = StreamPeripheral::with_power_on(self.power_on);
    }

    pub fn direction(&self) -> Direction {
        if self.ctrl.contains(Ctrl::DIR_READ) {
            Direction::Read
        } else {
            Direction::Write
        }
    }

    pub fn big_endian(&self) -> bool {
        self.ctrl.contains(Ctrl::BIG_ENDIAN)
    }

    pub fn code_unit_width(&self) -> CodeUnitWidth {
        CodeUnitWidth::from_field(self.ctrl.bits() >> 5)
    }

    pub fn error_reporting_enabled(&self) -> bool {
        self.ctrl.contains(Ctrl::ERR_REPORT)
    }

    pub fn range_check_enabled(&self) -> bool {
        self.ctrl.contains(Ctrl::RANGE_CHECK)
    }

    fn write_ctrl(&mut self, value: u8) {
        let incoming = Ctrl::from_bits_retain(value);
        self.ctrl = incoming & Ctrl::WRITABLE;

        // The reset bits are active low on write: a 0 pulses that side,
        // a 1 leaves it alone so configuration can change mid-stream.
        if !incoming.contains(Ctrl::OUT_RESET) {
            self.pulse_output_reset();
        }
        if !incoming.contains(Ctrl::IN_RESET) {
            self.pulse_input_reset();
        }
    }

    fn read_ctrl(&self) -> u8 {
        let mut value = self.ctrl;
        value.set(Ctrl::OUT_RESET, self.output_side == SideStatus::JustReset);
        value.set(Ctrl::IN_RESET, self.input_side == SideStatus::JustReset);
        value.bits()
    }

    fn pulse_input_reset(&mut self) {
        log::debug!("input-side reset pulse");
        self.byte.reset_input();
        self.unit.reset_input();
        self.input_side = SideStatus::JustReset;
    }

    fn pulse_output_reset(&mut self) {
        log::debug!("output-side reset pulse");
        self.byte.reset_output();
        self.unit.reset_output();
        self.output_side = SideStatus::JustReset;
    }

    fn write_byte_data(&mut self, value: u8) {
        if self.direction() != Direction::Write {
            return;
        }
        self.input_side = SideStatus::Normal;
        let dropped = self.byte.is_full();
        self.byte.push(value);
        if dropped && self.error_reporting_enabled() {
            log::debug!("byte push 0x{:02X} dropped, buffer full", value);
        }
    }

    fn read_byte_data(&mut self) -> u8 {
        if self.direction() != Direction::Read {
            return 0;
        }
        self.output_side = SideStatus::Normal;
        let starved = self.byte.is_empty();
        let value = self.byte.pop();
        if starved && self.error_reporting_enabled() {
            log::debug!("byte pop with nothing buffered");
        }
        value
    }

    fn write_unit_data(&mut self, value: u8) {
        if self.direction() != Direction::Write {
            return;
        }
        self.input_side = SideStatus::Normal;
        let width = self.code_unit_width();
        let big_endian = self.big_endian();
        let dropped = self.unit.is_full();
        self.unit.push(value, width, big_endian);
        if dropped {
            if self.error_reporting_enabled() {
                log::debug!("unit push 0x{:02X} dropped, buffer full", value);
            }
            return;
        }
        if self.range_check_enabled()
            && width == CodeUnitWidth::Four
            && self.unit.level() % width.bytes() == 0
        {
            let base = self.unit.level() - width.bytes();
            let unit = self.unit.unit_value_at(base, width, big_endian);
            if char::from_u32(unit).is_none() {
                log::warn!("completed code unit 0x{:08X} is not a Unicode scalar", unit);
            }
        }
    }

    fn read_unit_data(&mut self) -> u8 {
        if self.direction() != Direction::Read {
            return 0;
        }
        self.output_side = SideStatus::Normal;
        let width = self.code_unit_width();
        let big_endian = self.big_endian();
        let starved = self.unit.is_empty(width, big_endian);
        let value = self.unit.pop(width, big_endian);
        if starved && self.error_reporting_enabled() {
            log::debug!("unit pop with nothing buffered");
        }
        value
    }

    fn read_flags(&self) -> u8 {
        let width = self.code_unit_width();
        let big_endian = self.big_endian();
        let mut value = 0;
        if self.byte.is_full() {
            value |= flags::BYTE_FULL;
        }
        if self.byte.is_empty() {
            value |= flags::BYTE_EMPTY;
        }
        if self.unit.is_full() {
            value |= flags::UNIT_FULL;
        }
        if self.unit.is_empty(width, big_endian) {
            value |= flags::UNIT_EMPTY;
        }
        value
    }

    fn read_byte_level(&self) -> u8 {
        let mut value = self.byte.level() as u8 & level::COUNT_MASK;
        if self.byte.is_full() {
            value |= level::FULL;
        }
        if self.byte.is_empty() {
            value |= level::EMPTY;
        }
        value
    }

    fn read_unit_level(&self) -> u8 {
        let mut value = self.unit.level() as u8 & level::COUNT_MASK;
        if self.unit.is_full() {
            value |= level::FULL;
        }
        if self.unit.is_empty(self.code_unit_width(), self.big_endian()) {
            value |= level::EMPTY;
        }
        value
    }
}

impl RegisterBus for StreamPeripheral {
    fn read_reg(&mut self, index: u8) -> u8 {
        let value = match index {
            reg::CTRL => self.read_ctrl(),
            reg::BYTE_DATA => self.read_byte_data(),
            reg::UNIT_DATA => self.read_unit_data(),
            reg::FLAGS => self.read_flags(),
            reg::BYTE_LEVEL => self.read_byte_level(),
            reg::UNIT_LEVEL => self.read_unit_level(),
            _ => 0,
        };
        log::trace!("reg {} read -> 0x{:02X}", index, value);
        value
    }

    fn write_reg(&mut self, index: u8, value: u8) {
        log::trace!("reg {} write 0x{:02X}", index, value);
        match index {
            reg::CTRL => self.write_ctrl(value),
            reg::BYTE_DATA => self.write_byte_data(value),
            reg::UNIT_DATA => self.write_unit_data(value),
            _ => {}
        }
    }
}
