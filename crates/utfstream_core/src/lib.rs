pub mod bus;
pub mod control;
pub mod peripheral;

mod byte_buffer;
mod unit_buffer;

pub use bus::RegisterBus;
pub use control::{CodeUnitWidth, Ctrl, Direction};
pub use peripheral::{flags, level, reg, PowerOnConfig, StreamPeripheral};

/// Capacity of the raw byte buffer, in bytes.
pub const BYTE_BUFFER_DEPTH: usize = 6;

/// Capacity of the code-unit buffer, in bytes. Shared by every configured
/// unit width, so it holds four 1-byte units, two 2-byte units or one
/// 4-byte unit.
pub const UNIT_BUFFER_DEPTH: usize = 4;

/// Size of the architected register window. Indices past the last defined
/// register still decode (reads return 0, writes are dropped).
pub const REGISTER_COUNT: usize = 16;
