/// Byte-wide register access, the way the integrating processor sees the
/// block: an 8-bit index space, one byte per transfer.
///
/// Reads take `&mut self` because reading a data register in read
/// direction pops a buffer.
pub trait RegisterBus {
    fn read_reg(&mut self, index: u8) -> u8;
    fn write_reg(&mut self, index: u8, value: u8);
}
