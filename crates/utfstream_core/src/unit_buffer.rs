use crate::control::CodeUnitWidth;
use crate::UNIT_BUFFER_DEPTH;

/// Code-unit packing FIFO behind the unit data register.
///
/// The backing store is carved into consecutive units of the configured
/// width. Little-endian placement appends each byte in arrival order.
/// Big-endian placement accumulates the unit under construction the way a
/// shift register would: every push slides that unit's bytes one slot
/// toward its base and lands the new byte at the far end. A completed unit
/// therefore drains in push order, and a partially filled one drains as
/// its value zero-padded from the high end.
///
/// The reader has its own position so the output side can be rewound
/// without touching what the writer has placed.
pub(crate) struct UnitBuffer {
    data: [u8; UNIT_BUFFER_DEPTH],
    /// Bytes accepted since the last input-side reset.
    wpos: usize,
    /// Bytes handed out since the last output-side reset.
    rpos: usize,
}

impl UnitBuffer {
    pub(crate) fn new() -> Self {
        UnitBuffer {
            data: [0; UNIT_BUFFER_DEPTH],
            wpos: 0,
            rpos: 0,
        }
    }

    /// Appends one byte under the given framing. A push against a full
    /// buffer is dropped and the stored units keep their positions.
    pub(crate) fn push(&mut self, value: u8, width: CodeUnitWidth, big_endian: bool) {
        if self.wpos == UNIT_BUFFER_DEPTH {
            return;
        }
        if big_endian {
            let w = width.bytes();
            // Base of the unit currently being filled. The slide stays
            // inside that unit, so completed units are never disturbed.
            let base = self.wpos - self.wpos % w;
            self.data.copy_within(base + 1..base + w, base);
            self.data[base + w - 1] = value;
        } else {
            self.data[self.wpos] = value;
        }
        self.wpos += 1;
    }

    /// Removes and returns the next drainable byte, or 0 once the reader
    /// has consumed everything the current framing exposes.
    pub(crate) fn pop(&mut self, width: CodeUnitWidth, big_endian: bool) -> u8 {
        if self.rpos < self.drainable(width, big_endian) {
            let value = self.data[self.rpos];
            self.rpos += 1;
            value
        } else {
            0
        }
    }

    /// Number of bytes the reader may take. Big-endian framing rounds the
    /// writer's progress up to a whole unit, because a partial unit is
    /// served with its zero padding; an untouched buffer exposes nothing.
    fn drainable(&self, width: CodeUnitWidth, big_endian: bool) -> usize {
        if big_endian && self.wpos > 0 {
            let w = width.bytes();
            self.wpos.div_ceil(w) * w
        } else {
            self.wpos
        }
    }

    pub(crate) fn is_full(&self) -> bool {
        self.wpos == UNIT_BUFFER_DEPTH
    }

    pub(crate) fn is_empty(&self, width: CodeUnitWidth, big_endian: bool) -> bool {
        self.rpos >= self.drainable(width, big_endian)
    }

    /// Fill level as seen by the producer.
    pub(crate) fn level(&self) -> usize {
        self.wpos
    }

    /// Value of the completed unit starting at `base`, decoded under the
    /// given framing. `base` must be the start of a fully written unit.
    pub(crate) fn unit_value_at(&self, base: usize, width: CodeUnitWidth, big_endian: bool) -> u32 {
        let bytes = &self.data[base..base + width.bytes()];
        if big_endian {
            bytes.iter().fold(0u32, |acc, &b| (acc << 8) | u32::from(b))
        } else {
            bytes.iter().rev().fold(0u32, |acc, &b| (acc << 8) | u32::from(b))
        }
    }

    /// Input-side reset: contents are zeroed and the writer restarts.
    /// Zeroing matters for big-endian framing, which serves the untouched
    /// slots of a partial unit as padding.
    pub(crate) fn reset_input(&mut self) {
        self.data = [0; UNIT_BUFFER_DEPTH];
        self.wpos = 0;
    }

    /// Output-side reset: the reader rewinds, contents survive.
    pub(crate) fn reset_output(&mut self) {
        self.rpos = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::CodeUnitWidth::{Four, One, Two};

    fn drain(buffer: &mut UnitBuffer, width: CodeUnitWidth, big_endian: bool, count: usize) -> Vec<u8> {
        (0..count).map(|_| buffer.pop(width, big_endian)).collect()
    }

    #[test]
    fn little_endian_keeps_arrival_order() {
        let mut buffer = UnitBuffer::new();
        buffer.push(111, Four, false);
        buffer.push(222, Four, false);
        assert_eq!(drain(&mut buffer, Four, false, 5), [111, 222, 0, 0, 0]);
        assert!(buffer.is_empty(Four, false));
    }

    #[test]
    fn big_endian_full_unit_drains_in_push_order() {
        let mut buffer = UnitBuffer::new();
        for value in [11, 22, 33, 44] {
            buffer.push(value, Four, true);
        }
        assert!(buffer.is_full());
        assert_eq!(drain(&mut buffer, Four, true, 4), [11, 22, 33, 44]);
        assert!(buffer.is_empty(Four, true));
    }

    #[test]
    fn big_endian_partial_unit_is_padded_from_the_high_end() {
        let mut buffer = UnitBuffer::new();
        buffer.push(111, Four, true);
        buffer.push(222, Four, true);
        assert!(!buffer.is_empty(Four, true));
        assert_eq!(drain(&mut buffer, Four, true, 5), [0, 0, 111, 222, 0]);
    }

    #[test]
    fn big_endian_width_two_frames_pairs_independently() {
        let mut buffer = UnitBuffer::new();
        buffer.push(0x11, Two, true);
        buffer.push(0x22, Two, true);
        buffer.push(0x33, Two, true);
        assert_eq!(drain(&mut buffer, Two, true, 4), [0x11, 0x22, 0x00, 0x33]);
    }

    #[test]
    fn width_one_matches_arrival_order_in_both_byte_orders() {
        let mut little = UnitBuffer::new();
        let mut big = UnitBuffer::new();
        for value in [5, 6, 7] {
            little.push(value, One, false);
            big.push(value, One, true);
        }
        assert_eq!(drain(&mut little, One, false, 3), [5, 6, 7]);
        assert_eq!(drain(&mut big, One, true, 3), [5, 6, 7]);
    }

    #[test]
    fn push_against_full_buffer_does_not_slide() {
        let mut buffer = UnitBuffer::new();
        for value in [11, 22, 33, 44] {
            buffer.push(value, Four, true);
        }
        buffer.push(55, Four, true);
        assert_eq!(buffer.level(), UNIT_BUFFER_DEPTH);
        assert_eq!(drain(&mut buffer, Four, true, 4), [11, 22, 33, 44]);
    }

    #[test]
    fn output_reset_replays_the_padded_unit() {
        let mut buffer = UnitBuffer::new();
        buffer.push(111, Four, true);
        buffer.push(222, Four, true);
        let first = drain(&mut buffer, Four, true, 4);
        buffer.reset_output();
        let second = drain(&mut buffer, Four, true, 4);
        assert_eq!(first, second);
    }

    #[test]
    fn input_reset_clears_the_padding_source() {
        let mut buffer = UnitBuffer::new();
        for value in [0xAA, 0xBB, 0xCC, 0xDD] {
            buffer.push(value, One, false);
        }
        buffer.reset_input();
        buffer.reset_output();
        buffer.push(1, Four, true);
        assert_eq!(drain(&mut buffer, Four, true, 4), [0, 0, 0, 1]);
    }

    #[test]
    fn unit_values_decode_per_byte_order() {
        let mut big = UnitBuffer::new();
        for value in [0x00, 0x01, 0xF4, 0x89] {
            big.push(value, Four, true);
        }
        assert_eq!(big.unit_value_at(0, Four, true), 0x0001_F489);

        let mut little = UnitBuffer::new();
        for value in [0x89, 0xF4, 0x01, 0x00] {
            little.push(value, Four, false);
        }
        assert_eq!(little.unit_value_at(0, Four, false), 0x0001_F489);
    }
}
