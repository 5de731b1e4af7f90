use crate::BYTE_BUFFER_DEPTH;

/// Raw byte FIFO behind the byte data register.
///
/// Producer and consumer progress are tracked separately so each side can
/// be reset on its own: an input-side reset discards contents and restarts
/// the writer, while an output-side reset only rewinds the reader, which
/// replays everything pushed since the last input-side reset.
pub(crate) struct ByteBuffer {
    data: [u8; BYTE_BUFFER_DEPTH],
    /// Bytes accepted since the last input-side reset.
    wpos: usize,
    /// Bytes handed out since the last output-side reset.
    rpos: usize,
}

impl ByteBuffer {
    pub(crate) fn new() -> Self {
        ByteBuffer {
            data: [0; BYTE_BUFFER_DEPTH],
            wpos: 0,
            rpos: 0,
        }
    }

    /// Appends one byte. A push against a full buffer is dropped without
    /// disturbing the contents.
    pub(crate) fn push(&mut self, value: u8) {
        if self.wpos < BYTE_BUFFER_DEPTH {
            self.data[self.wpos] = value;
            self.wpos += 1;
        }
    }

    /// Removes and returns the oldest unread byte, or 0 once the reader
    /// has caught up with the writer.
    pub(crate) fn pop(&mut self) -> u8 {
        if self.rpos < self.wpos {
            let value = self.data[self.rpos];
            self.rpos += 1;
            value
        } else {
            0
        }
    }

    pub(crate) fn is_full(&self) -> bool {
        self.wpos == BYTE_BUFFER_DEPTH
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.rpos >= self.wpos
    }

    /// Fill level as seen by the producer.
    pub(crate) fn level(&self) -> usize {
        self.wpos
    }

    /// Input-side reset: contents are zeroed and the writer restarts. The
    /// reader position is deliberately left alone.
    pub(crate) fn reset_input(&mut self) {
        self.data = [0; BYTE_BUFFER_DEPTH];
        self.wpos = 0;
    }

    /// Output-side reset: the reader rewinds to the start, contents and
    /// writer position survive.
    pub(crate) fn reset_output(&mut self) {
        self.rpos = 0;
    }
}
