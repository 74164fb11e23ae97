use crate::WordInput;
use nightly_quirks::utils::NightlyUtils;

/*
 * Word input pulling its bytes from a read callback, one buffer at a time.  The
 * callback fills the slice it is given and returns the number of bytes
 * written, 0 meaning the source is finished.
 */
pub struct DeflateChunkedWordInput<'a> {
    buffer: Box<[u8]>,
    global_position_offset: usize,
    position: usize,
    end_position: usize,
    finished: bool,
    func: Box<dyn FnMut(&mut [u8]) -> usize + 'a>,
}

impl<'a> DeflateChunkedWordInput<'a> {
    /* A word may straddle two chunks, so the buffer holds at least two.  */
    const MIN_BUF_SIZE: usize = 4;

    pub fn new<F: FnMut(&mut [u8]) -> usize + 'a>(read_func: F, buf_size: usize) -> Self {
        Self {
            buffer: unsafe {
                NightlyUtils::box_new_uninit_slice_assume_init(buf_size.max(Self::MIN_BUF_SIZE))
            },
            global_position_offset: 0,
            position: 0,
            end_position: 0,
            finished: false,
            func: Box::new(read_func),
        }
    }

    /* Bytes handed out so far.  */
    pub fn tell_stream_pos(&self) -> usize {
        self.global_position_offset + self.position
    }

    /*
     * Move the unread tail to the front of the buffer and read until at least
     * one whole word is available or the source is finished.
     */
    #[cold]
    #[inline(never)]
    fn refill_buffer(&mut self) {
        let move_amount = self.end_position - self.position;
        self.buffer.copy_within(self.position..self.end_position, 0);
        self.global_position_offset += self.position;
        self.position = 0;
        self.end_position = move_amount;

        while !self.finished && self.end_position < 2 {
            let count = (self.func)(&mut self.buffer[self.end_position..]);
            if count == 0 {
                self.finished = true;
            }
            self.end_position += count;
        }
    }
}

impl<'a> WordInput for DeflateChunkedWordInput<'a> {
    #[inline(always)]
    fn read_word(&mut self) -> Option<u16> {
        if self.end_position - self.position < 2 {
            self.refill_buffer();
        }

        let word = match self.end_position - self.position {
            0 => return None,
            1 => self.buffer[self.position] as u16,
            _ => u16::from_le_bytes([
                self.buffer[self.position],
                self.buffer[self.position + 1],
            ]),
        };
        self.position = (self.position + 2).min(self.end_position);
        Some(word)
    }
}
