use crate::{DecodeError, WordInput};

type BitBufType = u64;

/*
 * LSB-first reader over a stream of 16-bit words.
 *
 *	- bitbuf: bits that have been read from the input but not consumed yet.
 *		  The buffered bits are right-aligned (they're the low-order bits)
 *		  and everything above 'bitsleft' is zero.
 *
 *	- bitsleft: number of bits in 'bitbuf' that are valid.
 *
 *	- in_cntr: bytes fetched from the input so far, in whole words.
 *
 * The reader never fetches past 'input_size' bytes.  Once the input is
 * exhausted, lookups see zero padding above 'bitsleft'; consumers must compare
 * the bits they need against 'bitsleft' before trusting a decoded value.
 */
pub struct BitStream<'a, I: WordInput> {
    bitbuf: BitBufType,
    pub bitsleft: usize,
    in_cntr: usize,
    input_size: usize,
    exhausted: bool,
    pub input_stream: &'a mut I,
}

/*
 * Number of bits the bitbuffer variable can hold.
 */
pub const BITBUF_MAXBITS: usize = 8 * std::mem::size_of::<BitBufType>();

/* Bits guaranteed by refill() and refill_wide() while input remains.  */
pub const REFILL_BITS: usize = 32;
pub const WIDE_REFILL_BITS: usize = BITBUF_MAXBITS - 16;

const_assert!(WIDE_REFILL_BITS >= 48);

impl<'a, I: WordInput> BitStream<'a, I> {
    pub fn new(input_stream: &'a mut I, input_size: usize) -> Self {
        Self {
            bitbuf: 0,
            bitsleft: 0,
            in_cntr: 0,
            input_size,
            exhausted: false,
            input_stream,
        }
    }

    /*
     * Bytes of input fetched so far, never more than the declared size.
     */
    #[inline(always)]
    pub fn bytes_consumed(&self) -> usize {
        self.in_cntr.min(self.input_size)
    }

    #[inline(always)]
    pub fn bit_position(&self) -> usize {
        self.bytes_consumed() * 8 - self.bitsleft
    }

    #[inline(always)]
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /*
     * Fetch the next word from the input, honoring the declared input size.
     * Returns the word and the number of its bits that are real data: the last
     * word of an odd-sized input only carries one byte.
     */
    #[inline(always)]
    fn next_word(&mut self) -> Option<(u16, usize)> {
        if self.exhausted || self.in_cntr >= self.input_size {
            self.exhausted = true;
            return None;
        }

        match self.input_stream.read_word() {
            Some(word) => {
                let remaining = self.input_size - self.in_cntr;
                self.in_cntr += 2;
                if remaining == 1 {
                    Some((word & 0xFF, 8))
                } else {
                    Some((word, 16))
                }
            }
            None => {
                self.exhausted = true;
                None
            }
        }
    }

    #[inline(always)]
    fn fill_word(&mut self) -> bool {
        match self.next_word() {
            Some((word, nbits)) => {
                self.bitbuf |= (word as BitBufType) << self.bitsleft;
                self.bitsleft += nbits;
                true
            }
            None => false,
        }
    }

    /*
     * Load words until at least 32 bits are buffered or the input ends.
     */
    #[inline(always)]
    pub fn refill(&mut self) {
        while self.bitsleft < REFILL_BITS && self.fill_word() {}
    }

    /*
     * Load words until at least 48 bits are buffered or the input ends.  Used by
     * the pipelined emitter, which peeks past the codeword being consumed.
     */
    #[inline(always)]
    pub fn refill_wide(&mut self) {
        while self.bitsleft <= WIDE_REFILL_BITS && self.fill_word() {}
    }

    /*
     * Does the bitbuffer variable currently contain at least 'n' bits?
     */
    #[inline(always)]
    pub fn have_bits(&self, n: usize) -> bool {
        self.bitsleft >= n
    }

    /*
     * Load more bits until 'n' bits are present, failing if the input ends
     * first.  'n' cannot be larger than REFILL_BITS.
     */
    #[inline(always)]
    pub fn ensure_bits(&mut self, n: usize) -> Result<(), DecodeError> {
        debug_assert!(n <= REFILL_BITS);
        if !self.have_bits(n) {
            self.refill();
            if !self.have_bits(n) {
                return Err(DecodeError::UnexpectedEof);
            }
        }
        Ok(())
    }

    /*
     * Return the next 'n' bits from the bitbuffer variable without removing them.
     */
    #[inline(always)]
    pub fn bits(&self, n: u32) -> u32 {
        (self.bitbuf & ((1 << n) - 1)) as u32
    }

    /*
     * Hide the next 'o' bits and return the next 'n' bits from the bitbuffer variable without removing them.
     */
    #[inline(always)]
    pub fn bits_with_offset(&self, o: u32, n: u32) -> u32 {
        ((self.bitbuf >> o) & ((1 << n) - 1)) as u32
    }

    /*
     * Remove the next 'n' bits from the bitbuffer variable.
     */
    #[inline(always)]
    pub fn remove_bits(&mut self, n: usize) {
        debug_assert!(n <= self.bitsleft);
        self.bitbuf >>= n;
        self.bitsleft -= n;
    }

    /*
     * Remove and return the next 'n' bits from the bitbuffer variable.
     */
    #[inline(always)]
    pub fn pop_bits(&mut self, n: usize) -> u32 {
        let tmp = self.bits(n as u32);
        self.remove_bits(n);
        tmp
    }

    /*
     * Like pop_bits(), but loads the bits first and fails if the input cannot
     * provide them.
     */
    #[inline(always)]
    pub fn try_pop_bits(&mut self, n: usize) -> Result<u32, DecodeError> {
        self.ensure_bits(n)?;
        Ok(self.pop_bits(n))
    }

    /*
     * Discard the remaining bits of the current byte.  Whole buffered bytes are
     * kept, so this is valid at any point of the stream.
     */
    #[inline(always)]
    pub fn align_input(&mut self) {
        self.remove_bits(self.bitsleft & 7);
    }

    /*
     * Fetch one word and ignore its contents, as done for the 2-byte header in
     * front of the first block.  Must be called before any bits are buffered.
     */
    pub fn skip_word(&mut self) -> Result<(), DecodeError> {
        debug_assert_eq!(self.bitsleft, 0);
        match self.next_word() {
            Some(_) => Ok(()),
            None => Err(DecodeError::UnexpectedEof),
        }
    }

    /*
     * Read and discard whatever is left of the declared input, including the
     * buffered bits.  Returns the number of words fetched.
     */
    pub fn drain_input(&mut self) -> usize {
        let mut words = 0;
        while self.next_word().is_some() {
            words += 1;
        }
        self.bitbuf = 0;
        self.bitsleft = 0;
        words
    }
}

#[cfg(test)]
mod tests {
    use crate::{bitstream::BitStream, streams::word_slice_input::WordSliceInput, DecodeError};

    #[test]
    fn test_bitstream() {
        let data = [0x12, 0x34, 0x56, 0x78, 0x01, 0x23, 0x45, 0x67, 0x89];
        let mut input = WordSliceInput::new(&data);
        let mut bitstream = BitStream::new(&mut input, data.len());

        bitstream.refill();
        assert_eq!(bitstream.bitsleft, 32);
        assert_eq!(bitstream.bits(16), 0x3412);

        bitstream.remove_bits(7);
        bitstream.refill();
        bitstream.remove_bits(9);
        bitstream.refill();

        assert_eq!(bitstream.bytes_consumed(), 6);
        assert_eq!(bitstream.bit_position(), 16);
        assert_eq!(bitstream.bits(12), 0x856);
        assert_eq!(bitstream.bits_with_offset(4, 8), 0x85);
    }

    #[test]
    fn odd_tail_counts_one_byte() {
        let data = [0xFF, 0xFF, 0xAB];
        let mut input = WordSliceInput::new(&data);
        let mut bitstream = BitStream::new(&mut input, data.len());

        bitstream.refill_wide();
        assert_eq!(bitstream.bitsleft, 24);
        assert!(bitstream.is_exhausted());
        assert_eq!(bitstream.bytes_consumed(), 3);

        assert_eq!(bitstream.try_pop_bits(16), Ok(0xFFFF));
        assert_eq!(bitstream.try_pop_bits(8), Ok(0xAB));
        assert_eq!(bitstream.bits(16), 0);
        assert_eq!(bitstream.try_pop_bits(1), Err(DecodeError::UnexpectedEof));
    }

    #[test]
    fn declared_size_limits_reads() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06];
        let mut input = WordSliceInput::new(&data);
        let mut bitstream = BitStream::new(&mut input, 4);

        bitstream.refill();
        assert_eq!(bitstream.bitsleft, 32);
        bitstream.refill_wide();
        assert_eq!(bitstream.bitsleft, 32);
        assert_eq!(bitstream.bytes_consumed(), 4);
        assert_eq!(bitstream.drain_input(), 0);
    }

    #[test]
    fn align_and_drain() {
        let data = [0xFF, 0x0F, 0x34, 0x12, 0x00, 0x00, 0x00, 0x00];
        let mut input = WordSliceInput::new(&data);
        let mut bitstream = BitStream::new(&mut input, data.len());

        bitstream.skip_word().unwrap();
        assert_eq!(bitstream.try_pop_bits(3), Ok(0x4));
        bitstream.align_input();
        assert_eq!(bitstream.bitsleft, 24);
        assert_eq!(bitstream.try_pop_bits(8), Ok(0x12));

        assert_eq!(bitstream.drain_input(), 1);
        assert_eq!(bitstream.bytes_consumed(), data.len());
        assert_eq!(bitstream.bitsleft, 0);
    }
}
