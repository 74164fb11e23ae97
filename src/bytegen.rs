/*
 * Symbol emitters: decode the Huffman-coded body of one block into packets,
 * up to and including its end-of-block symbol.
 *
 * A match takes two lookups, the length in the literal/length table and the
 * distance in the offset table.  The length is staged until its distance has
 * been decoded, then both are written as a single packet.
 *
 * The emitters never read bits that aren't there: before an entry is consumed,
 * its codeword (and extra bits) are checked against the valid bits of the
 * buffer.  Running out inside a match ends the block with
 * DecodeOutcome::IncompleteMatch; running out anywhere else is an error.
 */

use crate::bitstream::BitStream;
use crate::decompress_deflate::DecodeOutcome;
use crate::decompress_utils::decode_entry::{DecodeEntry, DecodeTable};
use crate::decompress_utils::TableLayout;
use crate::packet::Packet;
use crate::{DecodeError, PacketOutput, WordInput};
use nightly_quirks::branch_pred::{likely, unlikely};

/*
 * Outcome of a codeword whose bits aren't all in the buffer.  'in_match' is
 * set when a length has been consumed, or the codeword itself is a length or
 * distance whose extra bits are missing.
 */
#[cold]
fn truncated(in_match: bool) -> Result<DecodeOutcome, DecodeError> {
    if in_match {
        log::debug!("Input ends inside a match");
        Ok(DecodeOutcome::IncompleteMatch)
    } else {
        Err(DecodeError::UnexpectedEof)
    }
}

#[inline(always)]
fn end_of_block(expecting_distance: bool) -> DecodeOutcome {
    if expecting_distance {
        DecodeOutcome::IncompleteMatch
    } else {
        DecodeOutcome::CleanEnd
    }
}

/*
 * Lookup state: the table region the next codeword is resolved in and how
 * many bits index it.
 */
#[derive(Clone, Copy)]
struct Lookup {
    base: usize,
    nbits: u32,
}

impl Lookup {
    #[inline(always)]
    fn litlen(layout: &TableLayout) -> Self {
        Self {
            base: 0,
            nbits: layout.litlen_bits,
        }
    }

    #[inline(always)]
    fn offset(layout: &TableLayout) -> Self {
        Self {
            base: layout.offset_base,
            nbits: layout.offset_bits,
        }
    }

    #[inline(always)]
    fn subtable(layout: &TableLayout, expecting_distance: bool, pointer: &DecodeEntry) -> Self {
        let table_start = if expecting_distance {
            layout.offset_base
        } else {
            0
        };
        Self {
            base: table_start + pointer.val as usize,
            nbits: pointer.extra_bits(),
        }
    }
}

/*
 * Generic emitter.  Each iteration consumes one table entry, refills, and only
 * then resolves the next entry from the buffer.
 */
pub fn bytegen<I: WordInput, O: PacketOutput>(
    input_bitstream: &mut BitStream<I>,
    table: &DecodeTable,
    layout: &TableLayout,
    output: &mut O,
) -> Result<DecodeOutcome, DecodeError> {
    let mut expecting_distance = false;
    let mut pending_length = 0;
    let mut lookup = Lookup::litlen(layout);

    loop {
        input_bitstream.refill();

        let entry =
            table.entry(lookup.base + input_bitstream.bits(lookup.nbits) as usize);

        if unlikely(!input_bitstream.have_bits(entry.bits as usize)) {
            return truncated(expecting_distance);
        }
        input_bitstream.remove_bits(entry.bits as usize);

        if likely(entry.is_literal()) {
            output.write_packet(Packet::literal(entry.val as u8), false)?;
            lookup = Lookup::litlen(layout);
        } else if entry.is_base() {
            let extra = entry.extra_bits() as usize;
            if unlikely(!input_bitstream.have_bits(extra)) {
                return truncated(true);
            }
            let value = entry.val as u32 + input_bitstream.pop_bits(extra);

            if expecting_distance {
                output.write_packet(Packet::matched(pending_length, value), false)?;
                lookup = Lookup::litlen(layout);
            } else {
                pending_length = value;
                lookup = Lookup::offset(layout);
            }
            expecting_distance = !expecting_distance;
        } else if entry.is_subtable_pointer() {
            lookup = Lookup::subtable(layout, expecting_distance, &entry);
        } else if entry.is_end_of_block() {
            return Ok(end_of_block(expecting_distance));
        } else {
            return Err(DecodeError::InvalidSymbol);
        }
    }
}

/*
 * Pipelined emitter.  The buffer is kept at 48 bits or more, so that the
 * lookups that can follow the current entry (back to the literal/length table,
 * or on to the offset table after a length) are computed from the unshifted
 * buffer while the entry is being classified.  A codeword plus its extra bits
 * is at most 28 bits, which leaves every speculative lookup inside valid bits.
 */
pub fn huffman_bytegen<I: WordInput, O: PacketOutput>(
    input_bitstream: &mut BitStream<I>,
    table: &DecodeTable,
    layout: &TableLayout,
    output: &mut O,
) -> Result<DecodeOutcome, DecodeError> {
    let mut expecting_distance = false;
    let mut pending_length = 0;

    input_bitstream.refill_wide();
    let mut entry = table.entry(input_bitstream.bits(layout.litlen_bits) as usize);

    loop {
        let len1 = entry.bits as u32;
        let len2 = if entry.is_base() {
            entry.extra_bits()
        } else {
            0
        };

        if unlikely(!input_bitstream.have_bits(len1 as usize)) {
            return truncated(expecting_distance);
        }
        if unlikely(!input_bitstream.have_bits((len1 + len2) as usize)) {
            return truncated(true);
        }

        let next_litlen = input_bitstream.bits_with_offset(len1 + len2, layout.litlen_bits) as usize;
        let next_offset = layout.offset_base
            + input_bitstream.bits_with_offset(len1 + len2, layout.offset_bits) as usize;

        let next_index = if likely(entry.is_literal()) {
            output.write_packet(Packet::literal(entry.val as u8), false)?;
            next_litlen
        } else if entry.is_base() {
            let value = entry.val as u32 + input_bitstream.bits_with_offset(len1, len2);
            expecting_distance = !expecting_distance;
            if expecting_distance {
                pending_length = value;
                next_offset
            } else {
                output.write_packet(Packet::matched(pending_length, value), false)?;
                next_litlen
            }
        } else if entry.is_subtable_pointer() {
            let lookup = Lookup::subtable(layout, expecting_distance, &entry);
            lookup.base + input_bitstream.bits_with_offset(len1, lookup.nbits) as usize
        } else if entry.is_end_of_block() {
            input_bitstream.remove_bits(len1 as usize);
            return Ok(end_of_block(expecting_distance));
        } else {
            return Err(DecodeError::InvalidSymbol);
        };

        input_bitstream.remove_bits((len1 + len2) as usize);
        input_bitstream.refill_wide();
        entry = table.entry(next_index);
    }
}

#[cfg(test)]
mod tests {
    use super::{bytegen, huffman_bytegen};
    use crate::bitstream::BitStream;
    use crate::decompress_deflate::DecodeOutcome;
    use crate::decompress_utils::{static_huffman_tables, TableLayout};
    use crate::packet::Packet;
    use crate::streams::word_slice_input::WordSliceInput;
    use crate::DecodeError;

    /* LSB-first writer; Huffman codes are written most significant bit first. */
    #[derive(Default)]
    struct BitWriter {
        bytes: Vec<u8>,
        bitbuf: u64,
        bitcount: u32,
    }

    impl BitWriter {
        fn write_bits(&mut self, value: u32, nbits: u32) {
            self.bitbuf |= (value as u64) << self.bitcount;
            self.bitcount += nbits;
            while self.bitcount >= 8 {
                self.bytes.push(self.bitbuf as u8);
                self.bitbuf >>= 8;
                self.bitcount -= 8;
            }
        }

        fn write_code(&mut self, code: u32, len: u32) {
            for i in (0..len).rev() {
                self.write_bits((code >> i) & 1, 1);
            }
        }

        fn finish(mut self) -> Vec<u8> {
            if self.bitcount > 0 {
                self.bytes.push(self.bitbuf as u8);
            }
            self.bytes
        }
    }

    /* Static code for a literal byte.  */
    fn write_literal(w: &mut BitWriter, byte: u8) {
        if byte < 144 {
            w.write_code(0x30 + byte as u32, 8);
        } else {
            w.write_code(0x190 + (byte as u32 - 144), 9);
        }
    }

    fn run_both(data: &[u8], input_size: usize) -> Vec<(Result<DecodeOutcome, DecodeError>, Vec<(Packet, bool)>, usize)> {
        let tables = static_huffman_tables();
        let mut results = Vec::new();
        for pipelined in [false, true] {
            let mut input = WordSliceInput::new(data);
            let mut bitstream = BitStream::new(&mut input, input_size);
            let mut out = Vec::new();
            let outcome = if pipelined {
                huffman_bytegen(&mut bitstream, &tables.table, &TableLayout::STATIC, &mut out)
            } else {
                bytegen(&mut bitstream, &tables.table, &TableLayout::STATIC, &mut out)
            };
            results.push((outcome, out, bitstream.bit_position()));
        }
        results
    }

    #[test]
    fn static_block_body() {
        let mut w = BitWriter::default();
        for b in b"abc" {
            write_literal(&mut w, *b);
        }
        /* length 3 (symbol 257, code 0000001), distance 3 (symbol 2, code 00010) */
        w.write_code(0b0000001, 7);
        w.write_code(0b00010, 5);
        /* length 18 (symbol 268, 1 extra bit = 1), distance 7 (symbol 5, 1 extra bit = 0) */
        w.write_code(0b0001100, 7);
        w.write_bits(1, 1);
        w.write_code(0b00101, 5);
        w.write_bits(0, 1);
        write_literal(&mut w, 0xFF);
        w.write_code(0, 7);
        let data = w.finish();

        let results = run_both(&data, data.len());
        for (outcome, out, _) in &results {
            assert_eq!(*outcome, Ok(DecodeOutcome::CleanEnd));
            let packets: Vec<Packet> = out.iter().map(|(p, _)| *p).collect();
            assert_eq!(
                packets,
                vec![
                    Packet::literal(b'a'),
                    Packet::literal(b'b'),
                    Packet::literal(b'c'),
                    Packet::matched(3, 3),
                    Packet::matched(18, 7),
                    Packet::literal(0xFF),
                ]
            );
            assert!(out.iter().all(|(_, eos)| !eos));
        }
        /* both variants stop right after the end-of-block code */
        assert_eq!(results[0].2, 3 * 8 + 12 + 14 + 9 + 7);
        assert_eq!(results[0].2, results[1].2);
    }

    #[test]
    fn truncated_between_length_and_distance() {
        let mut w = BitWriter::default();
        write_literal(&mut w, b'x');
        /* length 3, then the input ends */
        w.write_code(0b0000001, 7);
        w.write_bits(0, 1);
        let data = w.finish();
        assert_eq!(data.len(), 2);

        for (outcome, out, _) in run_both(&data, data.len()) {
            assert_eq!(outcome, Ok(DecodeOutcome::IncompleteMatch));
            assert_eq!(out, vec![(Packet::literal(b'x'), false)]);
        }
    }

    #[test]
    fn truncated_between_symbols() {
        let mut w = BitWriter::default();
        write_literal(&mut w, b'x');
        write_literal(&mut w, b'y');
        let data = w.finish();

        for (outcome, out, _) in run_both(&data, data.len()) {
            assert_eq!(outcome, Err(DecodeError::UnexpectedEof));
            assert_eq!(out.len(), 2);
        }
    }

    #[test]
    fn invalid_symbol() {
        let mut w = BitWriter::default();
        /* symbol 286 */
        w.write_code(0b11000110, 8);
        w.write_code(0, 7);
        let data = w.finish();

        for (outcome, out, _) in run_both(&data, data.len()) {
            assert_eq!(outcome, Err(DecodeError::InvalidSymbol));
            assert!(out.is_empty());
        }
    }
}
