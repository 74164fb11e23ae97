/*
 * decompress_template.h
 *
 * Copyright 2016 Eric Biggers
 *
 * Permission is hereby granted, free of charge, to any person
 * obtaining a copy of this software and associated documentation
 * files (the "Software"), to deal in the Software without
 * restriction, including without limitation the rights to use,
 * copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the
 * Software is furnished to do so, subject to the following
 * conditions:
 *
 * The above copyright notice and this permission notice shall be
 * included in all copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
 * EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES
 * OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
 * NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT
 * HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY,
 * WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
 * FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR
 * OTHER DEALINGS IN THE SOFTWARE.
 */

/*
 * The block-level driver.  One parameterized state machine serves the three
 * decoder variants; the configuration decides which block types it accepts
 * and whether a 2-byte header precedes the first block.
 *
 *	HEADER -> BLOCK_PREAMBLE -> STORED ---------------------> (next block)
 *	                         -> FIXED   -> BYTEGEN_FIXED   -> (next block)
 *	                         -> DYNAMIC -> BYTEGEN_DYNAMIC -> (next block)
 *
 * where (next block) is BLOCK_PREAMBLE, or COMPLETE after a block with BFINAL
 * set.  Whatever way the loop ends, the remaining declared input is drained and
 * a terminator packet flagged as end of stream is written.
 */

use crate::bitstream::BitStream;
use crate::bytegen::{bytegen, huffman_bytegen};
use crate::config::{DecoderConfig, EmitterKind};
use crate::decode_blocks::{
    decode_dynamic_huffman_block, decode_huffman_header_flags, decode_uncompressed_block,
    load_static_huffman_block, select_block_stage,
};
use crate::decompress_utils::decode_entry::DecodeTable;
use crate::decompress_utils::{LenType, TableLayout};
use crate::deflate_constants::{DEFLATE_MAX_DYNAMIC_LENS, DEFLATE_NUM_PRECODE_SYMS};
use crate::packet::Packet;
use crate::{DecodeError, PacketOutput, WordInput};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderStage {
    Header,
    BlockPreamble,
    Stored,
    Fixed,
    Dynamic,
    BytegenFixed,
    BytegenDynamic,
    Complete,
}

/*
 * Result of one state transition, and of one Huffman-coded block body.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeOutcome {
    Continue,
    CleanEnd,
    /* The input ended (or the block did) between a length and its distance. */
    IncompleteMatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStatus {
    Complete,
    IncompleteMatch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeReport {
    pub status: DecodeStatus,
    /* Blocks decoded to their end.  */
    pub blocks: usize,
    /* Data packets written, the terminator excluded.  */
    pub packets: usize,
    /* Input bytes read, including the drained tail.  */
    pub bytes_consumed: usize,
}

/*
 * All the state of one decode call.  The arrays aren't all needed at the same
 * time: 'precode_lens' and the precode table are unneeded after 'lens' has
 * been filled, so the literal/length table is built over the precode table.
 */
pub struct DecoderState<'a, I: WordInput> {
    pub input_bitstream: BitStream<'a, I>,
    pub stage: DecoderStage,
    pub block_type: u32,
    pub is_final_block: bool,
    pub blocks: usize,

    pub table: DecodeTable,
    pub layout: TableLayout,
    pub lens: [LenType; DEFLATE_MAX_DYNAMIC_LENS],
    pub precode_lens: [LenType; DEFLATE_NUM_PRECODE_SYMS],
}

impl<'a, I: WordInput> DecoderState<'a, I> {
    pub fn new(input_stream: &'a mut I, input_size: usize, config: &DecoderConfig) -> Self {
        Self {
            input_bitstream: BitStream::new(input_stream, input_size),
            stage: if config.skip_header {
                DecoderStage::Header
            } else {
                DecoderStage::BlockPreamble
            },
            block_type: 0,
            is_final_block: false,
            blocks: 0,
            table: DecodeTable::new(),
            layout: TableLayout::STATIC,
            lens: [0; DEFLATE_MAX_DYNAMIC_LENS],
            precode_lens: [0; DEFLATE_NUM_PRECODE_SYMS],
        }
    }

    #[inline(always)]
    fn finish_block(&mut self) {
        self.blocks += 1;
        self.stage = if self.is_final_block {
            DecoderStage::Complete
        } else {
            DecoderStage::BlockPreamble
        };
    }
}

/* Counts the data packets passing through to the caller's output.  */
struct CountingOutput<'o, O: PacketOutput> {
    inner: &'o mut O,
    packets: usize,
}

impl<'o, O: PacketOutput> PacketOutput for CountingOutput<'o, O> {
    #[inline(always)]
    fn write_packet(&mut self, packet: Packet, end_of_stream: bool) -> Result<(), DecodeError> {
        self.inner.write_packet(packet, end_of_stream)?;
        self.packets += 1;
        Ok(())
    }
}

#[inline(always)]
fn emit_symbols<I: WordInput, O: PacketOutput>(
    config: &DecoderConfig,
    input_bitstream: &mut BitStream<I>,
    table: &DecodeTable,
    layout: &TableLayout,
    output: &mut O,
) -> Result<DecodeOutcome, DecodeError> {
    match config.emitter {
        EmitterKind::Generic => bytegen(input_bitstream, table, layout, output),
        EmitterKind::Pipelined => huffman_bytegen(input_bitstream, table, layout, output),
    }
}

/*
 * Run the current stage and move to the next one.
 */
pub fn decode_step<I: WordInput, O: PacketOutput>(
    state: &mut DecoderState<I>,
    config: &DecoderConfig,
    output: &mut O,
) -> Result<DecodeOutcome, DecodeError> {
    match state.stage {
        DecoderStage::Header => {
            state.input_bitstream.skip_word()?;
            state.stage = DecoderStage::BlockPreamble;
        }
        DecoderStage::BlockPreamble => {
            decode_huffman_header_flags(state)?;
            state.stage = select_block_stage(config, state.block_type)?;
        }
        DecoderStage::Stored => {
            decode_uncompressed_block(state, output)?;
            state.finish_block();
        }
        DecoderStage::Fixed => {
            state.stage = DecoderStage::BytegenFixed;
        }
        DecoderStage::Dynamic => {
            decode_dynamic_huffman_block(state, config)?;
            state.stage = DecoderStage::BytegenDynamic;
        }
        DecoderStage::BytegenFixed | DecoderStage::BytegenDynamic => {
            let outcome = if state.stage == DecoderStage::BytegenFixed {
                let tables = load_static_huffman_block();
                emit_symbols(
                    config,
                    &mut state.input_bitstream,
                    &tables.table,
                    &tables.layout,
                    output,
                )?
            } else {
                emit_symbols(
                    config,
                    &mut state.input_bitstream,
                    &state.table,
                    &state.layout,
                    output,
                )?
            };

            if outcome == DecodeOutcome::IncompleteMatch {
                state.stage = DecoderStage::Complete;
                return Ok(DecodeOutcome::IncompleteMatch);
            }
            state.finish_block();
        }
        DecoderStage::Complete => return Ok(DecodeOutcome::CleanEnd),
    }
    Ok(DecodeOutcome::Continue)
}

fn decode_all_blocks<I: WordInput, O: PacketOutput>(
    state: &mut DecoderState<I>,
    config: &DecoderConfig,
    output: &mut O,
) -> Result<DecodeStatus, DecodeError> {
    loop {
        match decode_step(state, config, output)? {
            DecodeOutcome::Continue => {}
            DecodeOutcome::CleanEnd => return Ok(DecodeStatus::Complete),
            DecodeOutcome::IncompleteMatch => {
                log::warn!(
                    "Block {} ends in the middle of a match, stopping",
                    state.blocks
                );
                return Ok(DecodeStatus::IncompleteMatch);
            }
        }
    }
}

/*
 * Decode a DEFLATE stream of 'input_size' bytes into packets.
 *
 * An incomplete final match is not an error: decoding stops there and the
 * report says so.  On success and on failure alike, the rest of the declared
 * input is read and discarded and the terminator packet is written.
 */
pub fn huffman_decode<I: WordInput, O: PacketOutput>(
    config: &DecoderConfig,
    input: &mut I,
    output: &mut O,
    input_size: usize,
) -> Result<DecodeReport, DecodeError> {
    let mut output = CountingOutput {
        inner: output,
        packets: 0,
    };
    let mut state = DecoderState::new(input, input_size, config);

    let result = decode_all_blocks(&mut state, config, &mut output);
    if let Err(error) = &result {
        log::warn!(
            "Decode failed in {:?} at bit {}: {}",
            state.stage,
            state.input_bitstream.bit_position(),
            error
        );
    }

    let drained = state.input_bitstream.drain_input();
    if drained > 0 {
        log::debug!("Drained {} words of trailing input", drained);
    }

    let terminator = output.inner.write_packet(Packet::terminator(), true);

    let status = result?;
    terminator?;

    Ok(DecodeReport {
        status,
        blocks: state.blocks,
        packets: output.packets,
        bytes_consumed: state.input_bitstream.bytes_consumed(),
    })
}

/*
 * Decoder for streams made of stored and static Huffman blocks, behind a
 * 2-byte header.
 */
pub fn huffman_decoder_fixed<I: WordInput, O: PacketOutput>(
    input: &mut I,
    output: &mut O,
    input_size: usize,
) -> Result<DecodeReport, DecodeError> {
    huffman_decode(&DecoderConfig::fixed(), input, output, input_size)
}

/*
 * Decoder for streams made of stored and dynamic Huffman blocks, starting
 * directly with the first block.
 */
pub fn huffman_decoder_dynamic<I: WordInput, O: PacketOutput>(
    input: &mut I,
    output: &mut O,
    input_size: usize,
) -> Result<DecodeReport, DecodeError> {
    huffman_decode(&DecoderConfig::dynamic(), input, output, input_size)
}

/*
 * Decoder for all block types, behind a 2-byte header.
 */
pub fn huffman_decoder_full<I: WordInput, O: PacketOutput>(
    input: &mut I,
    output: &mut O,
    input_size: usize,
) -> Result<DecodeReport, DecodeError> {
    huffman_decode(&DecoderConfig::full(), input, output, input_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::streams::word_slice_input::WordSliceInput;

    #[test]
    fn stages_of_a_stored_stream() {
        /* header, then a final stored block holding "AB" */
        let data = [0x78, 0x01, 0x01, 0x02, 0x00, 0xFD, 0xFF, b'A', b'B'];
        let config = DecoderConfig::full();
        let mut input = WordSliceInput::new(&data);
        let mut state = DecoderState::new(&mut input, data.len(), &config);
        let mut out: Vec<(Packet, bool)> = Vec::new();

        let mut stages = vec![state.stage];
        while decode_step(&mut state, &config, &mut out).unwrap() == DecodeOutcome::Continue {
            stages.push(state.stage);
        }

        assert_eq!(
            stages,
            vec![
                DecoderStage::Header,
                DecoderStage::BlockPreamble,
                DecoderStage::Stored,
                DecoderStage::Complete,
            ]
        );
        assert_eq!(state.blocks, 1);
        assert_eq!(
            out,
            vec![(Packet::literal(b'A'), false), (Packet::literal(b'B'), false)]
        );
    }

    #[test]
    fn static_block_goes_through_bytegen() {
        /* header, then BFINAL=1 BTYPE=1 followed directly by end of block */
        let data = [0x78, 0x01, 0x03, 0x00];
        let config = DecoderConfig::fixed();
        let mut input = WordSliceInput::new(&data);
        let mut state = DecoderState::new(&mut input, data.len(), &config);
        let mut out: Vec<(Packet, bool)> = Vec::new();

        let mut stages = vec![state.stage];
        while decode_step(&mut state, &config, &mut out).unwrap() == DecodeOutcome::Continue {
            stages.push(state.stage);
        }

        assert_eq!(
            stages,
            vec![
                DecoderStage::Header,
                DecoderStage::BlockPreamble,
                DecoderStage::Fixed,
                DecoderStage::BytegenFixed,
                DecoderStage::Complete,
            ]
        );
        assert!(out.is_empty());
    }

    #[test]
    fn terminator_follows_an_error() {
        /* BTYPE=3 right after the header, plus trailing words */
        let data = [0x78, 0x01, 0x07, 0x00, 0x11, 0x22, 0x33, 0x44];
        let mut input = WordSliceInput::new(&data);
        let mut out: Vec<(Packet, bool)> = Vec::new();

        let result = huffman_decoder_full(&mut input, &mut out, data.len());
        assert_eq!(result, Err(DecodeError::ReservedBlockType));
        assert_eq!(out, vec![(Packet::terminator(), true)]);
        assert_eq!(input.words_read(), 4);
    }

    #[test]
    fn dynamic_driver_has_no_header() {
        /* final stored block holding "Z", no header in front */
        let data = [0x01, 0x01, 0x00, 0xFE, 0xFF, b'Z'];
        let mut input = WordSliceInput::new(&data);
        let mut out: Vec<(Packet, bool)> = Vec::new();

        let report = huffman_decoder_dynamic(&mut input, &mut out, data.len()).unwrap();
        assert_eq!(
            report,
            DecodeReport {
                status: DecodeStatus::Complete,
                blocks: 1,
                packets: 1,
                bytes_consumed: 6,
            }
        );
        assert_eq!(
            out,
            vec![(Packet::literal(b'Z'), false), (Packet::terminator(), true)]
        );
    }
}
