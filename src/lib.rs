// #![cfg_attr(debug_assertions, deny(warnings))]
pub mod bitstream;
pub mod bytegen;
pub mod config;
pub mod decode_blocks;
pub mod decompress_deflate;
pub mod decompress_utils;
pub mod deflate_constants;
pub mod packet;
pub mod streams;

#[macro_use]
extern crate static_assertions;

pub use crate::config::{DecoderConfig, EmitterKind};
pub use crate::decompress_deflate::{
    huffman_decode, huffman_decoder_dynamic, huffman_decoder_fixed, huffman_decoder_full,
    DecodeOutcome, DecodeReport, DecodeStatus, DecoderStage,
};
pub use crate::packet::Packet;

use crate::streams::deflate_chunked_packet_output::DeflateChunkedPacketOutput;
use crate::streams::deflate_chunked_word_input::DeflateChunkedWordInput;
use std::io::Read;

/*
 * Reasons a decode can fail.  A truncated match is not one of them: running out
 * of input between a length and its distance is reported through
 * DecodeStatus::IncompleteMatch instead.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("reserved block type (BTYPE=3)")]
    ReservedBlockType,

    #[error("block type {0} is not supported by this decoder")]
    UnsupportedBlockType(u32),

    /* The code lengths are over-subscribed, or incomplete where that isn't
     * allowed.  */
    #[error("malformed Huffman code lengths")]
    MalformedHuffmanTable,

    #[error("literal/length code has no end-of-block symbol")]
    MissingEndOfBlock,

    #[error("too many literal/length or distance codes")]
    SymbolCountOutOfRange,

    #[error("repeat code without a previous length")]
    RepeatWithoutPrevious,

    #[error("code length repeat runs past the declared symbol count")]
    CodeLengthOverflow,

    #[error("invalid literal/length or distance symbol")]
    InvalidSymbol,

    #[error("stored block length does not match its complement")]
    StoredLengthMismatch,

    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("decode tables exceed the shared table capacity")]
    TableCapacityExceeded,

    #[error("packet output rejected the write")]
    OutputRejected,
}

impl DecodeError {
    /// Returns `true` when the error was caused by running out of input rather
    /// than by corrupt data.
    pub fn is_truncation(&self) -> bool {
        matches!(self, DecodeError::UnexpectedEof)
    }
}

#[macro_export]
macro_rules! safety_check {
    ($cond:expr, $err:expr) => {
        if !$cond {
            return Err($err);
        }
    };
}

/*
 * Source of the compressed stream.  Words are the little-endian byte pairs of
 * the DEFLATE data; None means the source has nothing more to give.
 */
pub trait WordInput {
    fn read_word(&mut self) -> Option<u16>;
}

/*
 * Sink for decoded packets.  Every data packet is written with
 * end_of_stream == false, the single trailing terminator with true.
 */
pub trait PacketOutput {
    fn write_packet(&mut self, packet: Packet, end_of_stream: bool) -> Result<(), DecodeError>;
}

impl PacketOutput for Vec<(Packet, bool)> {
    #[inline(always)]
    fn write_packet(&mut self, packet: Packet, end_of_stream: bool) -> Result<(), DecodeError> {
        self.push((packet, end_of_stream));
        Ok(())
    }
}

impl<O: PacketOutput + ?Sized> PacketOutput for &mut O {
    #[inline(always)]
    fn write_packet(&mut self, packet: Packet, end_of_stream: bool) -> Result<(), DecodeError> {
        (**self).write_packet(packet, end_of_stream)
    }
}

pub fn decode_reader_buffered<R: Read>(
    mut reader: R,
    input_size: usize,
    config: &DecoderConfig,
    func: impl FnMut(&[Packet], bool) -> Result<(), ()>,
    buf_size: usize,
) -> Result<DecodeReport, DecodeError> {
    let mut input_stream =
        DeflateChunkedWordInput::new(|buf| reader.read(buf).unwrap_or(0), buf_size);

    let mut output_stream = DeflateChunkedPacketOutput::new(func, buf_size);

    huffman_decode(config, &mut input_stream, &mut output_stream, input_size)
}
