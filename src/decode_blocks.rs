use crate::{
    bitstream::BitStream,
    config::DecoderConfig,
    decompress_deflate::{DecoderStage, DecoderState},
    decompress_utils::{
        build_decode_table, decode_entry::DecodeTable, static_huffman_tables, LenType,
        StaticTables, TableKind, TableLayout,
    },
    deflate_constants::{
        DEFLATE_BLOCKTYPE_DYNAMIC_HUFFMAN, DEFLATE_BLOCKTYPE_RESERVED,
        DEFLATE_BLOCKTYPE_STATIC_HUFFMAN, DEFLATE_BLOCKTYPE_UNCOMPRESSED, DEFLATE_END_OF_BLOCK,
        DEFLATE_MAX_DECLARED_LITLEN_SYMS, DEFLATE_MAX_DECLARED_OFFSET_SYMS,
        DEFLATE_MAX_PRE_CODEWORD_LEN, DEFLATE_NUM_LITLEN_SYMS, DEFLATE_NUM_OFFSET_SYMS,
        DEFLATE_NUM_PRECODE_SYMS, DEFLATE_PRECODE_LENS_PERMUTATION,
    },
    packet::Packet,
    safety_check, DecodeError, PacketOutput, WordInput,
};

#[inline(always)]
pub fn decode_huffman_header_flags<I: WordInput>(
    state: &mut DecoderState<I>,
) -> Result<(), DecodeError> {
    state.input_bitstream.ensure_bits(1 + 2)?;

    /* BFINAL: 1 bit  */
    state.is_final_block = state.input_bitstream.pop_bits(1) != 0;

    /* BTYPE: 2 bits  */
    state.block_type = state.input_bitstream.pop_bits(2);

    log::debug!(
        "Block {} at bit {}: BFINAL={} BTYPE={}",
        state.blocks,
        state.input_bitstream.bit_position() - 3,
        state.is_final_block as u8,
        state.block_type
    );
    Ok(())
}

/*
 * Pick the stage that decodes a block of the given type, if the decoder is
 * configured to handle it.
 */
pub fn select_block_stage(
    config: &DecoderConfig,
    block_type: u32,
) -> Result<DecoderStage, DecodeError> {
    let (stage, supported) = match block_type {
        DEFLATE_BLOCKTYPE_UNCOMPRESSED => (DecoderStage::Stored, config.supports_stored),
        DEFLATE_BLOCKTYPE_STATIC_HUFFMAN => (DecoderStage::Fixed, config.supports_fixed),
        DEFLATE_BLOCKTYPE_DYNAMIC_HUFFMAN => (DecoderStage::Dynamic, config.supports_dynamic),
        _ => {
            debug_assert_eq!(block_type, DEFLATE_BLOCKTYPE_RESERVED);
            return Err(DecodeError::ReservedBlockType);
        }
    };
    safety_check!(supported, DecodeError::UnsupportedBlockType(block_type));
    Ok(stage)
}

/*
 * Uncompressed block: byte-align, read LEN and NLEN, then emit the 'LEN' bytes
 * that follow as literal packets.
 */
pub fn decode_uncompressed_block<I: WordInput, O: PacketOutput>(
    state: &mut DecoderState<I>,
    output: &mut O,
) -> Result<(), DecodeError> {
    state.input_bitstream.align_input();

    let len = state.input_bitstream.try_pop_bits(16)? as u16;
    let nlen = state.input_bitstream.try_pop_bits(16)? as u16;

    safety_check!(len == !nlen, DecodeError::StoredLengthMismatch);

    log::debug!("Stored block of {} bytes", len);

    for _ in 0..len {
        let byte = state.input_bitstream.try_pop_bits(8)? as u8;
        output.write_packet(Packet::literal(byte), false)?;
    }
    Ok(())
}

/*
 * Read one precode symbol.  The precode table has no subtables with the
 * default 7-bit root, but a narrower configured root can still produce one.
 */
#[inline(always)]
fn decode_precode_symbol<I: WordInput>(
    input_bitstream: &mut BitStream<I>,
    table: &DecodeTable,
    root_bits: u32,
) -> Result<u32, DecodeError> {
    input_bitstream.refill();

    let mut entry = table.entry(input_bitstream.bits(root_bits) as usize);
    if entry.is_subtable_pointer() {
        safety_check!(
            input_bitstream.have_bits(entry.bits as usize),
            DecodeError::UnexpectedEof
        );
        input_bitstream.remove_bits(entry.bits as usize);
        entry = table.entry(entry.val as usize + input_bitstream.bits(entry.extra_bits()) as usize);
    }

    safety_check!(
        input_bitstream.have_bits(entry.bits as usize),
        DecodeError::UnexpectedEof
    );
    input_bitstream.remove_bits(entry.bits as usize);

    /* Only reachable through the unused half of an empty precode.  */
    safety_check!(entry.is_literal(), DecodeError::InvalidSymbol);
    Ok(entry.val as u32)
}

/*
 * Dynamic Huffman block header: read the precode, use it to expand the
 * literal/length and offset codeword lengths, then build both decode tables,
 * the offset table right after the literal/length one.
 */
pub fn decode_dynamic_huffman_block<I: WordInput>(
    state: &mut DecoderState<I>,
    config: &DecoderConfig,
) -> Result<(), DecodeError> {
    /* Read the codeword length counts.  */
    state.input_bitstream.ensure_bits(5 + 5 + 4)?;

    const_assert!(DEFLATE_NUM_LITLEN_SYMS == ((1 << 5) - 1) + 257);
    let num_litlen_syms = (state.input_bitstream.pop_bits(5) + 257) as usize;

    const_assert!(DEFLATE_NUM_OFFSET_SYMS == ((1 << 5) - 1) + 1);
    let num_offset_syms = (state.input_bitstream.pop_bits(5) + 1) as usize;

    const_assert!(DEFLATE_NUM_PRECODE_SYMS == ((1 << 4) - 1) + 4);
    let num_explicit_precode_lens = (state.input_bitstream.pop_bits(4) + 4) as usize;

    log::debug!(
        "Dynamic header: {} litlen, {} offset, {} precode lengths",
        num_litlen_syms,
        num_offset_syms,
        num_explicit_precode_lens
    );

    safety_check!(
        num_litlen_syms <= DEFLATE_MAX_DECLARED_LITLEN_SYMS
            && num_offset_syms <= DEFLATE_MAX_DECLARED_OFFSET_SYMS,
        DecodeError::SymbolCountOutOfRange
    );

    /* Read the precode codeword lengths.  */
    const_assert!(DEFLATE_MAX_PRE_CODEWORD_LEN == (1 << 3) - 1);

    state.precode_lens.fill(0);
    for i in 0..num_explicit_precode_lens {
        state.precode_lens[DEFLATE_PRECODE_LENS_PERMUTATION[i] as usize] =
            state.input_bitstream.try_pop_bits(3)? as LenType;
    }

    /* Build the decode table for the precode.  */
    let precode = build_decode_table(
        TableKind::CodeLengths,
        &state.precode_lens,
        config.precode_root_bits,
        &mut state.table,
        0,
    )?;

    /* Expand the literal/length and offset codeword lengths.  */
    let total_syms = num_litlen_syms + num_offset_syms;
    let mut i = 0;
    while i < total_syms {
        let presym =
            decode_precode_symbol(&mut state.input_bitstream, &state.table, precode.root_bits)?;

        if presym < 16 {
            /* Explicit codeword length  */
            state.lens[i] = presym as LenType;
            i += 1;
            continue;
        }

        /* Run-length encoded codeword lengths  */
        let (rep_val, rep_count) = if presym == 16 {
            /* Repeat the previous length 3 - 6 times  */
            safety_check!(i != 0, DecodeError::RepeatWithoutPrevious);
            const_assert!(3 + ((1 << 2) - 1) == 6);
            (
                state.lens[i - 1],
                3 + state.input_bitstream.try_pop_bits(2)? as usize,
            )
        } else if presym == 17 {
            /* Repeat zero 3 - 10 times  */
            const_assert!(3 + ((1 << 3) - 1) == 10);
            (0, 3 + state.input_bitstream.try_pop_bits(3)? as usize)
        } else {
            /* Repeat zero 11 - 138 times  */
            const_assert!(11 + ((1 << 7) - 1) == 138);
            (0, 11 + state.input_bitstream.try_pop_bits(7)? as usize)
        };

        safety_check!(
            i + rep_count <= total_syms,
            DecodeError::CodeLengthOverflow
        );
        state.lens[i..(i + rep_count)].fill(rep_val);
        i += rep_count;
    }

    safety_check!(
        state.lens[DEFLATE_END_OF_BLOCK] != 0,
        DecodeError::MissingEndOfBlock
    );

    let litlen = build_decode_table(
        TableKind::Literals,
        &state.lens[..num_litlen_syms],
        config.litlen_root_bits,
        &mut state.table,
        0,
    )?;
    let offset = build_decode_table(
        TableKind::Distances,
        &state.lens[num_litlen_syms..total_syms],
        config.dist_root_bits,
        &mut state.table,
        litlen.used,
    )?;

    log::debug!(
        "Dynamic tables: litlen {} entries ({} root bits), offset {} entries ({} root bits)",
        litlen.used,
        litlen.root_bits,
        offset.used,
        offset.root_bits
    );

    state.layout = TableLayout {
        litlen_bits: litlen.root_bits,
        offset_bits: offset.root_bits,
        offset_base: litlen.used,
    };

    Ok(())
}

/*
 * Static Huffman block: the tables are built once per process and shared.
 */
#[inline(always)]
pub fn load_static_huffman_block() -> &'static StaticTables {
    static_huffman_tables()
}
