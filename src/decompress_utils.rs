/*****************************************************************************
 *                              Huffman decoding                             *
 *****************************************************************************/

pub mod decode_entry;

use crate::decompress_utils::decode_entry::{DecodeEntry, DecodeTable};
use crate::deflate_constants::*;
use crate::{safety_check, DecodeError};
use nightly_quirks::branch_pred::unlikely;
use std::sync::OnceLock;

/*
 * Type for codeword lengths.
 */
pub type LenType = u8;

/*
 * Selects how a symbol of the code being built turns into a table entry.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    /* Precode: every symbol is returned as is.  */
    CodeLengths,
    /* Literal/length code: literals, end of block, length bases.  */
    Literals,
    /* Offset code: offset bases.  */
    Distances,
}

/*
 * Where a table ended up in the shared buffer: its root width after clamping
 * and the number of entries it occupies (main table plus subtables).
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableRegion {
    pub root_bits: u32,
    pub used: usize,
}

/*
 * The pair of tables the symbol emitters decode a block with: the
 * literal/length table at index 0 and the offset table right after it.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableLayout {
    pub litlen_bits: u32,
    pub offset_bits: u32,
    pub offset_base: usize,
}

impl TableLayout {
    pub const STATIC: TableLayout = TableLayout {
        litlen_bits: STATIC_LITLEN_TABLEBITS,
        offset_bits: STATIC_OFFSET_TABLEBITS,
        offset_base: STATIC_OFFSET_TABLE_BASE,
    };
}

#[inline(always)]
fn decode_result(kind: TableKind, sym: usize) -> DecodeEntry {
    match kind {
        TableKind::CodeLengths => DecodeEntry::new_literal(sym as u16),
        TableKind::Literals => {
            if sym < DEFLATE_NUM_LITERALS {
                DecodeEntry::new_literal(sym as u16)
            } else if sym == DEFLATE_END_OF_BLOCK {
                DecodeEntry::new_end_of_block()
            } else if sym - DEFLATE_FIRST_LEN_SYM < DEFLATE_NUM_LEN_SYMS {
                let slot = sym - DEFLATE_FIRST_LEN_SYM;
                DecodeEntry::new_from_base_and_extra_bits(
                    DEFLATE_LENGTH_BASE[slot],
                    DEFLATE_LENGTH_EXTRA_BITS[slot],
                )
            } else {
                DecodeEntry::INVALID
            }
        }
        TableKind::Distances => {
            if sym < DEFLATE_NUM_VALID_OFFSET_SYMS {
                DecodeEntry::new_from_base_and_extra_bits(
                    DEFLATE_OFFSET_BASE[sym],
                    DEFLATE_OFFSET_EXTRA_BITS[sym],
                )
            } else {
                DecodeEntry::INVALID
            }
        }
    }
}

/*
 * Build a decode table for a canonical Huffman code, given the codeword length
 * of each symbol ('lens', 0 meaning unused).  The table is written into 'table'
 * starting at index 'base'; 'root_bits' is a hint for the main table width and
 * is clamped to the shortest and longest codeword lengths of the code.
 *
 * The table is indexed with "bit-reversed" codewords, where the low-order bit
 * is the first bit of the codeword, as needed by the LSB-first bit order of
 * DEFLATE.
 *
 * Fails if the codeword lengths do not form a valid Huffman code.  Incomplete
 * codes are accepted only in the two cases zlib accepts them: a code with no
 * symbols, and for the literal/length and offset codes, a single codeword of
 * length 1.  The unused part of the codespace decodes to invalid entries.
 */
pub fn build_decode_table(
    kind: TableKind,
    lens: &[LenType],
    root_bits: u32,
    table: &mut DecodeTable,
    base: usize,
) -> Result<TableRegion, DecodeError> {
    safety_check!(lens.len() <= DEFLATE_MAX_NUM_SYMS, DecodeError::MalformedHuffmanTable);

    // Count how many codewords have each length, including 0.
    let mut len_counts = [0u16; DEFLATE_MAX_CODEWORD_LEN + 1];
    for &len in lens {
        safety_check!(
            (len as usize) <= DEFLATE_MAX_CODEWORD_LEN,
            DecodeError::MalformedHuffmanTable
        );
        len_counts[len as usize] += 1;
    }

    let mut max_len = DEFLATE_MAX_CODEWORD_LEN;
    while max_len >= 1 && len_counts[max_len] == 0 {
        max_len -= 1;
    }

    if max_len == 0 {
        /*
         * An empty code is allowed.  This can happen for the offset code in
         * DEFLATE, since a dynamic Huffman block need not contain any
         * matches.  Any lookup lands on an invalid entry.
         */
        safety_check!(base + 2 <= table.capacity(), DecodeError::TableCapacityExceeded);
        table.set(base, DecodeEntry::INVALID)?;
        table.set(base + 1, DecodeEntry::INVALID)?;
        return Ok(TableRegion {
            root_bits: 1,
            used: 2,
        });
    }

    let mut min_len = 1;
    while min_len < max_len && len_counts[min_len] == 0 {
        min_len += 1;
    }

    let root = (root_bits as usize).clamp(min_len, max_len);

    /*
     * Check whether the lengths form a complete code (exactly fills the
     * codespace), an incomplete code (doesn't fill the codespace), or an
     * overfull code (overflows the codespace).  'left' is the number of
     * codewords of the current length still available.
     */
    let mut left: i32 = 1;
    for len in 1..=DEFLATE_MAX_CODEWORD_LEN {
        left <<= 1;
        left -= len_counts[len] as i32;
        /* overfull code? */
        if unlikely(left < 0) {
            return Err(DecodeError::MalformedHuffmanTable);
        }
    }
    /* incomplete code? */
    if unlikely(left > 0 && (kind == TableKind::CodeLengths || max_len != 1)) {
        return Err(DecodeError::MalformedHuffmanTable);
    }

    /*
     * Sort the symbols primarily by increasing codeword length and
     * secondarily by increasing symbol value; or equivalently by their
     * codewords in lexicographic order, since a canonical code is assumed.
     */
    let mut offsets = [0u16; DEFLATE_MAX_CODEWORD_LEN + 1];
    for len in 1..DEFLATE_MAX_CODEWORD_LEN {
        offsets[len + 1] = offsets[len] + len_counts[len];
    }

    let mut sorted_syms = [0u16; DEFLATE_MAX_NUM_SYMS];
    for (sym, &len) in lens.iter().enumerate() {
        if len != 0 {
            sorted_syms[offsets[len as usize] as usize] = sym as u16;
            offsets[len as usize] += 1;
        }
    }

    /*
     * Enumerate the codewords in lexicographic order.  Each codeword of length
     * 'len' fills every '2^(len-drop)'-th entry of the table it falls in, where
     * 'drop' is 0 in the main table and 'root' in the subtables.  Once a
     * codeword no longer fits the main table and its first 'root' bits differ
     * from the current subtable's prefix, a new subtable is opened right after
     * the previous one and sized so that the remaining codewords sharing the
     * prefix complete it.
     */
    let root_mask = (1usize << root) - 1;
    let mut used = 1usize << root;
    safety_check!(base + used <= table.capacity(), DecodeError::TableCapacityExceeded);

    let mut codeword: usize = 0; /* current codeword, bit-reversed */
    let mut len = min_len;
    let mut sym_index = 0;
    let mut next = base; /* start of the table being filled */
    let mut cur_bits = root; /* width of the table being filled */
    let mut drop = 0;
    let mut subtable_prefix = usize::MAX;

    loop {
        let entry = decode_result(kind, sorted_syms[sym_index] as usize).with_bits((len - drop) as u8);

        /* Replicate the entry over every slot that ends with the codeword. */
        let stride = 1usize << (len - drop);
        let cur_table_size = 1usize << cur_bits;
        let mut fill = cur_table_size;
        loop {
            fill -= stride;
            table.set(next + (codeword >> drop) + fill, entry)?;
            if fill == 0 {
                break;
            }
        }

        /* Advance to the next codeword. */
        let mut incr = 1usize << (len - 1);
        while codeword & incr != 0 {
            incr >>= 1;
        }
        if incr != 0 {
            codeword &= incr - 1;
            codeword += incr;
        } else {
            codeword = 0;
        }

        sym_index += 1;
        len_counts[len] -= 1;
        if len_counts[len] == 0 {
            if len == max_len {
                break;
            }
            len = lens[sorted_syms[sym_index] as usize] as usize;
        }

        /* Start a new subtable? */
        if len > root && (codeword & root_mask) != subtable_prefix {
            if drop == 0 {
                drop = root;
            }
            next += cur_table_size;

            /*
             * Calculate the subtable width.  If the codeword has length
             * 'root + n', the subtable needs at least '2^n' entries, more if
             * fewer than '2^n' codewords of that length remain.
             */
            cur_bits = len - drop;
            let mut remaining: i32 = 1 << cur_bits;
            while cur_bits + drop < max_len {
                remaining -= len_counts[cur_bits + drop] as i32;
                if remaining <= 0 {
                    break;
                }
                cur_bits += 1;
                remaining <<= 1;
            }

            used += 1 << cur_bits;
            safety_check!(base + used <= table.capacity(), DecodeError::TableCapacityExceeded);

            /* Point the main table entry for this prefix at the subtable. */
            subtable_prefix = codeword & root_mask;
            table.set(
                base + subtable_prefix,
                DecodeEntry::new_subtable_pointer((next - base) as u16, cur_bits as u8, root as u8),
            )?;
        }
    }

    /*
     * An incomplete code (a single codeword of length 1) leaves exactly one
     * slot unassigned.
     */
    if codeword != 0 {
        table.set(
            next + (codeword >> drop),
            DecodeEntry::new_invalid((len - drop) as u8),
        )?;
    }

    log::trace!(
        "Built {:?} table at {}: root {} bits, {} entries",
        kind,
        base,
        root,
        used
    );

    Ok(TableRegion {
        root_bits: root as u32,
        used,
    })
}

/*
 * The static codes (BTYPE=1), built once and shared by every decoder.
 */
pub struct StaticTables {
    pub table: DecodeTable,
    pub layout: TableLayout,
}

static STATIC_HUFFMAN_TABLES: OnceLock<StaticTables> = OnceLock::new();

pub fn static_huffman_lens() -> [LenType; DEFLATE_NUM_LITLEN_SYMS + DEFLATE_NUM_OFFSET_SYMS] {
    let mut lens = [0; DEFLATE_NUM_LITLEN_SYMS + DEFLATE_NUM_OFFSET_SYMS];
    lens[0..144].fill(8);
    lens[144..256].fill(9);
    lens[256..280].fill(7);
    lens[280..288].fill(8);
    lens[288..].fill(5);
    lens
}

pub fn build_static_huffman_tables() -> StaticTables {
    const_assert!(DEFLATE_NUM_LITLEN_SYMS == 288);
    const_assert!(DEFLATE_NUM_OFFSET_SYMS == 32);

    let lens = static_huffman_lens();
    let mut table = DecodeTable::new();

    // Cannot fail
    let litlen = build_decode_table(
        TableKind::Literals,
        &lens[..DEFLATE_NUM_LITLEN_SYMS],
        STATIC_LITLEN_TABLEBITS,
        &mut table,
        0,
    );
    debug_assert_eq!(
        litlen,
        Ok(TableRegion {
            root_bits: STATIC_LITLEN_TABLEBITS,
            used: STATIC_OFFSET_TABLE_BASE,
        })
    );
    let offset = build_decode_table(
        TableKind::Distances,
        &lens[DEFLATE_NUM_LITLEN_SYMS..],
        STATIC_OFFSET_TABLEBITS,
        &mut table,
        STATIC_OFFSET_TABLE_BASE,
    );
    debug_assert_eq!(
        offset,
        Ok(TableRegion {
            root_bits: STATIC_OFFSET_TABLEBITS,
            used: 1 << STATIC_OFFSET_TABLEBITS,
        })
    );

    StaticTables {
        table,
        layout: TableLayout::STATIC,
    }
}

pub fn static_huffman_tables() -> &'static StaticTables {
    STATIC_HUFFMAN_TABLES.get_or_init(build_static_huffman_tables)
}
