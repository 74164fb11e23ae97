/*
 * Constants of the DEFLATE format (RFC 1951).
 */

/* Valid block types  */
pub const DEFLATE_BLOCKTYPE_UNCOMPRESSED: u32 = 0;
pub const DEFLATE_BLOCKTYPE_STATIC_HUFFMAN: u32 = 1;
pub const DEFLATE_BLOCKTYPE_DYNAMIC_HUFFMAN: u32 = 2;
pub const DEFLATE_BLOCKTYPE_RESERVED: u32 = 3;

/* Minimum and maximum supported match lengths (in bytes)  */
pub const DEFLATE_MIN_MATCH_LEN: u32 = 3;
pub const DEFLATE_MAX_MATCH_LEN: u32 = 258;

/* Maximum supported match offset (in bytes)  */
pub const DEFLATE_MAX_MATCH_OFFSET: u32 = 32768;

/* Number of symbols in each Huffman code.  Note: for the literal/length
 * and offset codes, these are actually the maximum values; a given block
 * might use fewer symbols.  */
pub const DEFLATE_NUM_PRECODE_SYMS: usize = 19;
pub const DEFLATE_NUM_LITLEN_SYMS: usize = 288;
pub const DEFLATE_NUM_OFFSET_SYMS: usize = 32;

/* Largest symbol counts a dynamic block header may declare.  Symbols 286, 287,
 * 30 and 31 only exist to complete the fixed codes.  */
pub const DEFLATE_MAX_DECLARED_LITLEN_SYMS: usize = 286;
pub const DEFLATE_MAX_DECLARED_OFFSET_SYMS: usize = 30;

/* The maximum number of symbols across all codes  */
pub const DEFLATE_MAX_NUM_SYMS: usize = 288;

/* Division of symbols in the literal/length code  */
pub const DEFLATE_NUM_LITERALS: usize = 256;
pub const DEFLATE_END_OF_BLOCK: usize = 256;
pub const DEFLATE_FIRST_LEN_SYM: usize = 257;
pub const DEFLATE_NUM_LEN_SYMS: usize = 29;
pub const DEFLATE_NUM_VALID_OFFSET_SYMS: usize = 30;

/* Maximum codeword length, in bits, within each Huffman code  */
pub const DEFLATE_MAX_PRE_CODEWORD_LEN: usize = 7;
pub const DEFLATE_MAX_CODEWORD_LEN: usize = 15;

/* Maximum number of extra bits that may be required to represent a match
 * length or offset.  */
pub const DEFLATE_MAX_EXTRA_LENGTH_BITS: usize = 5;
pub const DEFLATE_MAX_EXTRA_OFFSET_BITS: usize = 13;

/* Bits read per refill of the block body loops: the longest codeword plus the
 * longest run of extra bits behind it.  */
pub const DEFLATE_MAX_SYMBOL_BITS: usize = DEFLATE_MAX_CODEWORD_LEN + DEFLATE_MAX_EXTRA_OFFSET_BITS;

/* The order in which precode lengths are stored.  */
pub const DEFLATE_PRECODE_LENS_PERMUTATION: [u8; DEFLATE_NUM_PRECODE_SYMS] = [
    16, 17, 18, 0, 8, 7, 9, 6, 10, 5, 11, 4, 12, 3, 13, 2, 14, 1, 15,
];

/* Base values and extra bits of the length symbols 257 - 285.  */
pub const DEFLATE_LENGTH_BASE: [u16; DEFLATE_NUM_LEN_SYMS] = [
    3, 4, 5, 6, 7, 8, 9, 10, 11, 13, 15, 17, 19, 23, 27, 31, 35, 43, 51, 59, 67, 83, 99, 115, 131,
    163, 195, 227, 258,
];
pub const DEFLATE_LENGTH_EXTRA_BITS: [u8; DEFLATE_NUM_LEN_SYMS] = [
    0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 4, 4, 5, 5, 5, 5, 0,
];

/* Base values and extra bits of the offset symbols 0 - 29.  */
pub const DEFLATE_OFFSET_BASE: [u16; DEFLATE_NUM_VALID_OFFSET_SYMS] = [
    1, 2, 3, 4, 5, 7, 9, 13, 17, 25, 33, 49, 65, 97, 129, 193, 257, 385, 513, 769, 1025, 1537,
    2049, 3073, 4097, 6145, 8193, 12289, 16385, 24577,
];
pub const DEFLATE_OFFSET_EXTRA_BITS: [u8; DEFLATE_NUM_VALID_OFFSET_SYMS] = [
    0, 0, 0, 0, 1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 6, 6, 7, 7, 8, 8, 9, 9, 10, 10, 11, 11, 12, 12, 13,
    13,
];

/*
 * Decode table entry ops.  An entry whose op has none of the flag bits set
 * and is nonzero points to a subtable; the op is then the subtable's width.
 */
pub const HUFFDEC_LITERAL: u8 = 0;
pub const HUFFDEC_BASE: u8 = 16;
pub const HUFFDEC_END_OF_BLOCK: u8 = 32 | HUFFDEC_INVALID;
pub const HUFFDEC_INVALID: u8 = 64;
pub const HUFFDEC_EXTRA_BITS_MASK: u8 = 15;

/*
 * All decode tables of one block (precode, or literal/length followed by
 * offset) live in one shared buffer of this many entries.  The ENOUGH numbers
 * are the worst-case table sizes for the default root widths, as computed by
 * zlib's 'enough' utility.
 */
pub const DEFLATE_TABLE_CAPACITY: usize = 2048;
pub const LITLEN_ENOUGH: usize = 852; /* enough 286 9 15 */
pub const OFFSET_ENOUGH: usize = 592; /* enough 30 6 15 */
pub const PRECODE_ENOUGH: usize = 128; /* 2^7, no subtables */

const_assert!(LITLEN_ENOUGH + OFFSET_ENOUGH <= DEFLATE_TABLE_CAPACITY);
const_assert!(PRECODE_ENOUGH <= DEFLATE_TABLE_CAPACITY);

/* Every codeword and its extra bits fit in the 32 bits guaranteed by a refill. */
const_assert!(DEFLATE_MAX_SYMBOL_BITS <= 32);
const_assert!(DEFLATE_MAX_EXTRA_LENGTH_BITS <= HUFFDEC_EXTRA_BITS_MASK as usize);
const_assert!(DEFLATE_MAX_EXTRA_OFFSET_BITS <= HUFFDEC_EXTRA_BITS_MASK as usize);

/* Static codes (BTYPE=1) share one table: literal/length at 0, offset after.  */
pub const STATIC_LITLEN_TABLEBITS: u32 = 9;
pub const STATIC_OFFSET_TABLEBITS: u32 = 5;
pub const STATIC_OFFSET_TABLE_BASE: usize = 1 << STATIC_LITLEN_TABLEBITS;

const_assert!(STATIC_OFFSET_TABLE_BASE + (1 << STATIC_OFFSET_TABLEBITS) <= DEFLATE_TABLE_CAPACITY);

/* Upper bound of the code lengths read by a dynamic block header.  */
pub const DEFLATE_MAX_DYNAMIC_LENS: usize =
    DEFLATE_MAX_DECLARED_LITLEN_SYMS + DEFLATE_MAX_DECLARED_OFFSET_SYMS;

const_assert!(DEFLATE_MAX_DYNAMIC_LENS == 316);
const_assert!(DEFLATE_NUM_LITLEN_SYMS == ((1 << 5) - 1) + 257);
const_assert!(DEFLATE_NUM_PRECODE_SYMS == ((1 << 4) - 1) + 4);
