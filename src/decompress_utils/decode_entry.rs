/*
* A decode table for a root width of ROOTBITS consists of a main table of
* (1 << ROOTBITS) entries followed by a variable number of subtables.
*
* The decoding algorithm takes the next ROOTBITS bits of compressed data and
* uses them as an index into the decode table.  The resulting entry is either a
* "direct entry", meaning that it contains the value desired, or a "subtable
* pointer", meaning that the entry references a subtable that must be indexed
* using more bits of the compressed data to decode the symbol.
*
* A symbol with codeword length n <= ROOTBITS is associated with
* 2**(ROOTBITS - n) direct entries in the table, whereas a symbol with codeword
* length n > ROOTBITS is associated with one or more subtable entries.
*
* Instead of the Huffman symbol itself, entries hold what the emitter needs to
* produce a packet.  Each entry is made of three fields, stored in three
* parallel arrays:
*
*	op:
*		0:          literal, 'val' is the byte (or the precode symbol)
*		16 | n:     length or offset base, 'val' is the base and n the
*		            number of extra bits that follow the codeword
*		96:         end of block
*		64:         invalid codeword
*		1 - 15:     subtable pointer, 'op' is the subtable width
*	bits:
*		number of bits this entry consumes: the codeword length for root
*		entries, the codeword length minus ROOTBITS for subtable entries,
*		and ROOTBITS for subtable pointers
*	val:
*		literal, base value, or subtable start relative to the table start
*/

use crate::deflate_constants::{
    DEFLATE_TABLE_CAPACITY, HUFFDEC_BASE, HUFFDEC_END_OF_BLOCK, HUFFDEC_EXTRA_BITS_MASK,
    HUFFDEC_INVALID, HUFFDEC_LITERAL,
};
use crate::DecodeError;
use std::fmt::{Debug, Formatter};

#[derive(Copy, Clone, PartialEq, Eq, Default)]
pub struct DecodeEntry {
    pub op: u8,
    pub bits: u8,
    pub val: u16,
}

impl DecodeEntry {
    pub const INVALID: DecodeEntry = DecodeEntry::new_invalid(1);

    #[inline(always)]
    pub const fn new_literal(value: u16) -> Self {
        Self {
            op: HUFFDEC_LITERAL,
            bits: 0,
            val: value,
        }
    }

    #[inline(always)]
    pub const fn new_from_base_and_extra_bits(base: u16, num_extra_bits: u8) -> Self {
        Self {
            op: HUFFDEC_BASE | num_extra_bits,
            bits: 0,
            val: base,
        }
    }

    #[inline(always)]
    pub const fn new_end_of_block() -> Self {
        Self {
            op: HUFFDEC_END_OF_BLOCK,
            bits: 0,
            val: 0,
        }
    }

    #[inline(always)]
    pub const fn new_invalid(bits: u8) -> Self {
        Self {
            op: HUFFDEC_INVALID,
            bits,
            val: 0,
        }
    }

    #[inline(always)]
    pub const fn new_subtable_pointer(subtable_start: u16, subtable_bits: u8, root_bits: u8) -> Self {
        Self {
            op: subtable_bits,
            bits: root_bits,
            val: subtable_start,
        }
    }

    #[inline(always)]
    pub const fn with_bits(self, bits: u8) -> Self {
        Self {
            op: self.op,
            bits,
            val: self.val,
        }
    }

    #[inline(always)]
    pub const fn is_literal(&self) -> bool {
        self.op == HUFFDEC_LITERAL
    }

    #[inline(always)]
    pub const fn is_base(&self) -> bool {
        self.op & HUFFDEC_BASE != 0
    }

    #[inline(always)]
    pub const fn is_subtable_pointer(&self) -> bool {
        self.op != HUFFDEC_LITERAL && self.op & (HUFFDEC_BASE | HUFFDEC_INVALID) == 0
    }

    #[inline(always)]
    pub const fn is_end_of_block(&self) -> bool {
        self.op == HUFFDEC_END_OF_BLOCK
    }

    /*
     * Number of extra bits of a base entry, or the width of the subtable a
     * pointer entry refers to.
     */
    #[inline(always)]
    pub const fn extra_bits(&self) -> u32 {
        (self.op & HUFFDEC_EXTRA_BITS_MASK) as u32
    }
}

impl Debug for DecodeEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_literal() {
            write!(f, "Literal({}; {} bits)", self.val, self.bits)
        } else if self.is_base() {
            write!(
                f,
                "Base({} + {} extra; {} bits)",
                self.val,
                self.extra_bits(),
                self.bits
            )
        } else if self.is_subtable_pointer() {
            write!(
                f,
                "Subtable(@{}, {} bits; {} bits)",
                self.val, self.op, self.bits
            )
        } else if self.is_end_of_block() {
            write!(f, "EndOfBlock({} bits)", self.bits)
        } else {
            write!(f, "Invalid({} bits)", self.bits)
        }
    }
}

/*
 * Shared backing storage for the decode tables of one block.  The entries live
 * in three parallel arrays; out of range writes are refused rather than
 * truncated.
 */
#[derive(Clone, PartialEq, Eq)]
pub struct DecodeTable {
    op: Box<[u8]>,
    bits: Box<[u8]>,
    val: Box<[u16]>,
}

impl DecodeTable {
    pub fn new() -> Self {
        Self::with_capacity(DEFLATE_TABLE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            op: vec![DecodeEntry::INVALID.op; capacity].into_boxed_slice(),
            bits: vec![DecodeEntry::INVALID.bits; capacity].into_boxed_slice(),
            val: vec![DecodeEntry::INVALID.val; capacity].into_boxed_slice(),
        }
    }

    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.op.len()
    }

    /*
     * Read an entry.  Lookups only ever index regions laid out by the table
     * builder, which checks them against the capacity.
     */
    #[inline(always)]
    pub fn entry(&self, index: usize) -> DecodeEntry {
        DecodeEntry {
            op: self.op[index],
            bits: self.bits[index],
            val: self.val[index],
        }
    }

    #[inline(always)]
    pub fn set(&mut self, index: usize, entry: DecodeEntry) -> Result<(), DecodeError> {
        if index >= self.capacity() {
            return Err(DecodeError::TableCapacityExceeded);
        }
        self.op[index] = entry.op;
        self.bits[index] = entry.bits;
        self.val[index] = entry.val;
        Ok(())
    }
}

impl Default for DecodeTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{DecodeEntry, DecodeTable};
    use crate::DecodeError;

    #[test]
    fn entry_kinds() {
        let lit = DecodeEntry::new_literal(b'x' as u16).with_bits(8);
        assert!(lit.is_literal() && !lit.is_base() && !lit.is_subtable_pointer());

        let base = DecodeEntry::new_from_base_and_extra_bits(131, 5).with_bits(8);
        assert_eq!(base.op, 21);
        assert!(base.is_base());
        assert_eq!(base.extra_bits(), 5);

        let eob = DecodeEntry::new_end_of_block();
        assert_eq!(eob.op, 96);
        assert!(eob.is_end_of_block() && !eob.is_subtable_pointer() && !eob.is_base());

        let ptr = DecodeEntry::new_subtable_pointer(512, 3, 9);
        assert!(ptr.is_subtable_pointer());
        assert_eq!(ptr.extra_bits(), 3);

        let invalid = DecodeEntry::INVALID;
        assert!(!invalid.is_end_of_block() && !invalid.is_subtable_pointer());
        assert!(!invalid.is_literal() && !invalid.is_base());
    }

    #[test]
    fn table_bounds() {
        let mut table = DecodeTable::with_capacity(4);
        let lit = DecodeEntry::new_literal(7).with_bits(2);
        table.set(3, lit).unwrap();
        assert_eq!(table.entry(3), lit);
        assert_eq!(table.entry(0), DecodeEntry::INVALID);
        assert_eq!(table.set(4, lit), Err(DecodeError::TableCapacityExceeded));
    }
}
