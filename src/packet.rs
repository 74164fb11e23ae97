use std::fmt::{Debug, Formatter};

/*
 * One LZ77 token in 32 bits.
 *
 *	Literal:
 *		Bit 31-8:   0
 *		Bit 7-0:    literal byte
 *	Match:
 *		Bit 31-16:  match length (3 - 258)
 *		Bit 15-0:   match distance (1 - 32768)
 *
 * A match is always complete: the length is staged by the emitter and written
 * together with its distance once that has been decoded.  The all-zero packet
 * doubles as the stream terminator, which is told apart from a literal NUL by
 * the end-of-stream flag that travels with it.
 */
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Packet(pub u32);

const_assert!(crate::deflate_constants::DEFLATE_MAX_MATCH_LEN < (1 << 16));
const_assert!(crate::deflate_constants::DEFLATE_MAX_MATCH_OFFSET < (1 << 16));

impl Packet {
    #[inline(always)]
    pub const fn literal(byte: u8) -> Self {
        Self(byte as u32)
    }

    #[inline(always)]
    pub const fn matched(length: u32, distance: u32) -> Self {
        Self((length << 16) | (distance & 0xFFFF))
    }

    #[inline(always)]
    pub const fn terminator() -> Self {
        Self(0)
    }

    #[inline(always)]
    pub const fn raw(&self) -> u32 {
        self.0
    }

    #[inline(always)]
    pub const fn is_match(&self) -> bool {
        (self.0 >> 16) != 0
    }

    #[inline(always)]
    pub const fn match_length(&self) -> u32 {
        self.0 >> 16
    }

    #[inline(always)]
    pub const fn match_distance(&self) -> u32 {
        self.0 & 0xFFFF
    }

    pub fn literal_byte(&self) -> Option<u8> {
        if self.is_match() {
            None
        } else {
            Some(self.0 as u8)
        }
    }
}

impl Debug for Packet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_match() {
            write!(
                f,
                "Match({}, {})",
                self.match_length(),
                self.match_distance()
            )
        } else {
            write!(f, "Literal({:#04x})", self.0 as u8)
        }
    }
}
