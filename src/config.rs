use crate::deflate_constants::{
    DEFLATE_MAX_PRE_CODEWORD_LEN, LITLEN_ENOUGH, OFFSET_ENOUGH, PRECODE_ENOUGH,
};

pub const PRECODE_TABLEBITS: u32 = 7;
pub const LITLEN_TABLEBITS: u32 = 9;
pub const OFFSET_TABLEBITS: u32 = 6;

/* When you change TABLEBITS, you must change ENOUGH, and vice versa! */
const_assert!(PRECODE_TABLEBITS as usize == DEFLATE_MAX_PRE_CODEWORD_LEN && PRECODE_ENOUGH == 128);
const_assert!(LITLEN_TABLEBITS == 9 && LITLEN_ENOUGH == 852);
const_assert!(OFFSET_TABLEBITS == 6 && OFFSET_ENOUGH == 592);

/*
 * Which symbol emitter decodes the Huffman-coded block bodies.  Both produce
 * the same packets for the same input.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitterKind {
    /* Resolves each lookup after consuming the previous codeword.  */
    Generic,
    /* Computes the follow-up lookups from the unshifted buffer while the
     * current entry is still being classified.  */
    Pipelined,
}

/*
 * Decoder capabilities and table geometry.  The three preset constructors
 * correspond to the three public driver entry points.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderConfig {
    pub supports_stored: bool,
    pub supports_fixed: bool,
    pub supports_dynamic: bool,

    /* Discard one 16-bit word before the first block header.  */
    pub skip_header: bool,

    pub emitter: EmitterKind,

    /* Root table widths; each one is clamped to the code's actual
     * [shortest, longest] codeword length when the table is built.  */
    pub precode_root_bits: u32,
    pub litlen_root_bits: u32,
    pub dist_root_bits: u32,
}

impl DecoderConfig {
    pub fn fixed() -> Self {
        Self {
            supports_dynamic: false,
            ..Self::full()
        }
    }

    pub fn dynamic() -> Self {
        Self {
            supports_fixed: false,
            skip_header: false,
            emitter: EmitterKind::Pipelined,
            ..Self::full()
        }
    }

    pub fn full() -> Self {
        Self {
            supports_stored: true,
            supports_fixed: true,
            supports_dynamic: true,
            skip_header: true,
            emitter: EmitterKind::Generic,
            precode_root_bits: PRECODE_TABLEBITS,
            litlen_root_bits: LITLEN_TABLEBITS,
            dist_root_bits: OFFSET_TABLEBITS,
        }
    }

    pub fn with_emitter(mut self, emitter: EmitterKind) -> Self {
        self.emitter = emitter;
        self
    }

    pub fn with_header_skip(mut self, skip_header: bool) -> Self {
        self.skip_header = skip_header;
        self
    }
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self::full()
    }
}

#[cfg(test)]
mod tests {
    use super::{DecoderConfig, EmitterKind};

    #[test]
    fn presets() {
        let fixed = DecoderConfig::fixed();
        assert!(fixed.supports_stored && fixed.supports_fixed && !fixed.supports_dynamic);
        assert!(fixed.skip_header);

        let dynamic = DecoderConfig::dynamic();
        assert!(dynamic.supports_stored && !dynamic.supports_fixed && dynamic.supports_dynamic);
        assert!(!dynamic.skip_header);
        assert_eq!(dynamic.emitter, EmitterKind::Pipelined);

        assert_eq!(DecoderConfig::default(), DecoderConfig::full());
        assert_eq!(
            DecoderConfig::full()
                .with_emitter(EmitterKind::Pipelined)
                .with_header_skip(false)
                .emitter,
            EmitterKind::Pipelined
        );
    }
}
