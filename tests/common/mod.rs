#![allow(dead_code)]

use streaming_deflate_tokens::Packet;

/* LSB-first bit writer; Huffman codes go most significant bit first.  */
#[derive(Default)]
pub struct BitWriter {
    bytes: Vec<u8>,
    bitbuf: u64,
    bitcount: u32,
}

impl BitWriter {
    pub fn with_header() -> Self {
        let mut w = Self::default();
        w.write_bits(0x78, 8);
        w.write_bits(0x01, 8);
        w
    }

    pub fn write_bits(&mut self, value: u32, nbits: u32) {
        self.bitbuf |= (value as u64) << self.bitcount;
        self.bitcount += nbits;
        while self.bitcount >= 8 {
            self.bytes.push(self.bitbuf as u8);
            self.bitbuf >>= 8;
            self.bitcount -= 8;
        }
    }

    pub fn write_code(&mut self, code: u32, len: u32) {
        for i in (0..len).rev() {
            self.write_bits((code >> i) & 1, 1);
        }
    }

    pub fn finish(mut self) -> Vec<u8> {
        if self.bitcount > 0 {
            self.bytes.push(self.bitbuf as u8);
        }
        self.bytes
    }
}

pub fn write_block_header(w: &mut BitWriter, is_final: bool, block_type: u32) {
    w.write_bits(is_final as u32, 1);
    w.write_bits(block_type, 2);
}

/* Static code of a literal/length symbol.  */
pub fn write_fixed_symbol(w: &mut BitWriter, sym: u32) {
    match sym {
        0..=143 => w.write_code(0x30 + sym, 8),
        144..=255 => w.write_code(0x190 + (sym - 144), 9),
        256..=279 => w.write_code(sym - 256, 7),
        _ => w.write_code(0xC0 + (sym - 280), 8),
    }
}

pub fn write_fixed_literal(w: &mut BitWriter, byte: u8) {
    write_fixed_symbol(w, byte as u32);
}

pub fn write_fixed_end_of_block(w: &mut BitWriter) {
    write_fixed_symbol(w, 256);
}

/* Lengths 3 - 10 and distances 1 - 4, the ones without extra bits.  */
pub fn write_fixed_short_match(w: &mut BitWriter, length: u32, distance: u32) {
    assert!((3..=10).contains(&length) && (1..=4).contains(&distance));
    write_fixed_symbol(w, 254 + length);
    w.write_code(distance - 1, 5);
}

/*
 * Rebuild the uncompressed data from the packets, stopping at the terminator.
 */
pub fn replay(packets: &[(Packet, bool)]) -> Vec<u8> {
    let mut data = Vec::new();
    for (packet, end_of_stream) in packets {
        if *end_of_stream {
            break;
        }
        match packet.literal_byte() {
            Some(byte) => data.push(byte),
            None => {
                let start = data.len() - packet.match_distance() as usize;
                for i in 0..packet.match_length() as usize {
                    data.push(data[start + i]);
                }
            }
        }
    }
    data
}

/* Deterministic text with plenty of repeats at varying distances.  */
pub fn sample_text(len: usize, seed: u32) -> Vec<u8> {
    const WORDS: [&str; 12] = [
        "deflate", "huffman", "block", "stream", "literal", "length", "distance", "table",
        "window", "symbol", "code", "packet",
    ];
    let mut state = seed.wrapping_mul(2654435761).wrapping_add(1);
    let mut text = Vec::with_capacity(len + 16);
    while text.len() < len {
        state = state.wrapping_mul(1103515245).wrapping_add(12345);
        let word = WORDS[(state >> 16) as usize % WORDS.len()];
        text.extend_from_slice(word.as_bytes());
        text.push(if (state >> 8) % 7 == 0 { b'\n' } else { b' ' });
        if (state >> 4) % 13 == 0 {
            text.push((state >> 24) as u8);
        }
    }
    text.truncate(len);
    text
}
