mod common;

use common::{replay, sample_text};
use flate2::write::{DeflateEncoder, ZlibEncoder};
use flate2::Compression;
use rayon::prelude::*;
use std::io::{Cursor, Write};
use streaming_deflate_tokens::streams::word_slice_input::WordSliceInput;
use streaming_deflate_tokens::{
    decode_reader_buffered, huffman_decode, huffman_decoder_full, DecodeReport, DecodeStatus,
    DecoderConfig, EmitterKind, Packet,
};

fn zlib(data: &[u8], level: Compression) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), level);
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

fn decode(compressed: &[u8], config: &DecoderConfig) -> (DecodeReport, Vec<(Packet, bool)>) {
    let mut input = WordSliceInput::new(compressed);
    let mut out = Vec::new();
    let report = huffman_decode(config, &mut input, &mut out, compressed.len()).unwrap();
    (report, out)
}

fn check_stream(packets: &[(Packet, bool)], report: &DecodeReport) {
    assert_eq!(report.status, DecodeStatus::Complete);
    assert_eq!(packets.len(), report.packets + 1);
    assert_eq!(packets.last(), Some(&(Packet::terminator(), true)));
    assert!(packets[..report.packets].iter().all(|(_, eos)| !eos));
}

#[test]
fn zlib_streams_at_every_level() {
    let text = sample_text(100_000, 1);
    for level in [Compression::none(), Compression::fast(), Compression::best()] {
        let compressed = zlib(&text, level);

        let mut input = WordSliceInput::new(&compressed);
        let mut out = Vec::new();
        let report = huffman_decoder_full(&mut input, &mut out, compressed.len()).unwrap();

        check_stream(&out, &report);
        assert!(report.blocks >= 1);
        /* the adler32 trailer is drained too */
        assert_eq!(report.bytes_consumed, compressed.len());
        assert_eq!(replay(&out), text);
    }
}

#[test]
fn emitters_agree() {
    let text = sample_text(40_000, 2);
    for level in [Compression::fast(), Compression::default(), Compression::best()] {
        let compressed = zlib(&text, level);

        let generic = decode(
            &compressed,
            &DecoderConfig::full().with_emitter(EmitterKind::Generic),
        );
        let pipelined = decode(
            &compressed,
            &DecoderConfig::full().with_emitter(EmitterKind::Pipelined),
        );

        check_stream(&generic.1, &generic.0);
        assert_eq!(generic, pipelined);
        assert_eq!(replay(&generic.1), text);
    }
}

#[test]
fn raw_deflate_without_header() {
    let text = sample_text(10_000, 3);
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&text).unwrap();
    let compressed = encoder.finish().unwrap();

    let (report, out) = decode(&compressed, &DecoderConfig::full().with_header_skip(false));
    check_stream(&out, &report);
    assert_eq!(replay(&out), text);
}

#[test]
fn matches_stay_within_bounds() {
    let text = sample_text(30_000, 4);
    let (report, out) = decode(&zlib(&text, Compression::best()), &DecoderConfig::full());

    let mut produced = 0usize;
    for (packet, _) in &out[..report.packets] {
        if packet.is_match() {
            assert!((3..=258).contains(&packet.match_length()));
            assert!((1..=32768).contains(&packet.match_distance()));
            assert!(packet.match_distance() as usize <= produced);
            produced += packet.match_length() as usize;
        } else {
            produced += 1;
        }
    }
    assert_eq!(produced, text.len());
}

#[test]
fn chunked_reader_with_odd_buffer_sizes() {
    let text = sample_text(20_000, 5);
    let compressed = zlib(&text, Compression::default());
    let (_, expected) = decode(&compressed, &DecoderConfig::full());

    for buf_size in [5, 7, 64, 4096] {
        let mut packets = Vec::new();
        let mut last_flag = false;
        let report = decode_reader_buffered(
            Cursor::new(&compressed),
            compressed.len(),
            &DecoderConfig::full(),
            |chunk, end_of_stream| {
                packets.extend(chunk.iter().map(|p| (*p, false)));
                last_flag = end_of_stream;
                Ok(())
            },
            buf_size,
        )
        .unwrap();

        assert!(last_flag);
        if let Some(last) = packets.last_mut() {
            last.1 = true;
        }
        assert_eq!(report.bytes_consumed, compressed.len());
        assert_eq!(packets, expected);
    }
}

#[test]
fn parallel_decodes() {
    let results: Vec<bool> = (0..32u32)
        .into_par_iter()
        .map(|seed| {
            let text = sample_text(5_000 + seed as usize * 311, seed);
            let level = Compression::new(seed % 10);
            let (report, out) = decode(&zlib(&text, level), &DecoderConfig::full());
            report.status == DecodeStatus::Complete && replay(&out) == text
        })
        .collect();

    assert!(results.iter().all(|ok| *ok));
}
