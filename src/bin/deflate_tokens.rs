use anyhow::Context;
use filebuffer::FileBuffer;
use log::{LevelFilter, Metadata, Record};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use streaming_deflate_tokens::streams::word_slice_input::WordSliceInput;
use streaming_deflate_tokens::{
    huffman_decode, DecodeError, DecoderConfig, EmitterKind, Packet, PacketOutput,
};
use structopt::StructOpt;

#[derive(StructOpt)]
#[structopt(about = "Dump the LZ77 tokens of a DEFLATE stream")]
struct TokensParams {
    input: PathBuf,
    output: Option<PathBuf>,

    /// Block types to accept: fixed, dynamic or full
    #[structopt(long, default_value = "full")]
    decoder: String,

    /// The first block starts at byte 0 (no 2-byte header)
    #[structopt(long)]
    raw: bool,

    /// Use the pipelined symbol emitter
    #[structopt(long)]
    pipelined: bool,

    /// Only print the summary
    #[structopt(short)]
    simulate: bool,

    #[structopt(short, parse(from_occurrences))]
    verbose: u8,
}

struct StderrLogger;

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

static STDERR_LOGGER: StderrLogger = StderrLogger;

fn init_logger(verbose: u8) {
    if log::set_logger(&STDERR_LOGGER).is_err() {
        return;
    }
    log::set_max_level(match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    });
}

/* Writes one line per token; I/O errors are kept aside and reported after the decode.  */
struct TokenWriter<W: Write> {
    writer: Option<W>,
    io_error: Option<std::io::Error>,
}

impl<W: Write> PacketOutput for TokenWriter<W> {
    fn write_packet(&mut self, packet: Packet, end_of_stream: bool) -> Result<(), DecodeError> {
        let Some(writer) = self.writer.as_mut() else {
            return Ok(());
        };

        let result = if end_of_stream {
            writer.flush()
        } else if packet.is_match() {
            writeln!(
                writer,
                "M {} {}",
                packet.match_length(),
                packet.match_distance()
            )
        } else {
            writeln!(writer, "L {}", packet.raw())
        };

        result.map_err(|err| {
            self.io_error = Some(err);
            DecodeError::OutputRejected
        })
    }
}

fn main() -> anyhow::Result<()> {
    let params: TokensParams = TokensParams::from_args();
    init_logger(params.verbose);

    let config = match params.decoder.as_str() {
        "fixed" => DecoderConfig::fixed(),
        "dynamic" => DecoderConfig::dynamic(),
        "full" => DecoderConfig::full(),
        other => anyhow::bail!("Unknown decoder '{}', expected fixed, dynamic or full", other),
    };
    let config = config
        .with_header_skip(!params.raw)
        .with_emitter(if params.pipelined {
            EmitterKind::Pipelined
        } else {
            EmitterKind::Generic
        });

    let file = FileBuffer::open(&params.input)
        .with_context(|| format!("Cannot open {}", params.input.display()))?;

    let writer: Option<Box<dyn Write>> = if params.simulate {
        None
    } else {
        Some(match &params.output {
            Some(path) => Box::new(BufWriter::new(
                File::create(path).with_context(|| format!("Cannot create {}", path.display()))?,
            )),
            None => Box::new(BufWriter::new(std::io::stdout().lock())),
        })
    };

    let mut output = TokenWriter {
        writer,
        io_error: None,
    };
    let mut input = WordSliceInput::new(&file);

    let result = huffman_decode(&config, &mut input, &mut output, file.len());
    if let Some(err) = output.io_error.take() {
        return Err(err).context("Cannot write the tokens");
    }
    let report =
        result.with_context(|| format!("Cannot decode {}", params.input.display()))?;

    eprintln!(
        "{:?}: {} blocks, {} tokens, {} bytes read",
        report.status, report.blocks, report.packets, report.bytes_consumed
    );
    Ok(())
}
