use crate::packet::Packet;
use crate::{DecodeError, PacketOutput};

/*
 * Packet output collecting packets into a buffer of 'buf_size' entries and
 * handing each full buffer to a write callback.  The terminator is flushed
 * together with whatever is still buffered, with the end-of-stream flag set;
 * every other flush has it clear.
 */
pub struct DeflateChunkedPacketOutput<'a> {
    buffer: Vec<Packet>,
    buf_size: usize,
    written: usize,
    func: Box<dyn FnMut(&[Packet], bool) -> Result<(), ()> + 'a>,
}

impl<'a> DeflateChunkedPacketOutput<'a> {
    pub fn new<F: FnMut(&[Packet], bool) -> Result<(), ()> + 'a>(
        write_func: F,
        buf_size: usize,
    ) -> Self {
        let buf_size = buf_size.max(1);
        Self {
            buffer: Vec::with_capacity(buf_size),
            buf_size,
            written: 0,
            func: Box::new(write_func),
        }
    }

    /* Packets handed to the callback so far.  */
    pub fn written(&self) -> usize {
        self.written
    }

    fn flush_buffer(&mut self, end_of_stream: bool) -> Result<(), DecodeError> {
        (self.func)(&self.buffer, end_of_stream).map_err(|_| DecodeError::OutputRejected)?;
        self.written += self.buffer.len();
        self.buffer.clear();
        Ok(())
    }
}

impl<'a> PacketOutput for DeflateChunkedPacketOutput<'a> {
    #[inline(always)]
    fn write_packet(&mut self, packet: Packet, end_of_stream: bool) -> Result<(), DecodeError> {
        self.buffer.push(packet);
        if end_of_stream {
            self.flush_buffer(true)
        } else if self.buffer.len() >= self.buf_size {
            self.flush_buffer(false)
        } else {
            Ok(())
        }
    }
}
