pub mod deflate_chunked_packet_output;
pub mod deflate_chunked_word_input;
pub mod word_slice_input;
