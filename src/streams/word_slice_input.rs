use crate::WordInput;

/*
 * Word input over an in-memory buffer.  An odd trailing byte is returned as a
 * word with a zero high byte.
 */
pub struct WordSliceInput<'a> {
    data: &'a [u8],
    position: usize,
    words_read: usize,
}

impl<'a> WordSliceInput<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            position: 0,
            words_read: 0,
        }
    }

    pub fn words_read(&self) -> usize {
        self.words_read
    }

    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.position..]
    }
}

impl<'a> WordInput for WordSliceInput<'a> {
    #[inline(always)]
    fn read_word(&mut self) -> Option<u16> {
        let word = match self.data[self.position..] {
            [lo, hi, ..] => u16::from_le_bytes([lo, hi]),
            [lo] => lo as u16,
            [] => return None,
        };
        self.position = (self.position + 2).min(self.data.len());
        self.words_read += 1;
        Some(word)
    }
}
