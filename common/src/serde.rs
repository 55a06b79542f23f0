//! Byte-level deserialization for binary mesh formats.

#[rustfmt::skip]
pub trait Deserializer {
    fn pos(&self) -> usize;
    fn size(&self) -> usize;
    fn advance_by(&mut self, amount: usize);
    fn read_bytes(&mut self, length: usize) -> &[u8];

    fn is_eof(&self) -> bool { self.pos() >= self.size() }

    /// Reads a fixed-length array, zero filling anything past the end of the
    /// input.
    fn read_array<const LENGTH: usize>(&mut self) -> [u8; LENGTH] {
        let mut array = [0; LENGTH];
        let bytes = self.read_bytes(LENGTH);
        let length = bytes.len().min(LENGTH);
        array[..length].copy_from_slice(&bytes[..length]);
        array
    }

    fn read_u32_le(&mut self) -> u32 { u32::from_le_bytes(self.read_array()) }
    fn read_f32_le(&mut self) -> f32 { f32::from_le_bytes(self.read_array()) }
}

pub struct SliceDeserializer<'a> {
    buffer: &'a [u8],
    offset: usize,
}

impl<'a> SliceDeserializer<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, offset: 0 }
    }
}

impl Deserializer for SliceDeserializer<'_> {
    fn pos(&self) -> usize {
        self.offset
    }

    fn size(&self) -> usize {
        self.buffer.len()
    }

    fn advance_by(&mut self, amount: usize) {
        self.offset = (self.offset + amount).min(self.buffer.len());
    }

    // Reads past the end come back short; callers validate sizes up front.
    fn read_bytes(&mut self, length: usize) -> &[u8] {
        let end = (self.offset + length).min(self.buffer.len());
        let bytes = &self.buffer[self.offset..end];
        self.offset = end;
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_little_endian_values() {
        let buffer = [0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x80, 0x3f];
        let mut des = SliceDeserializer::new(&buffer);

        assert_eq!(des.read_u32_le(), 1);
        assert_eq!(des.read_f32_le(), 1.0);
        assert!(des.is_eof());
    }

    #[test]
    fn advancing_tracks_position() {
        let buffer = [0; 16];
        let mut des = SliceDeserializer::new(&buffer);

        des.advance_by(10);
        assert_eq!(des.pos(), 10);
        des.advance_by(100);
        assert_eq!(des.pos(), 16);
    }

    #[test]
    fn short_reads_zero_fill() {
        let buffer = [0xff, 0xff];
        let mut des = SliceDeserializer::new(&buffer);

        assert_eq!(des.read_array::<4>(), [0xff, 0xff, 0x00, 0x00]);
        assert!(des.is_eof());
    }
}
