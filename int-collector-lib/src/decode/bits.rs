use super::error::DecodeError;

/// Sequential MSB-first reader of unsigned integers of arbitrary bit width.
///
/// The cursor never moves past the end of its buffer: a read that would
/// overrun fails and leaves the position untouched.
#[derive(Debug, Clone)]
pub struct BitCursor<'a> {
    buf: &'a [u8],
    position: usize,
}

impl<'a> BitCursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, position: 0 }
    }

    /// Cursor starting `bit_offset` bits into `buf`, clamped to its length.
    pub fn at(buf: &'a [u8], bit_offset: usize) -> Self {
        let position = bit_offset.min(buf.len().saturating_mul(8));
        Self { buf, position }
    }

    /// Current position in bits.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn len_bits(&self) -> usize {
        self.buf.len().saturating_mul(8)
    }

    pub fn remaining(&self) -> usize {
        self.len_bits().saturating_sub(self.position)
    }

    /// Byte index of the next unread bit, rounding partial bytes up.
    pub fn byte_offset(&self) -> usize {
        self.position.div_ceil(8)
    }

    /// Read `width` bits (1..=64) as an unsigned integer.
    pub fn read(&mut self, width: u32) -> Result<u64, DecodeError> {
        if width == 0 || width > u64::BITS {
            return Err(DecodeError::InvalidWidth(width));
        }
        self.check(width)?;

        let mut value = 0u64;
        let mut pos = self.position;
        let mut left = width as usize;
        while left > 0 {
            let byte = self.buf.get(pos / 8).copied().ok_or(DecodeError::BitUnderrun {
                position: self.position,
                width,
                remaining: self.remaining(),
            })?;
            let bit_in_byte = pos % 8;
            let take = (8 - bit_in_byte).min(left);
            let shift = 8 - bit_in_byte - take;
            let mask = (1u16 << take) - 1;
            let chunk = (u16::from(byte) >> shift) & mask;
            value = (value << take) | u64::from(chunk);
            pos += take;
            left -= take;
        }

        self.position = pos;
        Ok(value)
    }

    /// Advance `width` bits without producing a value.
    pub fn skip(&mut self, width: usize) -> Result<(), DecodeError> {
        if width > self.remaining() {
            return Err(DecodeError::BitUnderrun {
                position: self.position,
                width: u32::try_from(width).unwrap_or(u32::MAX),
                remaining: self.remaining(),
            });
        }
        self.position += width;
        Ok(())
    }

    pub fn read_flag(&mut self) -> Result<bool, DecodeError> {
        Ok(self.read(1)? == 1)
    }

    pub fn read_u8(&mut self, width: u32) -> Result<u8, DecodeError> {
        self.read_narrow(width, u8::BITS).map(|v| v as u8)
    }

    pub fn read_u16(&mut self, width: u32) -> Result<u16, DecodeError> {
        self.read_narrow(width, u16::BITS).map(|v| v as u16)
    }

    pub fn read_u32(&mut self, width: u32) -> Result<u32, DecodeError> {
        self.read_narrow(width, u32::BITS).map(|v| v as u32)
    }

    // Width is bounded by the target type, so the narrowing casts above are lossless.
    fn read_narrow(&mut self, width: u32, max: u32) -> Result<u64, DecodeError> {
        if width > max {
            return Err(DecodeError::InvalidWidth(width));
        }
        self.read(width)
    }

    fn check(&self, width: u32) -> Result<(), DecodeError> {
        let remaining = self.remaining();
        if width as usize > remaining {
            return Err(DecodeError::BitUnderrun { position: self.position, width, remaining });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_msb_first_across_byte_boundaries() {
        let buf = [0b1010_1100, 0b0101_0011];
        let mut cursor = BitCursor::new(&buf);
        assert_eq!(cursor.read(4), Ok(0b1010));
        assert_eq!(cursor.read(6), Ok(0b1100_01));
        assert_eq!(cursor.read(6), Ok(0b01_0011));
        assert_eq!(cursor.remaining(), 0);
    }

    #[test]
    fn reads_full_width_values() {
        let buf = [0xde, 0xad, 0xbe, 0xef, 0x01, 0x23, 0x45, 0x67];
        let mut cursor = BitCursor::new(&buf);
        assert_eq!(cursor.read(64), Ok(0xdead_beef_0123_4567));
    }

    #[test]
    fn overrun_leaves_position_untouched() {
        let buf = [0xff];
        let mut cursor = BitCursor::new(&buf);
        assert_eq!(cursor.read(3), Ok(0b111));
        let err = cursor.read(6);
        assert_eq!(err, Err(DecodeError::BitUnderrun { position: 3, width: 6, remaining: 5 }));
        assert_eq!(cursor.position(), 3);
        assert_eq!(cursor.read(5), Ok(0b11111));
    }

    #[test]
    fn rejects_invalid_widths() {
        let buf = [0u8; 16];
        let mut cursor = BitCursor::new(&buf);
        assert_eq!(cursor.read(0), Err(DecodeError::InvalidWidth(0)));
        assert_eq!(cursor.read(65), Err(DecodeError::InvalidWidth(65)));
        assert_eq!(cursor.read_u8(9), Err(DecodeError::InvalidWidth(9)));
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn values_never_exceed_width() {
        let buf = [0xffu8; 8];
        for width in 1..=63u32 {
            let mut cursor = BitCursor::new(&buf);
            let value = cursor.read(width).unwrap_or(u64::MAX);
            assert_eq!(value, (1u64 << width) - 1, "width {width}");
        }
    }

    #[test]
    fn at_and_skip_track_byte_offset() {
        let buf = [0x00, 0x0f, 0xf0];
        let mut cursor = BitCursor::at(&buf, 12);
        assert_eq!(cursor.read(8), Ok(0xff));
        assert_eq!(cursor.byte_offset(), 3);
        assert!(cursor.skip(5).is_err());
        assert!(cursor.skip(4).is_ok());
        assert_eq!(cursor.remaining(), 0);

        let clamped = BitCursor::at(&buf, 100);
        assert_eq!(clamped.position(), 24);
    }
}
