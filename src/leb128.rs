//! LEB128 variable-length integer encoding/decoding.

#![allow(clippy::as_conversions)]

use crate::error::DecodeError;

/// Types that can be decoded from / encoded to a LEB128 varint.
pub trait LebCodec: Sized {
    const MAX_LEB_BYTES: u32;

    /// Decode a LEB128 varint from the front of `data`.
    ///
    /// # Safety
    ///
    /// The caller must ensure `data` is valid for `Self::MAX_LEB_BYTES`
    /// bytes to be read, or that a byte `< 0x80` appears before that many
    /// bytes have been read. See [`LebCodec::decode_leb128_safe`] for a
    /// safe wrapper that upholds this.
    unsafe fn decode_leb128(data: &[u8]) -> Result<(Self, usize), DecodeError>;

    /// Decode a LEB128 varint from `data`, bounds-checking first.
    fn decode_leb128_safe(data: &[u8]) -> Result<(Self, usize), DecodeError> {
        if data.len() >= Self::MAX_LEB_BYTES as usize {
            // SAFETY: `data` has at least `MAX_LEB_BYTES` bytes.
            return unsafe { Self::decode_leb128(data) };
        }

        // Slow path: copy into a buffer long enough for the unsafe fast
        // path so a short trailing input can't read out of bounds; if the
        // real varint doesn't terminate within `data`, decode_leb128 will
        // read into the zero padding, which looks like a terminating byte,
        // so we additionally check the byte count actually consumed was
        // within the real input.
        let mut buffer = [0u8; 16];
        let len = data.len().min(16);
        buffer[..len].copy_from_slice(&data[..len]);

        // SAFETY: buffer is 16 bytes, more than any MAX_LEB_BYTES.
        let (value, consumed) = unsafe { Self::decode_leb128(&buffer[..])? };
        if consumed > len {
            return Err(DecodeError::truncated_varint());
        }
        Ok((value, consumed))
    }

    /// Encode `self` as a LEB128 varint into `buf`, returning bytes written.
    fn encode_leb128<B: bytes::BufMut>(self, buf: &mut B) -> usize;

    /// The number of bytes required to encode this integer.
    fn encoded_leb128_len(self) -> usize;
}

impl LebCodec for u64 {
    const MAX_LEB_BYTES: u32 = 10;

    #[inline(always)]
    unsafe fn decode_leb128(data: &[u8]) -> Result<(Self, usize), DecodeError> {
        let mut b: u8 = unsafe { *data.get_unchecked(0) };
        let mut value = b as u64;
        if b < 0x80 {
            return Ok((value, 1));
        };
        value -= 0x80;

        b = unsafe { *data.get_unchecked(1) };
        value += (b as u64) << 7;
        if b < 0x80 {
            return Ok((value, 2));
        };
        value -= 0x80 << 7;

        b = unsafe { *data.get_unchecked(2) };
        value += (b as u64) << 14;
        if b < 0x80 {
            return Ok((value, 3));
        };
        value -= 0x80 << 14;

        b = unsafe { *data.get_unchecked(3) };
        value += (b as u64) << 21;
        if b < 0x80 {
            return Ok((value, 4));
        };
        value -= 0x80 << 21;

        b = unsafe { *data.get_unchecked(4) };
        value += (b as u64) << 28;
        if b < 0x80 {
            return Ok((value, 5));
        };
        value -= 0x80 << 28;

        b = unsafe { *data.get_unchecked(5) };
        value += (b as u64) << 35;
        if b < 0x80 {
            return Ok((value, 6));
        };
        value -= 0x80 << 35;

        b = unsafe { *data.get_unchecked(6) };
        value += (b as u64) << 42;
        if b < 0x80 {
            return Ok((value, 7));
        };
        value -= 0x80 << 42;

        b = unsafe { *data.get_unchecked(7) };
        value += (b as u64) << 49;
        if b < 0x80 {
            return Ok((value, 8));
        };
        value -= 0x80 << 49;

        b = unsafe { *data.get_unchecked(8) };
        value += (b as u64) << 56;
        if b < 0x80 {
            return Ok((value, 9));
        };
        value -= 0x80 << 56;

        b = unsafe { *data.get_unchecked(9) };
        value += (b as u64) << 63;
        if b < 0x02 {
            return Ok((value, 10));
        };

        // Read 10 bytes without finding a terminator, or overflowed u64::MAX.
        Err(DecodeError::overlong_varint())
    }

    #[inline]
    fn encode_leb128<B: bytes::BufMut>(self, buf: &mut B) -> usize {
        let mut value = self;
        let mut written = 0;
        loop {
            let byte = (value & 0x7f) as u8;
            value >>= 7;
            written += 1;
            if value == 0 {
                buf.put_u8(byte);
                return written;
            }
            buf.put_u8(byte | 0x80);
        }
    }

    /// Compute the LEB128 encoded length using leading_zeros.
    #[inline]
    fn encoded_leb128_len(self) -> usize {
        #[rustfmt::skip]
        const LZ_TO_LEN: [u8; 65] = [
            10,
            9, 9, 9, 9, 9, 9, 9,
            8, 8, 8, 8, 8, 8, 8,
            7, 7, 7, 7, 7, 7, 7,
            6, 6, 6, 6, 6, 6, 6,
            5, 5, 5, 5, 5, 5, 5,
            4, 4, 4, 4, 4, 4, 4,
            3, 3, 3, 3, 3, 3, 3,
            2, 2, 2, 2, 2, 2, 2,
            1, 1, 1, 1, 1, 1, 1, 1,
        ];
        // SAFETY: leading_zeros() returns 0-64 for u64, in bounds.
        LZ_TO_LEN[self.leading_zeros() as usize] as usize
    }
}

impl LebCodec for u32 {
    const MAX_LEB_BYTES: u32 = 5;

    #[inline]
    unsafe fn decode_leb128(data: &[u8]) -> Result<(Self, usize), DecodeError> {
        let mut b: u8 = unsafe { *data.get_unchecked(0) };
        let mut value = b as u32;
        if b < 0x80 {
            return Ok((value, 1));
        };
        value -= 0x80;

        b = unsafe { *data.get_unchecked(1) };
        value += (b as u32) << 7;
        if b < 0x80 {
            return Ok((value, 2));
        };
        value -= 0x80 << 7;

        b = unsafe { *data.get_unchecked(2) };
        value += (b as u32) << 14;
        if b < 0x80 {
            return Ok((value, 3));
        };
        value -= 0x80 << 14;

        b = unsafe { *data.get_unchecked(3) };
        value += (b as u32) << 21;
        if b < 0x80 {
            return Ok((value, 4));
        };
        value -= 0x80 << 21;

        b = unsafe { *data.get_unchecked(4) };
        value += (b as u32) << 28;
        if b < 0x10 {
            return Ok((value, 5));
        };

        Err(DecodeError::overlong_varint())
    }

    #[inline]
    fn encode_leb128<B: bytes::BufMut>(self, buf: &mut B) -> usize {
        (self as u64).encode_leb128(buf)
    }

    #[inline]
    fn encoded_leb128_len(self) -> usize {
        #[rustfmt::skip]
        const LZ_TO_LEN: [u8; 33] = [
            5, 5, 5, 5,
            4, 4, 4, 4, 4, 4, 4,
            3, 3, 3, 3, 3, 3, 3,
            2, 2, 2, 2, 2, 2, 2,
            1, 1, 1, 1, 1, 1, 1, 1,
        ];
        // SAFETY: leading_zeros() returns 0-32 for u32, in bounds.
        LZ_TO_LEN[self.leading_zeros() as usize] as usize
    }
}
