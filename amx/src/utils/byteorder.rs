//! Little-endian serialization helpers for RIFF payloads.

pub trait WriteBytesLe {
    fn write_le(&self, dst: &mut Vec<u8>);
}

macro_rules! impl_num_le {
    ($($t:ty),+) => { $(
        impl WriteBytesLe for $t { #[inline] fn write_le(&self, dst: &mut Vec<u8>) { dst.extend_from_slice(&self.to_le_bytes()); }}
    )+ }
}

impl_num_le!(u8, i8, u16, i16, u32, i32, u64, i64);

impl<T: WriteBytesLe> WriteBytesLe for Vec<T> {
    #[inline]
    fn write_le(&self, dst: &mut Vec<u8>) {
        self.iter().for_each(|item| item.write_le(dst));
    }
}

impl<T: WriteBytesLe, const N: usize> WriteBytesLe for [T; N] {
    #[inline]
    fn write_le(&self, dst: &mut Vec<u8>) {
        self.iter().for_each(|item| item.write_le(dst));
    }
}

/// Concatenates the little-endian encoding of every argument.
#[macro_export]
macro_rules! join_bytes_le {
    ( $($value:expr),+ $(,)? ) => {{
        let mut vec = Vec::<u8>::new();
        $( $crate::utils::byteorder::WriteBytesLe::write_le(&$value, &mut vec); )+
        vec
    }};
}

/// Decodes a signed 24-bit little-endian sample.
#[inline]
pub fn i24_from_le_bytes(bytes: [u8; 3]) -> i32 {
    i32::from_le_bytes([0, bytes[0], bytes[1], bytes[2]]) >> 8
}

/// Encodes the low 24 bits of `sample`, little-endian.
#[inline]
pub fn i24_to_le_bytes(sample: i32) -> [u8; 3] {
    let bytes = sample.to_le_bytes();
    [bytes[0], bytes[1], bytes[2]]
}
