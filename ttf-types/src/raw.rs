//! types for working with raw big-endian bytes

/// A trait for font scalars.
///
/// This is an internal trait for encoding and decoding big-endian bytes.
/// Every value stored in a font file is big-endian; implementors describe
/// how to go from that raw byte array to a native value and back.
pub trait Scalar: Sized {
    /// The raw byte representation of this type.
    type Raw: sealed::BeByteArray;

    /// The size of the raw type. Essentially an alias for `std::mem::size_of`.
    const RAW_BYTE_LEN: usize = std::mem::size_of::<Self::Raw>();

    /// Create an instance of this type from raw big-endian bytes
    fn from_raw(raw: Self::Raw) -> Self;

    /// Encode this type as raw big-endian bytes
    fn to_raw(self) -> Self::Raw;

    /// Attempt to read a scalar from a slice.
    ///
    /// This will always fail if the slice length does not equal
    /// [`Self::RAW_BYTE_LEN`].
    fn read(slice: &[u8]) -> Option<Self> {
        sealed::BeByteArray::from_slice(slice).map(Self::from_raw)
    }
}

pub(crate) mod sealed {
    /// A trait for the fixed-size byte arrays backing scalar values.
    ///
    /// This is sealed; only `[u8; N]` implements it.
    pub trait BeByteArray: Copy + AsRef<[u8]> {
        /// Must always succeed for `[u8; N]` if `slice.len() == N`, must fail otherwise
        fn from_slice(slice: &[u8]) -> Option<Self>;
    }

    impl<const N: usize> BeByteArray for [u8; N] {
        fn from_slice(slice: &[u8]) -> Option<Self> {
            slice.try_into().ok()
        }
    }
}

/// An internal macro for implementing the `Scalar` trait for newtypes.
#[macro_export]
#[doc(hidden)]
macro_rules! newtype_scalar {
    ($name:ident, $raw:ty) => {
        impl $crate::Scalar for $name {
            type Raw = $raw;
            fn to_raw(self) -> $raw {
                $crate::Scalar::to_raw(self.0)
            }

            fn from_raw(raw: $raw) -> Self {
                Self($crate::Scalar::from_raw(raw))
            }
        }
    };
}

macro_rules! int_scalar {
    ($ty:ty, $raw:ty) => {
        impl crate::raw::Scalar for $ty {
            type Raw = $raw;
            fn to_raw(self) -> $raw {
                self.to_be_bytes()
            }

            fn from_raw(raw: $raw) -> $ty {
                Self::from_be_bytes(raw)
            }
        }
    };
}

int_scalar!(u8, [u8; 1]);
int_scalar!(i8, [u8; 1]);
int_scalar!(u16, [u8; 2]);
int_scalar!(i16, [u8; 2]);
int_scalar!(u32, [u8; 4]);
int_scalar!(i32, [u8; 4]);
int_scalar!(u64, [u8; 8]);
int_scalar!(i64, [u8; 8]);

#[cfg(test)]
mod tests {
    use super::Scalar;

    #[test]
    fn read_requires_exact_length() {
        assert_eq!(u16::read(&[0x12, 0x34]), Some(0x1234));
        assert_eq!(u16::read(&[0x12]), None);
        assert_eq!(u16::read(&[0x12, 0x34, 0x56]), None);
    }

    #[test]
    fn signed_values_are_twos_complement() {
        assert_eq!(i8::read(&[0xFF]), Some(-1));
        assert_eq!(i16::read(&[0xFF, 0xFE]), Some(-2));
        assert_eq!(i32::read(&[0x80, 0, 0, 0]), Some(i32::MIN));
        assert_eq!(i64::read(&[0xFF; 8]), Some(-1));
    }

    #[test]
    fn raw_byte_len() {
        assert_eq!(u8::RAW_BYTE_LEN, 1);
        assert_eq!(i16::RAW_BYTE_LEN, 2);
        assert_eq!(u32::RAW_BYTE_LEN, 4);
        assert_eq!(u64::RAW_BYTE_LEN, 8);
    }
}
