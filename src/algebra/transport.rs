//! Wire datatype descriptors for shipping elements between processes.
//!
//! The redistribution layer that consumes this crate moves element buffers
//! over a message-passing transport. Each element type advertises the
//! datatype the transport should use: a standard named datatype for the
//! primitive rings, or a contiguous run of raw bytes for everything else.

use std::fmt;

/// Transport datatype of one element.
///
/// Primitive rings map to the standard named datatypes so that peers built
/// against different element tables still agree on the wire format. Any
/// other element travels as `Contiguous(n)`: `n` opaque bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Bool,
    Char,
    Int32,
    Uint32,
    Int64,
    Uint64,
    Float,
    Double,
    ComplexFloat,
    ComplexDouble,
    /// Constructed byte-contiguous datatype for a non-primitive element.
    Contiguous(usize),
}

impl Transport {
    /// Byte-contiguous datatype for an element of `el_size` bytes.
    pub fn contiguous(el_size: usize) -> Self {
        Transport::Contiguous(el_size)
    }

    /// Whether this is a constructed (non-standard) datatype.
    ///
    /// The standard datatypes are shared global handles; a `Contiguous`
    /// datatype is built per element type and owned by the algebraic
    /// structure that reports it.
    pub fn is_custom(&self) -> bool {
        matches!(self, Transport::Contiguous(_))
    }

    /// Size in bytes of one element of this datatype.
    pub fn size(&self) -> usize {
        match self {
            Transport::Bool | Transport::Char => 1,
            Transport::Int32 | Transport::Uint32 | Transport::Float => 4,
            Transport::Int64 | Transport::Uint64 | Transport::Double | Transport::ComplexFloat => 8,
            Transport::ComplexDouble => 16,
            Transport::Contiguous(n) => *n,
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transport::Bool => write!(f, "BOOL"),
            Transport::Char => write!(f, "CHAR"),
            Transport::Int32 => write!(f, "INT32"),
            Transport::Uint32 => write!(f, "UINT32"),
            Transport::Int64 => write!(f, "INT64"),
            Transport::Uint64 => write!(f, "UINT64"),
            Transport::Float => write!(f, "FLOAT"),
            Transport::Double => write!(f, "DOUBLE"),
            Transport::ComplexFloat => write!(f, "COMPLEX_FLOAT"),
            Transport::ComplexDouble => write!(f, "COMPLEX_DOUBLE"),
            Transport::Contiguous(n) => write!(f, "CONTIGUOUS[{}]", n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_types_are_not_custom() {
        assert!(!Transport::Double.is_custom());
        assert!(!Transport::Int64.is_custom());
        assert!(!Transport::ComplexDouble.is_custom());
        assert!(Transport::contiguous(24).is_custom());
    }

    #[test]
    fn sizes_match_the_element() {
        assert_eq!(Transport::Bool.size(), 1);
        assert_eq!(Transport::Float.size(), 4);
        assert_eq!(Transport::Double.size(), 8);
        assert_eq!(Transport::ComplexDouble.size(), 16);
        assert_eq!(Transport::contiguous(24).size(), 24);
    }
}
