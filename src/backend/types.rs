/// A physical type a backend can store without routing through the value codec stack.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum NativeType {
    /// A signed 64-bit integer.
    Int,
    /// A UTF-8 string.
    Str,
    /// An opaque byte string.
    Bytes,
}

impl NativeType {
    /// The stable id persisted in the `keyTypes` auxiliary table (memory-mapped backend) and
    /// otherwise used for diagnostics.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Str => "str",
            Self::Bytes => "bytes",
        }
    }

    /// Parses a persisted id back into a `NativeType`.
    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "int" => Some(Self::Int),
            "str" => Some(Self::Str),
            "bytes" => Some(Self::Bytes),
            _ => None,
        }
    }
}

impl std::fmt::Display for NativeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// Page-level size accounting, as reported by a backend's maintenance stat query.
///
/// `total` and `wasted` are in backend-native pages; `None` means the backend could not compute
/// the figure (see the memory-mapped backend's broken size query).
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct DataSize {
    pub total: Option<u64>,
    pub wasted: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_roundtrips() {
        for native in [NativeType::Int, NativeType::Str, NativeType::Bytes] {
            assert_eq!(NativeType::from_id(native.id()), Some(native));
        }
    }

    #[test]
    fn unknown_id_is_none() {
        assert_eq!(NativeType::from_id("not-a-type"), None);
    }
}
