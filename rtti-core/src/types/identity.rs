use core::fmt;

/// Stable numeric identity of a type or member, derived from its name.
///
/// Deterministic across builds and processes, unlike `core::any::TypeId`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct StableId(pub u64);

impl StableId {
    /// Identity of the void descriptor.
    pub const VOID: StableId = StableId(0);

    /// The raw hash.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for StableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

impl fmt::Debug for StableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StableId({self})")
    }
}

const FNV_OFFSET_BASIS: u64 = 0xCBF2_9CE4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01B3;
const MIX: u64 = 0x27D4_EB2D;

/// Hashes a name into a [`StableId`].
///
/// FNV-1 with an extra rotate/xor/multiply round per byte, which spreads
/// short names sharing a prefix much better than plain FNV-1.
pub const fn hash_name(name: &str) -> StableId {
    let bytes = name.as_bytes();
    let mut hash = FNV_OFFSET_BASIS;
    let mut i = 0;
    while i < bytes.len() {
        hash ^= bytes[i] as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
        hash = hash.rotate_left(5);
        hash ^= MIX;
        hash = hash.wrapping_mul(FNV_PRIME);
        i += 1;
    }
    StableId(hash)
}

/// Plain 64-bit FNV-1.
pub const fn fnv1(name: &str) -> StableId {
    let bytes = name.as_bytes();
    let mut hash = FNV_OFFSET_BASIS;
    let mut i = 0;
    while i < bytes.len() {
        hash = hash.wrapping_mul(FNV_PRIME);
        hash ^= bytes[i] as u64;
        i += 1;
    }
    StableId(hash)
}
