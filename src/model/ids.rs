use std::fmt;

/// Declares a `u32`-backed identifier newtype.
///
/// Each id kind is its own type, so a `VDiskId` can never be handed to an API
/// expecting a `PDiskId`. Conversions to and from the raw integer are explicit.
macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub(crate) struct $name(u32);

        impl $name {
            pub(crate) const fn from_raw(raw: u32) -> Self {
                Self(raw)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Identifier of a physical disk.
    PDiskId
);
entity_id!(
    /// Identifier of a virtual disk.
    VDiskId
);
entity_id!(
    /// Identifier of a redundancy group.
    GroupId
);

/// Ids whose entities live in a `Vec` arena at position `index()`.
macro_rules! arena_index {
    ($($name:ident),+) => {
        $(
            impl $name {
                pub(crate) const fn index(self) -> usize {
                    self.0 as usize
                }
            }
        )+
    };
}

arena_index!(PDiskId, VDiskId);

/// Number of datacenters in the fabric. Structural, not configurable.
pub(crate) const DC_COUNT: usize = 3;

/// Datacenter index, always in `0..DC_COUNT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct DcId(u8);

impl DcId {
    pub(crate) const ALL: [Self; DC_COUNT] = [Self(0), Self(1), Self(2)];

    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for DcId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dc{}", self.0)
    }
}
