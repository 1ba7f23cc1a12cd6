//! Strongly typed reference handles.
//!
//! Every definition namespace gets its own newtype over an unsigned integer
//! of the width the trace format prescribes (8, 32 or 64 bits). A `RegionRef`
//! cannot be passed where a `StringRef` is expected, yet both convert to and
//! from their raw integer for the boundary code.
//!
//! The all-ones value of each width (`2^width - 1`) is reserved: it means
//! "no such reference" or "no parent" and is never allocated.

use std::fmt;
use std::hash::Hash;

/// Unsigned integer usable as the raw representation of a reference.
pub trait RawRef:
    Copy + Eq + Ord + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static
{
    /// Reserved "undefined" value (`2^width - 1`).
    const UNDEFINED: Self;
    /// First reference handed out by an empty generator.
    const ZERO: Self;

    /// `self + 1`, or `None` on overflow.
    fn checked_succ(self) -> Option<Self>;

    /// Widen to `u64`.
    fn to_u64(self) -> u64;

    /// Narrow from `u64`, truncating high bits.
    fn from_u64_truncating(value: u64) -> Self;
}

macro_rules! impl_raw_ref {
    ($($t:ty),+ $(,)?) => {$(
        impl RawRef for $t {
            const UNDEFINED: Self = <$t>::MAX;
            const ZERO: Self = 0;

            #[inline]
            fn checked_succ(self) -> Option<Self> {
                self.checked_add(1)
            }

            #[inline]
            fn to_u64(self) -> u64 {
                u64::from(self)
            }

            #[inline]
            #[allow(clippy::cast_possible_truncation)]
            fn from_u64_truncating(value: u64) -> Self {
                value as $t
            }
        }
    )+};
}

impl_raw_ref!(u8, u16, u32, u64);

/// A typed reference scoped to one definition namespace.
pub trait Reference:
    Copy + Eq + Ord + Hash + fmt::Debug + fmt::Display + Default + Send + Sync + 'static
{
    /// Underlying integer type.
    type Raw: RawRef;

    /// Namespace name used in logs and errors.
    const NAMESPACE: &'static str;

    /// The reserved "undefined" reference of this namespace.
    const UNDEFINED: Self;

    /// Wrap a raw integer (no validation).
    fn from_raw(raw: Self::Raw) -> Self;

    /// Raw integer value.
    fn raw(self) -> Self::Raw;

    /// Whether this is the reserved sentinel.
    #[inline]
    fn is_undefined(self) -> bool {
        self.raw() == Self::Raw::UNDEFINED
    }

    /// Wrap a `u64`, truncating to the namespace width.
    #[inline]
    fn from_u64_truncating(value: u64) -> Self {
        Self::from_raw(Self::Raw::from_u64_truncating(value))
    }

    /// Raw value widened to `u64`.
    #[inline]
    fn to_u64(self) -> u64 {
        self.raw().to_u64()
    }
}

macro_rules! define_reference {
    ($(#[$meta:meta])* $name:ident, $raw:ty, $ns:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(transparent)]
        pub struct $name($raw);

        impl $name {
            /// Reserved "undefined" reference.
            pub const UNDEFINED: Self = Self(<$raw>::MAX);

            /// Wrap a raw integer (no validation).
            #[inline]
            #[must_use]
            pub const fn new(raw: $raw) -> Self {
                Self(raw)
            }

            /// Raw integer value.
            #[inline]
            #[must_use]
            pub const fn get(self) -> $raw {
                self.0
            }

            /// Whether this is the reserved sentinel.
            #[inline]
            #[must_use]
            pub const fn is_undefined(self) -> bool {
                self.0 == <$raw>::MAX
            }
        }

        impl Reference for $name {
            type Raw = $raw;
            const NAMESPACE: &'static str = $ns;
            const UNDEFINED: Self = Self(<$raw>::MAX);

            #[inline]
            fn from_raw(raw: $raw) -> Self {
                Self(raw)
            }

            #[inline]
            fn raw(self) -> $raw {
                self.0
            }
        }

        impl Default for $name {
            #[inline]
            fn default() -> Self {
                Self::UNDEFINED
            }
        }

        impl From<$raw> for $name {
            #[inline]
            fn from(raw: $raw) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for $raw {
            #[inline]
            fn from(r: $name) -> $raw {
                r.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_undefined() {
                    write!(f, "{}(undefined)", stringify!($name))
                } else {
                    write!(f, "{}({})", stringify!($name), self.0)
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_undefined() {
                    f.pad("undefined")
                } else {
                    fmt::Display::fmt(&self.0, f)
                }
            }
        }
    };
}

define_reference!(
    /// Reference to a string definition.
    StringRef, u32, "string"
);
define_reference!(
    /// Reference to an attribute definition.
    AttributeRef, u32, "attribute"
);
define_reference!(
    /// Reference to a system tree node.
    SystemTreeNodeRef, u32, "system_tree_node"
);
define_reference!(
    /// Reference to a location group (usually a process).
    LocationGroupRef, u32, "location_group"
);
define_reference!(
    /// Reference to a location (one event timeline, e.g. a thread).
    LocationRef, u64, "location"
);
define_reference!(
    /// Reference to a code region.
    RegionRef, u32, "region"
);
define_reference!(
    /// Reference to a group (locations, regions, metrics, communicator groups).
    GroupRef, u32, "group"
);
define_reference!(
    /// Reference to a communicator.
    CommRef, u32, "comm"
);
define_reference!(
    /// Reference to a parameter.
    ParameterRef, u32, "parameter"
);
define_reference!(
    /// Reference to a source code location.
    SourceCodeLocationRef, u32, "source_code_location"
);
define_reference!(
    /// Reference to a calling context node.
    CallingContextRef, u32, "calling_context"
);
define_reference!(
    /// Reference to an interrupt generator.
    InterruptGeneratorRef, u32, "interrupt_generator"
);
define_reference!(
    /// Reference to a metric member.
    MetricMemberRef, u32, "metric_member"
);
define_reference!(
    /// Reference shared by metric classes and metric instances.
    MetricRef, u32, "metric"
);
define_reference!(
    /// Reference to an I/O paradigm (8-bit namespace).
    IoParadigmRef, u8, "io_paradigm"
);
define_reference!(
    /// Reference shared by I/O regular files and I/O directories.
    IoFileRef, u32, "io_file"
);
define_reference!(
    /// Reference to an I/O handle.
    IoHandleRef, u32, "io_handle"
);
define_reference!(
    /// Reference to a marker definition.
    MarkerRef, u32, "marker"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_is_all_ones_per_width() {
        assert_eq!(StringRef::UNDEFINED.get(), u32::MAX);
        assert_eq!(LocationRef::UNDEFINED.get(), u64::MAX);
        assert_eq!(IoParadigmRef::UNDEFINED.get(), u8::MAX);
        assert!(StringRef::new(u32::MAX).is_undefined());
        assert!(!StringRef::new(0).is_undefined());
    }

    #[test]
    fn converts_to_and_from_raw() {
        let r = RegionRef::from(7u32);
        let raw: u32 = r.into();
        assert_eq!(raw, 7);
        assert_eq!(Reference::raw(r), 7);
        assert_eq!(RegionRef::default(), RegionRef::UNDEFINED);
    }

    #[test]
    fn truncates_to_width() {
        let r = IoParadigmRef::from_u64_truncating(0x1_02);
        assert_eq!(r.get(), 2);
        let r = LocationRef::from_u64_truncating(u64::MAX);
        assert!(r.is_undefined());
    }

    #[test]
    fn display_and_debug() {
        assert_eq!(StringRef::new(42).to_string(), "42");
        assert_eq!(StringRef::UNDEFINED.to_string(), "undefined");
        assert_eq!(format!("{:?}", CommRef::new(3)), "CommRef(3)");
        assert_eq!(format!("{:?}", CommRef::UNDEFINED), "CommRef(undefined)");
    }
}
