//! Format enums, flag sets and typed attribute/metric values.
//!
//! Codes follow the OTF2 numbering. Decoding an unknown code or unknown flag
//! bits is a hard failure ([`RegistryError::UnexpectedEnumValue`]): corrupt
//! input has no safe fallback.

use crate::definition::Def;
use crate::defs::StringDef;
use crate::error::{RegistryError, Result};

macro_rules! format_enum {
    (
        $(#[$meta:meta])*
        $name:ident: $repr:ty {
            $($(#[$vmeta:meta])* $variant:ident = $code:expr),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
        #[repr($repr)]
        pub enum $name {
            $($(#[$vmeta])* $variant = $code,)+
        }

        impl $name {
            /// Every variant, in code order.
            pub const ALL: &'static [Self] = &[$(Self::$variant,)+];

            /// Raw code.
            #[inline]
            #[must_use]
            pub const fn code(self) -> $repr {
                self as $repr
            }
        }

        impl TryFrom<$repr> for $name {
            type Error = RegistryError;

            fn try_from(code: $repr) -> Result<Self> {
                match code {
                    $(c if c == $code => Ok(Self::$variant),)+
                    other => Err(RegistryError::UnexpectedEnumValue {
                        kind: stringify!($name),
                        value: u64::from(other),
                    }),
                }
            }
        }

        impl From<$name> for $repr {
            #[inline]
            fn from(v: $name) -> $repr {
                v as $repr
            }
        }
    };
}

format_enum! {
    /// Role of a region within the program.
    RegionRole: u8 {
        #[default]
        /// Unknown role.
        Unknown = 0,
        /// A function.
        Function = 1,
        /// A wrapper (e.g. an MPI interposition function).
        Wrapper = 2,
        /// A loop.
        Loop = 3,
        /// An arbitrary code block.
        Code = 4,
        /// Parallel region.
        Parallel = 5,
        /// Sections construct.
        Sections = 6,
        /// One section.
        Section = 7,
        /// Workshare construct.
        Workshare = 8,
        /// Single construct.
        Single = 9,
        /// Structured block of a single construct.
        SingleSblock = 10,
        /// Master construct.
        Master = 11,
        /// Critical construct.
        Critical = 12,
        /// Structured block of a critical construct.
        CriticalSblock = 13,
        /// Atomic operation.
        Atomic = 14,
        /// Explicit barrier.
        Barrier = 15,
        /// Implicit barrier.
        ImplicitBarrier = 16,
        /// Flush.
        Flush = 17,
        /// Ordered construct.
        Ordered = 18,
        /// Structured block of an ordered construct.
        OrderedSblock = 19,
        /// Task.
        Task = 20,
        /// Task creation.
        TaskCreate = 21,
        /// Task wait.
        TaskWait = 22,
        /// One-to-all collective.
        CollOne2All = 23,
        /// All-to-one collective.
        CollAll2One = 24,
        /// All-to-all collective.
        CollAll2All = 25,
        /// Other collective.
        CollOther = 26,
        /// File I/O.
        FileIo = 27,
        /// Point-to-point communication.
        Point2Point = 28,
        /// Remote memory access.
        Rma = 29,
        /// Data transfer.
        DataTransfer = 30,
        /// Artificial region inserted by the measurement system.
        Artificial = 31,
        /// Thread creation.
        ThreadCreate = 32,
        /// Thread wait.
        ThreadWait = 33,
        /// Untied task.
        TaskUntied = 34,
        /// Memory allocation.
        Allocate = 35,
        /// Memory deallocation.
        Deallocate = 36,
        /// Memory reallocation.
        Reallocate = 37,
        /// File I/O metadata operation.
        FileIoMetadata = 38,
    }
}

format_enum! {
    /// Programming paradigm a definition belongs to.
    Paradigm: u8 {
        #[default]
        /// Unknown paradigm.
        Unknown = 0,
        /// User instrumentation.
        User = 1,
        /// Compiler instrumentation.
        Compiler = 2,
        /// OpenMP.
        OpenMp = 3,
        /// MPI.
        Mpi = 4,
        /// CUDA.
        Cuda = 5,
        /// The measurement system itself.
        MeasurementSystem = 6,
        /// POSIX threads.
        Pthread = 7,
        /// HMPP.
        Hmpp = 8,
        /// OmpSs.
        Ompss = 9,
        /// Hardware counters.
        Hardware = 10,
        /// GASPI.
        Gaspi = 11,
        /// UPC.
        Upc = 12,
        /// SHMEM.
        Shmem = 13,
        /// Windows threads.
        WinThread = 14,
        /// Qt threads.
        QtThread = 15,
        /// ACE threads.
        AceThread = 16,
        /// TBB threads.
        TbbThread = 17,
        /// OpenACC.
        OpenAcc = 18,
        /// OpenCL.
        OpenCl = 19,
        /// MTAPI.
        Mtapi = 20,
        /// Sampling.
        Sampling = 21,
        /// No paradigm.
        None = 22,
        /// HIP.
        Hip = 23,
        /// Kokkos.
        Kokkos = 24,
    }
}

format_enum! {
    /// Kind of location group.
    LocationGroupType: u8 {
        #[default]
        /// Unknown.
        Unknown = 0,
        /// An operating-system process.
        Process = 1,
        /// An accelerator context.
        Accelerator = 2,
    }
}

format_enum! {
    /// Kind of location.
    LocationType: u8 {
        #[default]
        /// Unknown.
        Unknown = 0,
        /// A CPU thread.
        CpuThread = 1,
        /// An accelerator stream.
        Gpu = 2,
        /// A metric-only location.
        Metric = 3,
    }
}

format_enum! {
    /// Kind of group.
    GroupType: u8 {
        #[default]
        /// Unknown.
        Unknown = 0,
        /// Group of locations.
        Locations = 1,
        /// Group of regions.
        Regions = 2,
        /// Group of metrics.
        Metric = 3,
        /// Locations taking part in a communication paradigm.
        CommLocations = 4,
        /// Communicator group (ranks into the comm-locations group).
        CommGroup = 5,
        /// The "self" communicator group.
        CommSelf = 6,
    }
}

format_enum! {
    /// Type of a parameter.
    ParameterType: u8 {
        #[default]
        /// String parameter.
        String = 0,
        /// Signed 64-bit parameter.
        Int64 = 1,
        /// Unsigned 64-bit parameter.
        UInt64 = 2,
    }
}

format_enum! {
    /// Value type of attributes, properties and metric members.
    Type: u8 {
        #[default]
        /// No type.
        None = 0,
        /// `u8`.
        UInt8 = 1,
        /// `u16`.
        UInt16 = 2,
        /// `u32`.
        UInt32 = 3,
        /// `u64`.
        UInt64 = 4,
        /// `i8`.
        Int8 = 5,
        /// `i16`.
        Int16 = 6,
        /// `i32`.
        Int32 = 7,
        /// `i64`.
        Int64 = 8,
        /// `f32`.
        Float = 9,
        /// `f64`.
        Double = 10,
        /// Reference to a string definition.
        String = 11,
    }
}

format_enum! {
    /// How an interrupt generator triggers.
    InterruptGeneratorMode: u8 {
        #[default]
        /// Time-based.
        Time = 0,
        /// Count-based.
        Count = 1,
    }
}

format_enum! {
    /// Number base of an exponent.
    Base: u8 {
        #[default]
        /// Base 2.
        Binary = 0,
        /// Base 10.
        Decimal = 1,
    }
}

format_enum! {
    /// Source of a metric member.
    MetricType: u8 {
        #[default]
        /// Other.
        Other = 0,
        /// PAPI counter.
        Papi = 1,
        /// `getrusage` counter.
        Rusage = 2,
        /// User-defined.
        User = 3,
    }
}

format_enum! {
    /// Value semantics and timing of a metric member.
    MetricMode: u8 {
        #[default]
        /// Accumulated since the start of the measurement.
        AccumulatedStart = 0,
        /// Accumulated, valid at the point.
        AccumulatedPoint = 1,
        /// Accumulated since the last sample.
        AccumulatedLast = 2,
        /// Accumulated until the next sample.
        AccumulatedNext = 3,
        /// Absolute value at the point.
        AbsolutePoint = 4,
        /// Absolute value since the last sample.
        AbsoluteLast = 5,
        /// Absolute value until the next sample.
        AbsoluteNext = 6,
        /// Relative value at the point.
        RelativePoint = 7,
        /// Relative value since the last sample.
        RelativeLast = 8,
        /// Relative value until the next sample.
        RelativeNext = 9,
    }
}

format_enum! {
    /// When metric samples of a class are recorded.
    MetricOccurrence: u8 {
        #[default]
        /// Strictly at enter/leave.
        Strict = 0,
        /// Synchronously with events.
        Synchronous = 1,
        /// Asynchronously.
        Asynchronous = 2,
    }
}

format_enum! {
    /// What kind of recorder produces a metric class.
    RecorderKind: u8 {
        #[default]
        /// Unknown.
        Unknown = 0,
        /// Abstract recorder.
        Abstract = 1,
        /// CPU recorder.
        Cpu = 2,
        /// GPU recorder.
        Gpu = 3,
    }
}

format_enum! {
    /// Discriminant of a metric instance's scope.
    MetricScopeType: u8 {
        #[default]
        /// Scope is a location.
        Location = 0,
        /// Scope is a location group.
        LocationGroup = 1,
        /// Scope is a system tree node.
        SystemTreeNode = 2,
        /// Scope is a group.
        Group = 3,
    }
}

format_enum! {
    /// Serial or parallel I/O paradigm.
    IoParadigmClass: u8 {
        #[default]
        /// Serial I/O.
        Serial = 0,
        /// Parallel I/O.
        Parallel = 1,
    }
}

format_enum! {
    /// Severity of a marker.
    MarkerSeverity: u8 {
        #[default]
        /// No severity.
        None = 0,
        /// Low.
        Low = 1,
        /// Medium.
        Medium = 2,
        /// High.
        High = 3,
    }
}

bitflags::bitflags! {
    /// Region flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct RegionFlags: u32 {
        /// Region is dynamic (e.g. a loop iteration).
        const DYNAMIC = 1 << 0;
        /// Region marks a phase.
        const PHASE = 1 << 1;
    }
}

bitflags::bitflags! {
    /// Group flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct GroupFlags: u32 {
        /// Members are global location references.
        const GLOBAL_MEMBERS = 1 << 0;
    }
}

bitflags::bitflags! {
    /// I/O paradigm flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct IoParadigmFlags: u32 {
        /// Paradigm is provided by the operating system.
        const OS = 1 << 0;
    }
}

bitflags::bitflags! {
    /// I/O handle flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct IoHandleFlags: u32 {
        /// Handle existed before the measurement started.
        const PRE_CREATED = 1 << 0;
        /// Handle is shared by all locations.
        const ALL_PROXY = 1 << 1;
    }
}

/// Decode a flag set, rejecting unknown bits.
pub fn flags_from_bits<F: bitflags::Flags<Bits = u32>>(kind: &'static str, bits: u32) -> Result<F> {
    F::from_bits(bits).ok_or(RegistryError::UnexpectedEnumValue { kind, value: u64::from(bits) })
}

/// Typed value of an attribute or property.
#[derive(Clone, Debug, PartialEq)]
pub enum AttributeValue {
    /// `u8`.
    UInt8(u8),
    /// `u16`.
    UInt16(u16),
    /// `u32`.
    UInt32(u32),
    /// `u64`.
    UInt64(u64),
    /// `i8`.
    Int8(i8),
    /// `i16`.
    Int16(i16),
    /// `i32`.
    Int32(i32),
    /// `i64`.
    Int64(i64),
    /// `f32`.
    Float(f32),
    /// `f64`.
    Double(f64),
    /// A string definition.
    String(Def<StringDef>),
}

impl AttributeValue {
    /// The value's [`Type`].
    #[must_use]
    pub const fn value_type(&self) -> Type {
        match self {
            Self::UInt8(_) => Type::UInt8,
            Self::UInt16(_) => Type::UInt16,
            Self::UInt32(_) => Type::UInt32,
            Self::UInt64(_) => Type::UInt64,
            Self::Int8(_) => Type::Int8,
            Self::Int16(_) => Type::Int16,
            Self::Int32(_) => Type::Int32,
            Self::Int64(_) => Type::Int64,
            Self::Float(_) => Type::Float,
            Self::Double(_) => Type::Double,
            Self::String(_) => Type::String,
        }
    }
}

/// One sample of a metric member.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MetricValue {
    /// Signed sample.
    Int64(i64),
    /// Unsigned sample.
    UInt64(u64),
    /// Floating-point sample.
    Double(f64),
}

impl MetricValue {
    /// The value's [`Type`].
    #[must_use]
    pub const fn value_type(&self) -> Type {
        match self {
            Self::Int64(_) => Type::Int64,
            Self::UInt64(_) => Type::UInt64,
            Self::Double(_) => Type::Double,
        }
    }

    /// Encode as `(type, 64-bit payload)`; doubles are stored by bit pattern.
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub fn to_bits(self) -> (Type, u64) {
        match self {
            Self::Int64(v) => (Type::Int64, v as u64),
            Self::UInt64(v) => (Type::UInt64, v),
            Self::Double(v) => (Type::Double, v.to_bits()),
        }
    }

    /// Decode a `(type, payload)` pair produced by [`to_bits`](Self::to_bits).
    #[allow(clippy::cast_possible_wrap)]
    pub fn from_bits(value_type: Type, bits: u64) -> Result<Self> {
        match value_type {
            Type::Int64 => Ok(Self::Int64(bits as i64)),
            Type::UInt64 => Ok(Self::UInt64(bits)),
            Type::Double => Ok(Self::Double(f64::from_bits(bits))),
            other => Err(RegistryError::UnexpectedEnumValue {
                kind: "MetricValueType",
                value: u64::from(other.code()),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_roundtrip_through_try_from() {
        for &role in RegionRole::ALL {
            assert_eq!(RegionRole::try_from(role.code()).unwrap(), role);
        }
        assert_eq!(GroupType::try_from(5).unwrap(), GroupType::CommGroup);
    }

    #[test]
    fn unknown_codes_are_rejected() {
        assert_eq!(
            GroupType::try_from(42),
            Err(RegistryError::UnexpectedEnumValue { kind: "GroupType", value: 42 })
        );
        assert!(MetricScopeType::try_from(4).is_err());
    }

    #[test]
    fn unknown_flag_bits_are_rejected() {
        let ok: RegionFlags = flags_from_bits("RegionFlags", 0b11).unwrap();
        assert_eq!(ok, RegionFlags::DYNAMIC | RegionFlags::PHASE);
        let bad = flags_from_bits::<RegionFlags>("RegionFlags", 0b100);
        assert!(matches!(bad, Err(RegistryError::UnexpectedEnumValue { value: 4, .. })));
    }

    #[test]
    fn metric_values_keep_their_bits() {
        let v = MetricValue::Double(-1.5);
        let (t, bits) = v.to_bits();
        assert_eq!(MetricValue::from_bits(t, bits).unwrap(), v);
        let v = MetricValue::Int64(-7);
        let (t, bits) = v.to_bits();
        assert_eq!(MetricValue::from_bits(t, bits).unwrap(), v);
        assert!(MetricValue::from_bits(Type::String, 0).is_err());
    }
}
