//! Raw definition and event records.
//!
//! Raw records are what crosses the archive boundary: every cross-reference
//! is a bare integer in its namespace's width, every enum a bare code, every
//! flag set a bare bit mask. Turning them into typed values is the job of
//! [`crate::convert`] and [`crate::event`].

use serde::{Deserialize, Serialize};

/// A typed value in raw form: a [`Type`](otf2r_core::Type) code and a
/// 64-bit payload (integers sign/zero-extended, floats by bit pattern,
/// strings as a string reference).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawValue {
    /// `Type` code.
    pub value_type: u8,
    /// Payload.
    pub bits: u64,
}

/// One global definition record.
#[allow(missing_docs)]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GlobalDefRecord {
    ClockProperties { timer_resolution: u64, global_offset: u64, trace_length: u64 },
    String { id: u32, text: String },
    Attribute { id: u32, name: u32, description: u32, value_type: u8 },
    SystemTreeNode { id: u32, name: u32, class_name: u32, parent: u32 },
    SystemTreeNodeProperty { owner: u32, name: u32, value: RawValue },
    LocationGroup { id: u32, name: u32, group_type: u8, system_tree_parent: u32 },
    LocationGroupProperty { owner: u32, name: u32, value: RawValue },
    Location { id: u64, name: u32, location_type: u8, number_of_events: u64, location_group: u32 },
    LocationProperty { owner: u64, name: u32, value: RawValue },
    Region {
        id: u32,
        name: u32,
        canonical_name: u32,
        description: u32,
        role: u8,
        paradigm: u8,
        flags: u32,
        source_file: u32,
        begin_line_number: u32,
        end_line_number: u32,
    },
    Group { id: u32, name: u32, group_type: u8, paradigm: u8, flags: u32, members: Vec<u64> },
    Comm { id: u32, name: u32, group: u32, parent: u32 },
    IoParadigm { id: u8, identification: u32, name: u32, io_class: u8, flags: u32 },
    IoRegularFile { id: u32, name: u32, scope: u32 },
    IoDirectory { id: u32, name: u32, scope: u32 },
    IoHandle { id: u32, name: u32, file: u32, io_paradigm: u8, flags: u32, comm: u32, parent: u32 },
    Parameter { id: u32, name: u32, parameter_type: u8 },
    SourceCodeLocation { id: u32, file: u32, line_number: u32 },
    CallingContext { id: u32, region: u32, source_code_location: u32, parent: u32 },
    CallingContextProperty { owner: u32, name: u32, value: RawValue },
    InterruptGenerator { id: u32, name: u32, mode: u8, base: u8, exponent: i64, period: u64 },
    MetricMember {
        id: u32,
        name: u32,
        description: u32,
        metric_type: u8,
        mode: u8,
        value_type: u8,
        base: u8,
        exponent: i64,
        unit: u32,
    },
    MetricClass { id: u32, members: Vec<u32>, occurrence: u8, recorder_kind: u8 },
    MetricInstance { id: u32, metric_class: u32, recorder: u64, scope_type: u8, scope: u64 },
    Marker { id: u32, group: String, category: String, severity: u8 },
}

impl GlobalDefRecord {
    /// Record kind as it appears in the `kind` tag.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ClockProperties { .. } => "clock_properties",
            Self::String { .. } => "string",
            Self::Attribute { .. } => "attribute",
            Self::SystemTreeNode { .. } => "system_tree_node",
            Self::SystemTreeNodeProperty { .. } => "system_tree_node_property",
            Self::LocationGroup { .. } => "location_group",
            Self::LocationGroupProperty { .. } => "location_group_property",
            Self::Location { .. } => "location",
            Self::LocationProperty { .. } => "location_property",
            Self::Region { .. } => "region",
            Self::Group { .. } => "group",
            Self::Comm { .. } => "comm",
            Self::IoParadigm { .. } => "io_paradigm",
            Self::IoRegularFile { .. } => "io_regular_file",
            Self::IoDirectory { .. } => "io_directory",
            Self::IoHandle { .. } => "io_handle",
            Self::Parameter { .. } => "parameter",
            Self::SourceCodeLocation { .. } => "source_code_location",
            Self::CallingContext { .. } => "calling_context",
            Self::CallingContextProperty { .. } => "calling_context_property",
            Self::InterruptGenerator { .. } => "interrupt_generator",
            Self::MetricMember { .. } => "metric_member",
            Self::MetricClass { .. } => "metric_class",
            Self::MetricInstance { .. } => "metric_instance",
            Self::Marker { .. } => "marker",
        }
    }
}

/// One event record of a location stream. References are local to the
/// stream until remapped (see [`crate::mapping`]).
#[allow(missing_docs)]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventRecord {
    Enter { time: u64, region: u32 },
    Leave { time: u64, region: u32 },
    Metric { time: u64, metric: u32, values: Vec<RawValue> },
    MpiSend { time: u64, receiver: u32, communicator: u32, msg_tag: u32, msg_length: u64 },
    MpiRecv { time: u64, sender: u32, communicator: u32, msg_tag: u32, msg_length: u64 },
    ParameterInt { time: u64, parameter: u32, value: i64 },
    ParameterString { time: u64, parameter: u32, value: u32 },
}

impl EventRecord {
    /// Timestamp in ticks.
    #[must_use]
    pub const fn time(&self) -> u64 {
        match self {
            Self::Enter { time, .. }
            | Self::Leave { time, .. }
            | Self::Metric { time, .. }
            | Self::MpiSend { time, .. }
            | Self::MpiRecv { time, .. }
            | Self::ParameterInt { time, .. }
            | Self::ParameterString { time, .. } => *time,
        }
    }
}
