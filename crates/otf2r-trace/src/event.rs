//! Typed events: raw event records with their references resolved.

use otf2r_core::{
    Comm, CommRef, Def, Metric, MetricRef, MetricValue, Parameter, ParameterRef, Region,
    RegionRef, Registry, Result, StringDef, StringRef, Type,
};

use crate::record::{EventRecord, RawValue};

/// An event whose references point at live definitions.
#[allow(missing_docs)]
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    Enter { time: u64, region: Def<Region> },
    Leave { time: u64, region: Def<Region> },
    Metric { time: u64, metric: Metric, values: Vec<MetricValue> },
    MpiSend { time: u64, receiver: u32, comm: Def<Comm>, msg_tag: u32, msg_length: u64 },
    MpiRecv { time: u64, sender: u32, comm: Def<Comm>, msg_tag: u32, msg_length: u64 },
    ParameterInt { time: u64, parameter: Def<Parameter>, value: i64 },
    ParameterString { time: u64, parameter: Def<Parameter>, value: Def<StringDef> },
}

impl Event {
    /// Resolve a (globally numbered) raw record against `registry`.
    pub fn resolve(registry: &Registry, record: &EventRecord) -> Result<Self> {
        Ok(match record {
            EventRecord::Enter { time, region } => {
                Self::Enter { time: *time, region: registry.resolve::<Region>(RegionRef::new(*region))? }
            }
            EventRecord::Leave { time, region } => {
                Self::Leave { time: *time, region: registry.resolve::<Region>(RegionRef::new(*region))? }
            }
            EventRecord::Metric { time, metric, values } => Self::Metric {
                time: *time,
                metric: registry.resolve_metric(MetricRef::new(*metric))?,
                values: values
                    .iter()
                    .map(|v| MetricValue::from_bits(Type::try_from(v.value_type)?, v.bits))
                    .collect::<Result<_>>()?,
            },
            EventRecord::MpiSend { time, receiver, communicator, msg_tag, msg_length } => Self::MpiSend {
                time: *time,
                receiver: *receiver,
                comm: registry.resolve::<Comm>(CommRef::new(*communicator))?,
                msg_tag: *msg_tag,
                msg_length: *msg_length,
            },
            EventRecord::MpiRecv { time, sender, communicator, msg_tag, msg_length } => Self::MpiRecv {
                time: *time,
                sender: *sender,
                comm: registry.resolve::<Comm>(CommRef::new(*communicator))?,
                msg_tag: *msg_tag,
                msg_length: *msg_length,
            },
            EventRecord::ParameterInt { time, parameter, value } => Self::ParameterInt {
                time: *time,
                parameter: registry.resolve::<Parameter>(ParameterRef::new(*parameter))?,
                value: *value,
            },
            EventRecord::ParameterString { time, parameter, value } => Self::ParameterString {
                time: *time,
                parameter: registry.resolve::<Parameter>(ParameterRef::new(*parameter))?,
                value: registry.resolve::<StringDef>(StringRef::new(*value))?,
            },
        })
    }

    /// Raw form with global references.
    #[must_use]
    pub fn to_record(&self) -> EventRecord {
        match self {
            Self::Enter { time, region } => EventRecord::Enter { time: *time, region: region.reference().get() },
            Self::Leave { time, region } => EventRecord::Leave { time: *time, region: region.reference().get() },
            Self::Metric { time, metric, values } => EventRecord::Metric {
                time: *time,
                metric: metric.reference().get(),
                values: values
                    .iter()
                    .map(|v| {
                        let (ty, bits) = v.to_bits();
                        RawValue { value_type: ty.code(), bits }
                    })
                    .collect(),
            },
            Self::MpiSend { time, receiver, comm, msg_tag, msg_length } => EventRecord::MpiSend {
                time: *time,
                receiver: *receiver,
                communicator: comm.reference().get(),
                msg_tag: *msg_tag,
                msg_length: *msg_length,
            },
            Self::MpiRecv { time, sender, comm, msg_tag, msg_length } => EventRecord::MpiRecv {
                time: *time,
                sender: *sender,
                communicator: comm.reference().get(),
                msg_tag: *msg_tag,
                msg_length: *msg_length,
            },
            Self::ParameterInt { time, parameter, value } => EventRecord::ParameterInt {
                time: *time,
                parameter: parameter.reference().get(),
                value: *value,
            },
            Self::ParameterString { time, parameter, value } => EventRecord::ParameterString {
                time: *time,
                parameter: parameter.reference().get(),
                value: value.reference().get(),
            },
        }
    }

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

    /// Short name of the event kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Enter { .. } => "enter",
            Self::Leave { .. } => "leave",
            Self::Metric { .. } => "metric",
            Self::MpiSend { .. } => "mpi_send",
            Self::MpiRecv { .. } => "mpi_recv",
            Self::ParameterInt { .. } => "parameter_int",
            Self::ParameterString { .. } => "parameter_string",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use otf2r_core::{Paradigm, RegionRole, RegistryError, RegistryOptions};

    #[test]
    fn resolves_against_the_registry() {
        let mut reg = Registry::new();
        let name = reg.create(StringDef::new("compute")).unwrap();
        let region = reg.create(Region::new(name, RegionRole::Function, Paradigm::User)).unwrap();

        let rec = EventRecord::Enter { time: 10, region: region.reference().get() };
        let ev = Event::resolve(&reg, &rec).unwrap();
        match &ev {
            Event::Enter { region: r, .. } => assert!(r.ptr_eq(&region)),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(ev.to_record(), rec);
        assert_eq!(ev.kind(), "enter");
    }

    #[test]
    fn dangling_event_reference_under_strict_options() {
        let reg = Registry::with_options(RegistryOptions::strict());
        let err = Event::resolve(&reg, &EventRecord::Leave { time: 1, region: 3 }).unwrap_err();
        assert_eq!(err, RegistryError::UndefinedReference { kind: "region", raw: 3 });

        let lenient = Registry::new();
        let ev = Event::resolve(&lenient, &EventRecord::Leave { time: 1, region: 3 }).unwrap();
        assert!(matches!(ev, Event::Leave { region, .. } if !region.is_valid()));
    }
}
