//! Raw record ⇄ typed definition conversion.
//!
//! Decoding resolves every raw cross-reference through the registry (so the
//! registry's [`MissingPolicy`](otf2r_core::MissingPolicy) applies) and
//! validates every enum code and flag mask. Encoding is infallible: a typed
//! definition always has a raw form.

use otf2r_core::{
    flags_from_bits, Attribute, AttributeRef, AttributeValue, Base, CallingContext,
    CallingContextRef, ClockProperties, Comm, CommRef, Def, Group, GroupFlags, GroupRef,
    GroupType, InterruptGenerator, InterruptGeneratorMode, InterruptGeneratorRef, IoDirectory,
    IoFileRef, IoHandle, IoHandleFlags, IoHandleRef, IoParadigm, IoParadigmClass,
    IoParadigmFlags, IoParadigmRef, IoRegularFile, Kind, Location, LocationGroup,
    LocationGroupRef, LocationGroupType, LocationRef, LocationType, Marker, MarkerRef,
    MarkerSeverity, MetricClass, MetricInstance, MetricMember, MetricMemberRef, MetricMode,
    MetricOccurrence, MetricRef, MetricScope, MetricScopeType, MetricType, Paradigm, Parameter,
    ParameterRef, ParameterType, Property, RecorderKind, Region, RegionFlags, RegionRef,
    RegionRole, Registry, RegistryError, Result, SourceCodeLocation, SourceCodeLocationRef,
    StringDef, StringRef, SystemTreeNode, SystemTreeNodeRef, Type,
};

use crate::record::{GlobalDefRecord, RawValue};

fn string(registry: &Registry, raw: u32) -> Result<Def<StringDef>> {
    registry.resolve::<StringDef>(StringRef::new(raw))
}

/// Decode a raw typed value. String payloads resolve through `registry`.
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub fn decode_value(registry: &Registry, raw: RawValue) -> Result<AttributeValue> {
    let bits = raw.bits;
    Ok(match Type::try_from(raw.value_type)? {
        Type::UInt8 => AttributeValue::UInt8(bits as u8),
        Type::UInt16 => AttributeValue::UInt16(bits as u16),
        Type::UInt32 => AttributeValue::UInt32(bits as u32),
        Type::UInt64 => AttributeValue::UInt64(bits),
        Type::Int8 => AttributeValue::Int8(bits as i64 as i8),
        Type::Int16 => AttributeValue::Int16(bits as i64 as i16),
        Type::Int32 => AttributeValue::Int32(bits as i64 as i32),
        Type::Int64 => AttributeValue::Int64(bits as i64),
        Type::Float => AttributeValue::Float(f32::from_bits(bits as u32)),
        Type::Double => AttributeValue::Double(f64::from_bits(bits)),
        Type::String => AttributeValue::String(registry.resolve_raw::<StringDef>(bits)?),
        Type::None => {
            return Err(RegistryError::UnexpectedEnumValue { kind: "AttributeValue", value: 0 })
        }
    })
}

/// Encode a typed value.
#[allow(clippy::cast_sign_loss)]
#[must_use]
pub fn encode_value(value: &AttributeValue) -> RawValue {
    let bits = match value {
        AttributeValue::UInt8(v) => u64::from(*v),
        AttributeValue::UInt16(v) => u64::from(*v),
        AttributeValue::UInt32(v) => u64::from(*v),
        AttributeValue::UInt64(v) => *v,
        AttributeValue::Int8(v) => i64::from(*v) as u64,
        AttributeValue::Int16(v) => i64::from(*v) as u64,
        AttributeValue::Int32(v) => i64::from(*v) as u64,
        AttributeValue::Int64(v) => *v as u64,
        AttributeValue::Float(v) => u64::from(v.to_bits()),
        AttributeValue::Double(v) => v.to_bits(),
        AttributeValue::String(d) => d.raw(),
    };
    RawValue { value_type: value.value_type().code(), bits }
}

/// Insert the definition described by `record` into `registry` under the
/// record's own reference.
pub fn insert_definition(registry: &mut Registry, record: &GlobalDefRecord) -> Result<()> {
    match record {
        GlobalDefRecord::ClockProperties { timer_resolution, global_offset, trace_length } => {
            registry.set_clock_properties(ClockProperties {
                timer_resolution: *timer_resolution,
                global_offset: *global_offset,
                trace_length: *trace_length,
            });
        }
        GlobalDefRecord::String { id, text } => {
            registry.create_with_ref(StringRef::new(*id), StringDef::new(text.as_str()))?;
        }
        GlobalDefRecord::Attribute { id, name, description, value_type } => {
            let data = Attribute {
                name: string(registry, *name)?,
                description: string(registry, *description)?,
                value_type: Type::try_from(*value_type)?,
            };
            registry.create_with_ref(AttributeRef::new(*id), data)?;
        }
        GlobalDefRecord::SystemTreeNode { id, name, class_name, parent } => {
            let data = SystemTreeNode::new(
                string(registry, *name)?,
                string(registry, *class_name)?,
                registry.resolve::<SystemTreeNode>(SystemTreeNodeRef::new(*parent))?,
            );
            registry.create_with_ref(SystemTreeNodeRef::new(*id), data)?;
        }
        GlobalDefRecord::SystemTreeNodeProperty { owner, name, value } => {
            let property = Property::new(
                registry.resolve::<SystemTreeNode>(SystemTreeNodeRef::new(*owner))?,
                string(registry, *name)?,
                decode_value(registry, *value)?,
            );
            registry.add_property(property)?;
        }
        GlobalDefRecord::LocationGroup { id, name, group_type, system_tree_parent } => {
            let data = LocationGroup {
                name: string(registry, *name)?,
                group_type: LocationGroupType::try_from(*group_type)?,
                system_tree_parent: registry
                    .resolve::<SystemTreeNode>(SystemTreeNodeRef::new(*system_tree_parent))?,
            };
            registry.create_with_ref(LocationGroupRef::new(*id), data)?;
        }
        GlobalDefRecord::LocationGroupProperty { owner, name, value } => {
            let property = Property::new(
                registry.resolve::<LocationGroup>(LocationGroupRef::new(*owner))?,
                string(registry, *name)?,
                decode_value(registry, *value)?,
            );
            registry.add_property(property)?;
        }
        GlobalDefRecord::Location { id, name, location_type, number_of_events, location_group } => {
            let data = Location {
                name: string(registry, *name)?,
                location_type: LocationType::try_from(*location_type)?,
                number_of_events: *number_of_events,
                location_group: registry
                    .resolve::<LocationGroup>(LocationGroupRef::new(*location_group))?,
            };
            registry.create_with_ref(LocationRef::new(*id), data)?;
        }
        GlobalDefRecord::LocationProperty { owner, name, value } => {
            let property = Property::new(
                registry.resolve::<Location>(LocationRef::new(*owner))?,
                string(registry, *name)?,
                decode_value(registry, *value)?,
            );
            registry.add_property(property)?;
        }
        GlobalDefRecord::Region {
            id,
            name,
            canonical_name,
            description,
            role,
            paradigm,
            flags,
            source_file,
            begin_line_number,
            end_line_number,
        } => {
            let data = Region {
                name: string(registry, *name)?,
                canonical_name: string(registry, *canonical_name)?,
                description: string(registry, *description)?,
                role: RegionRole::try_from(*role)?,
                paradigm: Paradigm::try_from(*paradigm)?,
                flags: flags_from_bits::<RegionFlags>("RegionFlags", *flags)?,
                source_file: string(registry, *source_file)?,
                begin_line_number: *begin_line_number,
                end_line_number: *end_line_number,
            };
            registry.create_with_ref(RegionRef::new(*id), data)?;
        }
        GlobalDefRecord::Group { id, name, group_type, paradigm, flags, members } => {
            let data = Group {
                name: string(registry, *name)?,
                group_type: GroupType::try_from(*group_type)?,
                paradigm: Paradigm::try_from(*paradigm)?,
                flags: flags_from_bits::<GroupFlags>("GroupFlags", *flags)?,
                members: members.clone(),
            };
            registry.create_with_ref(GroupRef::new(*id), data)?;
        }
        GlobalDefRecord::Comm { id, name, group, parent } => {
            let data = Comm {
                name: string(registry, *name)?,
                group: registry.resolve::<Group>(GroupRef::new(*group))?,
                parent: registry.resolve::<Comm>(CommRef::new(*parent))?,
            };
            registry.create_with_ref(CommRef::new(*id), data)?;
        }
        GlobalDefRecord::IoParadigm { id, identification, name, io_class, flags } => {
            let data = IoParadigm {
                identification: string(registry, *identification)?,
                name: string(registry, *name)?,
                io_class: IoParadigmClass::try_from(*io_class)?,
                flags: flags_from_bits::<IoParadigmFlags>("IoParadigmFlags", *flags)?,
            };
            registry.create_with_ref(IoParadigmRef::new(*id), data)?;
        }
        GlobalDefRecord::IoRegularFile { id, name, scope } => {
            let data = IoRegularFile {
                name: string(registry, *name)?,
                scope: registry.resolve::<SystemTreeNode>(SystemTreeNodeRef::new(*scope))?,
            };
            registry.create_with_ref(IoFileRef::new(*id), data)?;
        }
        GlobalDefRecord::IoDirectory { id, name, scope } => {
            let data = IoDirectory {
                name: string(registry, *name)?,
                scope: registry.resolve::<SystemTreeNode>(SystemTreeNodeRef::new(*scope))?,
            };
            registry.create_with_ref(IoFileRef::new(*id), data)?;
        }
        GlobalDefRecord::IoHandle { id, name, file, io_paradigm, flags, comm, parent } => {
            let data = IoHandle {
                name: string(registry, *name)?,
                file: registry.resolve_io_file(IoFileRef::new(*file))?,
                io_paradigm: registry.resolve::<IoParadigm>(IoParadigmRef::new(*io_paradigm))?,
                flags: flags_from_bits::<IoHandleFlags>("IoHandleFlags", *flags)?,
                comm: registry.resolve::<Comm>(CommRef::new(*comm))?,
                parent: registry.resolve::<IoHandle>(IoHandleRef::new(*parent))?,
            };
            registry.create_with_ref(IoHandleRef::new(*id), data)?;
        }
        GlobalDefRecord::Parameter { id, name, parameter_type } => {
            let data = Parameter {
                name: string(registry, *name)?,
                parameter_type: ParameterType::try_from(*parameter_type)?,
            };
            registry.create_with_ref(ParameterRef::new(*id), data)?;
        }
        GlobalDefRecord::SourceCodeLocation { id, file, line_number } => {
            let data = SourceCodeLocation { file: string(registry, *file)?, line_number: *line_number };
            registry.create_with_ref(SourceCodeLocationRef::new(*id), data)?;
        }
        GlobalDefRecord::CallingContext { id, region, source_code_location, parent } => {
            let data = CallingContext {
                region: registry.resolve::<Region>(RegionRef::new(*region))?,
                source_code_location: registry
                    .resolve::<SourceCodeLocation>(SourceCodeLocationRef::new(*source_code_location))?,
                parent: registry.resolve::<CallingContext>(CallingContextRef::new(*parent))?,
            };
            registry.create_with_ref(CallingContextRef::new(*id), data)?;
        }
        GlobalDefRecord::CallingContextProperty { owner, name, value } => {
            let property = Property::new(
                registry.resolve::<CallingContext>(CallingContextRef::new(*owner))?,
                string(registry, *name)?,
                decode_value(registry, *value)?,
            );
            registry.add_property(property)?;
        }
        GlobalDefRecord::InterruptGenerator { id, name, mode, base, exponent, period } => {
            let data = InterruptGenerator {
                name: string(registry, *name)?,
                mode: InterruptGeneratorMode::try_from(*mode)?,
                base: Base::try_from(*base)?,
                exponent: *exponent,
                period: *period,
            };
            registry.create_with_ref(InterruptGeneratorRef::new(*id), data)?;
        }
        GlobalDefRecord::MetricMember {
            id,
            name,
            description,
            metric_type,
            mode,
            value_type,
            base,
            exponent,
            unit,
        } => {
            let data = MetricMember {
                name: string(registry, *name)?,
                description: string(registry, *description)?,
                metric_type: MetricType::try_from(*metric_type)?,
                mode: MetricMode::try_from(*mode)?,
                value_type: Type::try_from(*value_type)?,
                base: Base::try_from(*base)?,
                exponent: *exponent,
                unit: string(registry, *unit)?,
            };
            registry.create_with_ref(MetricMemberRef::new(*id), data)?;
        }
        GlobalDefRecord::MetricClass { id, members, occurrence, recorder_kind } => {
            let members = members
                .iter()
                .map(|m| registry.resolve::<MetricMember>(MetricMemberRef::new(*m)))
                .collect::<Result<Vec<_>>>()?;
            let data = MetricClass {
                members,
                occurrence: MetricOccurrence::try_from(*occurrence)?,
                recorder_kind: RecorderKind::try_from(*recorder_kind)?,
            };
            registry.create_with_ref(MetricRef::new(*id), data)?;
        }
        GlobalDefRecord::MetricInstance { id, metric_class, recorder, scope_type, scope } => {
            let scope = match MetricScopeType::try_from(*scope_type)? {
                MetricScopeType::Location => MetricScope::Location(registry.resolve_raw::<Location>(*scope)?),
                MetricScopeType::LocationGroup => {
                    MetricScope::LocationGroup(registry.resolve_raw::<LocationGroup>(*scope)?)
                }
                MetricScopeType::SystemTreeNode => {
                    MetricScope::SystemTreeNode(registry.resolve_raw::<SystemTreeNode>(*scope)?)
                }
                MetricScopeType::Group => MetricScope::Group(registry.resolve_raw::<Group>(*scope)?),
            };
            let data = MetricInstance {
                metric_class: registry.resolve::<MetricClass>(MetricRef::new(*metric_class))?,
                recorder: registry.resolve::<Location>(LocationRef::new(*recorder))?,
                scope,
            };
            registry.create_with_ref(MetricRef::new(*id), data)?;
        }
        GlobalDefRecord::Marker { id, group, category, severity } => {
            let data = Marker {
                group: group.as_str().into(),
                category: category.as_str().into(),
                severity: MarkerSeverity::try_from(*severity)?,
            };
            registry.create_with_ref(MarkerRef::new(*id), data)?;
        }
    }
    Ok(())
}

/// Kinds with a raw record form.
pub trait DefinitionRecord: Kind {
    /// Raw record of `self` stored under `reference`.
    fn to_record(&self, reference: Self::Ref) -> GlobalDefRecord;
}

/// Raw record of a stored definition; `None` for the undefined value.
#[must_use]
pub fn definition_record<K: DefinitionRecord>(def: &Def<K>) -> Option<GlobalDefRecord> {
    def.data().map(|d| d.to_record(def.reference()))
}

impl DefinitionRecord for StringDef {
    fn to_record(&self, reference: StringRef) -> GlobalDefRecord {
        GlobalDefRecord::String { id: reference.get(), text: self.as_str().to_owned() }
    }
}

impl DefinitionRecord for Attribute {
    fn to_record(&self, reference: AttributeRef) -> GlobalDefRecord {
        GlobalDefRecord::Attribute {
            id: reference.get(),
            name: self.name.reference().get(),
            description: self.description.reference().get(),
            value_type: self.value_type.code(),
        }
    }
}

impl DefinitionRecord for SystemTreeNode {
    fn to_record(&self, reference: SystemTreeNodeRef) -> GlobalDefRecord {
        GlobalDefRecord::SystemTreeNode {
            id: reference.get(),
            name: self.name.reference().get(),
            class_name: self.class_name.reference().get(),
            parent: self.parent.reference().get(),
        }
    }
}

impl DefinitionRecord for LocationGroup {
    fn to_record(&self, reference: LocationGroupRef) -> GlobalDefRecord {
        GlobalDefRecord::LocationGroup {
            id: reference.get(),
            name: self.name.reference().get(),
            group_type: self.group_type.code(),
            system_tree_parent: self.system_tree_parent.reference().get(),
        }
    }
}

impl DefinitionRecord for Location {
    fn to_record(&self, reference: LocationRef) -> GlobalDefRecord {
        GlobalDefRecord::Location {
            id: reference.get(),
            name: self.name.reference().get(),
            location_type: self.location_type.code(),
            number_of_events: self.number_of_events,
            location_group: self.location_group.reference().get(),
        }
    }
}

impl DefinitionRecord for Region {
    fn to_record(&self, reference: RegionRef) -> GlobalDefRecord {
        GlobalDefRecord::Region {
            id: reference.get(),
            name: self.name.reference().get(),
            canonical_name: self.canonical_name.reference().get(),
            description: self.description.reference().get(),
            role: self.role.code(),
            paradigm: self.paradigm.code(),
            flags: self.flags.bits(),
            source_file: self.source_file.reference().get(),
            begin_line_number: self.begin_line_number,
            end_line_number: self.end_line_number,
        }
    }
}

impl DefinitionRecord for Group {
    fn to_record(&self, reference: GroupRef) -> GlobalDefRecord {
        GlobalDefRecord::Group {
            id: reference.get(),
            name: self.name.reference().get(),
            group_type: self.group_type.code(),
            paradigm: self.paradigm.code(),
            flags: self.flags.bits(),
            members: self.members.clone(),
        }
    }
}

impl DefinitionRecord for Comm {
    fn to_record(&self, reference: CommRef) -> GlobalDefRecord {
        GlobalDefRecord::Comm {
            id: reference.get(),
            name: self.name.reference().get(),
            group: self.group.reference().get(),
            parent: self.parent.reference().get(),
        }
    }
}

impl DefinitionRecord for IoParadigm {
    fn to_record(&self, reference: IoParadigmRef) -> GlobalDefRecord {
        GlobalDefRecord::IoParadigm {
            id: reference.get(),
            identification: self.identification.reference().get(),
            name: self.name.reference().get(),
            io_class: self.io_class.code(),
            flags: self.flags.bits(),
        }
    }
}

impl DefinitionRecord for IoRegularFile {
    fn to_record(&self, reference: IoFileRef) -> GlobalDefRecord {
        GlobalDefRecord::IoRegularFile {
            id: reference.get(),
            name: self.name.reference().get(),
            scope: self.scope.reference().get(),
        }
    }
}

impl DefinitionRecord for IoDirectory {
    fn to_record(&self, reference: IoFileRef) -> GlobalDefRecord {
        GlobalDefRecord::IoDirectory {
            id: reference.get(),
            name: self.name.reference().get(),
            scope: self.scope.reference().get(),
        }
    }
}

impl DefinitionRecord for IoHandle {
    fn to_record(&self, reference: IoHandleRef) -> GlobalDefRecord {
        GlobalDefRecord::IoHandle {
            id: reference.get(),
            name: self.name.reference().get(),
            file: self.file.reference().get(),
            io_paradigm: self.io_paradigm.reference().get(),
            flags: self.flags.bits(),
            comm: self.comm.reference().get(),
            parent: self.parent.reference().get(),
        }
    }
}

impl DefinitionRecord for Parameter {
    fn to_record(&self, reference: ParameterRef) -> GlobalDefRecord {
        GlobalDefRecord::Parameter {
            id: reference.get(),
            name: self.name.reference().get(),
            parameter_type: self.parameter_type.code(),
        }
    }
}

impl DefinitionRecord for SourceCodeLocation {
    fn to_record(&self, reference: SourceCodeLocationRef) -> GlobalDefRecord {
        GlobalDefRecord::SourceCodeLocation {
            id: reference.get(),
            file: self.file.reference().get(),
            line_number: self.line_number,
        }
    }
}

impl DefinitionRecord for CallingContext {
    fn to_record(&self, reference: CallingContextRef) -> GlobalDefRecord {
        GlobalDefRecord::CallingContext {
            id: reference.get(),
            region: self.region.reference().get(),
            source_code_location: self.source_code_location.reference().get(),
            parent: self.parent.reference().get(),
        }
    }
}

impl DefinitionRecord for InterruptGenerator {
    fn to_record(&self, reference: InterruptGeneratorRef) -> GlobalDefRecord {
        GlobalDefRecord::InterruptGenerator {
            id: reference.get(),
            name: self.name.reference().get(),
            mode: self.mode.code(),
            base: self.base.code(),
            exponent: self.exponent,
            period: self.period,
        }
    }
}

impl DefinitionRecord for MetricMember {
    fn to_record(&self, reference: MetricMemberRef) -> GlobalDefRecord {
        GlobalDefRecord::MetricMember {
            id: reference.get(),
            name: self.name.reference().get(),
            description: self.description.reference().get(),
            metric_type: self.metric_type.code(),
            mode: self.mode.code(),
            value_type: self.value_type.code(),
            base: self.base.code(),
            exponent: self.exponent,
            unit: self.unit.reference().get(),
        }
    }
}

impl DefinitionRecord for MetricClass {
    fn to_record(&self, reference: MetricRef) -> GlobalDefRecord {
        GlobalDefRecord::MetricClass {
            id: reference.get(),
            members: self.members.iter().map(|m| m.reference().get()).collect(),
            occurrence: self.occurrence.code(),
            recorder_kind: self.recorder_kind.code(),
        }
    }
}

impl DefinitionRecord for MetricInstance {
    fn to_record(&self, reference: MetricRef) -> GlobalDefRecord {
        GlobalDefRecord::MetricInstance {
            id: reference.get(),
            metric_class: self.metric_class.reference().get(),
            recorder: self.recorder.reference().get(),
            scope_type: self.scope.scope_type().code(),
            scope: self.scope.raw(),
        }
    }
}

impl DefinitionRecord for Marker {
    fn to_record(&self, reference: MarkerRef) -> GlobalDefRecord {
        GlobalDefRecord::Marker {
            id: reference.get(),
            group: self.group.to_string(),
            category: self.category.to_string(),
            severity: self.severity.code(),
        }
    }
}

/// Owner kinds whose properties have a raw record form.
pub trait PropertyRecord: Kind {
    /// Raw record of `property`.
    fn property_record(property: &Property<Self>) -> GlobalDefRecord;
}

impl PropertyRecord for SystemTreeNode {
    fn property_record(p: &Property<Self>) -> GlobalDefRecord {
        GlobalDefRecord::SystemTreeNodeProperty {
            owner: p.owner.reference().get(),
            name: p.name.reference().get(),
            value: encode_value(&p.value),
        }
    }
}

impl PropertyRecord for LocationGroup {
    fn property_record(p: &Property<Self>) -> GlobalDefRecord {
        GlobalDefRecord::LocationGroupProperty {
            owner: p.owner.reference().get(),
            name: p.name.reference().get(),
            value: encode_value(&p.value),
        }
    }
}

impl PropertyRecord for Location {
    fn property_record(p: &Property<Self>) -> GlobalDefRecord {
        GlobalDefRecord::LocationProperty {
            owner: p.owner.reference().get(),
            name: p.name.reference().get(),
            value: encode_value(&p.value),
        }
    }
}

impl PropertyRecord for CallingContext {
    fn property_record(p: &Property<Self>) -> GlobalDefRecord {
        GlobalDefRecord::CallingContextProperty {
            owner: p.owner.reference().get(),
            name: p.name.reference().get(),
            value: encode_value(&p.value),
        }
    }
}

/// Clock singleton as a raw record.
#[must_use]
pub const fn clock_record(clock: ClockProperties) -> GlobalDefRecord {
    GlobalDefRecord::ClockProperties {
        timer_resolution: clock.timer_resolution,
        global_offset: clock.global_offset,
        trace_length: clock.trace_length,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use otf2r_core::RegistryOptions;

    #[test]
    fn values_keep_sign_and_bits() {
        let reg = Registry::new();
        for v in [
            AttributeValue::Int8(-3),
            AttributeValue::Int32(i32::MIN),
            AttributeValue::UInt16(65_000),
            AttributeValue::Float(0.25),
            AttributeValue::Double(-2.5e10),
        ] {
            assert_eq!(decode_value(&reg, encode_value(&v)).unwrap(), v);
        }
        assert!(decode_value(&reg, RawValue { value_type: 0, bits: 0 }).is_err());
        assert!(decode_value(&reg, RawValue { value_type: 200, bits: 0 }).is_err());
    }

    #[test]
    fn decoded_definitions_hold_resolved_references() {
        let mut reg = Registry::new();
        for rec in [
            GlobalDefRecord::String { id: 0, text: "main".into() },
            GlobalDefRecord::Region {
                id: 4,
                name: 0,
                canonical_name: 0,
                description: u32::MAX,
                role: RegionRole::Function.code(),
                paradigm: Paradigm::User.code(),
                flags: 0,
                source_file: u32::MAX,
                begin_line_number: 10,
                end_line_number: 20,
            },
        ] {
            insert_definition(&mut reg, &rec).unwrap();
        }
        let region = reg.get::<Region>(RegionRef::new(4));
        let data = region.data().unwrap();
        assert_eq!(data.name.as_str(), Some("main"));
        assert!(!data.description.is_valid());
        assert_eq!(definition_record(&region).map(|r| r.kind()), Some("region"));
    }

    #[test]
    fn strict_decoding_rejects_dangling_and_bad_codes() {
        let mut reg = Registry::with_options(RegistryOptions::strict());
        let dangling = GlobalDefRecord::Parameter { id: 0, name: 9, parameter_type: 0 };
        assert!(matches!(
            insert_definition(&mut reg, &dangling),
            Err(RegistryError::UndefinedReference { kind: "string", raw: 9 })
        ));

        insert_definition(&mut reg, &GlobalDefRecord::String { id: 0, text: "p".into() }).unwrap();
        let bad_code = GlobalDefRecord::Parameter { id: 0, name: 0, parameter_type: 77 };
        assert!(matches!(
            insert_definition(&mut reg, &bad_code),
            Err(RegistryError::UnexpectedEnumValue { kind: "ParameterType", value: 77 })
        ));
    }
}
