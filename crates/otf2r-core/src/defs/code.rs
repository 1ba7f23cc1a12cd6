//! Strings, attributes, regions and the code-location kinds.

use std::fmt;

use super::{impl_kind, impl_parent_chain};
use crate::definition::Def;
use crate::enums::{
    Base, InterruptGeneratorMode, MarkerSeverity, Paradigm, ParameterType, RegionFlags,
    RegionRole, Type,
};
use crate::reference::{
    AttributeRef, CallingContextRef, InterruptGeneratorRef, MarkerRef, ParameterRef, RegionRef,
    SourceCodeLocationRef, StringRef,
};

/// A string definition.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StringDef {
    /// The text.
    pub text: Box<str>,
}

impl StringDef {
    /// Construct from anything string-like.
    #[must_use]
    pub fn new(text: impl Into<Box<str>>) -> Self {
        Self { text: text.into() }
    }

    /// The text.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl Def<StringDef> {
    /// The text, if defined.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        self.data().map(StringDef::as_str)
    }
}

impl fmt::Display for Def<StringDef> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str().unwrap_or("<undefined>"))
    }
}

/// An attribute definition (name + value type of per-event attributes).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Attribute {
    /// Name.
    pub name: Def<StringDef>,
    /// Description.
    pub description: Def<StringDef>,
    /// Type of values carried by this attribute.
    pub value_type: Type,
}

/// A code region (function, loop, parallel construct, ...).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Region {
    /// Display name.
    pub name: Def<StringDef>,
    /// Canonical (e.g. mangled) name.
    pub canonical_name: Def<StringDef>,
    /// Description.
    pub description: Def<StringDef>,
    /// Role.
    pub role: RegionRole,
    /// Paradigm.
    pub paradigm: Paradigm,
    /// Flags.
    pub flags: RegionFlags,
    /// Source file.
    pub source_file: Def<StringDef>,
    /// First line in `source_file` (0 if unknown).
    pub begin_line_number: u32,
    /// Last line in `source_file` (0 if unknown).
    pub end_line_number: u32,
}

impl Region {
    /// Region named `name` (also used as canonical name); other fields empty.
    #[must_use]
    pub fn new(name: Def<StringDef>, role: RegionRole, paradigm: Paradigm) -> Self {
        Self { canonical_name: name.clone(), name, role, paradigm, ..Self::default() }
    }
}

/// A parameter definition.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Parameter {
    /// Name.
    pub name: Def<StringDef>,
    /// Type of the values.
    pub parameter_type: ParameterType,
}

/// A file/line pair.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SourceCodeLocation {
    /// Source file.
    pub file: Def<StringDef>,
    /// Line number.
    pub line_number: u32,
}

/// A node of the calling-context tree.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CallingContext {
    /// Region of this frame.
    pub region: Def<Region>,
    /// Source location of this frame.
    pub source_code_location: Def<SourceCodeLocation>,
    /// Calling frame; undefined for roots.
    pub parent: Def<CallingContext>,
}

/// Source of sampling interrupts.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InterruptGenerator {
    /// Name.
    pub name: Def<StringDef>,
    /// Time- or count-based.
    pub mode: InterruptGeneratorMode,
    /// Base of `exponent`.
    pub base: Base,
    /// Period unit is `base^exponent`.
    pub exponent: i64,
    /// Period in units.
    pub period: u64,
}

/// A marker class. Group and category are plain text in the format.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Marker {
    /// Marker group.
    pub group: Box<str>,
    /// Marker category.
    pub category: Box<str>,
    /// Severity.
    pub severity: MarkerSeverity,
}

impl_kind! {
    StringDef => StringRef, "string";
    Attribute => AttributeRef, "attribute";
    Region => RegionRef, "region";
    Parameter => ParameterRef, "parameter";
    SourceCodeLocation => SourceCodeLocationRef, "source_code_location";
    CallingContext => CallingContextRef, "calling_context";
    InterruptGenerator => InterruptGeneratorRef, "interrupt_generator";
    Marker => MarkerRef, "marker";
}

impl_parent_chain!(CallingContext);
