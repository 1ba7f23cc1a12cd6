//! Error taxonomy for reference allocation, lookup and record decoding.
//!
//! Every failure in this crate is synchronous and local. None of them is
//! retryable: a trace pass that hits one is expected to abort.

/// Errors raised by the registry subsystem.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Allocating past the largest representable reference of a namespace.
    #[error("cannot allocate {namespace} reference: address space exhausted")]
    Exhausted {
        /// Namespace whose generator ran out of references.
        namespace: &'static str,
    },

    /// A cross-reference names a definition that was never registered.
    #[error("undefined {kind} reference {raw}")]
    UndefinedReference {
        /// Kind (or namespace) that was looked up.
        kind: &'static str,
        /// Raw reference value.
        raw: u64,
    },

    /// Attempt to define the reserved "undefined" reference.
    #[error("cannot define {kind} with the undefined reference")]
    SentinelReference {
        /// Kind that was being defined.
        kind: &'static str,
    },

    /// The same reference was defined twice under a rejecting policy.
    #[error("duplicate {kind} reference {raw}")]
    DuplicateReference {
        /// Kind that was being defined.
        kind: &'static str,
        /// Raw reference value.
        raw: u64,
    },

    /// An enum code or flag set outside the known range (corrupt input).
    #[error("unexpected enum value {value} for {kind}")]
    UnexpectedEnumValue {
        /// Enum or flag type that failed to decode.
        kind: &'static str,
        /// Offending raw value.
        value: u64,
    },
}

/// Convenience alias used throughout the crate.
pub type Result<T, E = RegistryError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_kind() {
        let e = RegistryError::Exhausted { namespace: "io_paradigm" };
        assert_eq!(
            e.to_string(),
            "cannot allocate io_paradigm reference: address space exhausted"
        );

        let e = RegistryError::UnexpectedEnumValue { kind: "GroupType", value: 99 };
        assert!(e.to_string().contains("GroupType"));
    }
}
