//! Local-to-global id mapping tables.
//!
//! A location stream may have been written with stream-local ids. Each
//! namespace that needs translation gets one [`IdMap`]; ids a table does not
//! mention map to themselves.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::record::EventRecord;

/// Namespace a mapping table applies to.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingType {
    String,
    Attribute,
    Location,
    Region,
    Group,
    Metric,
    Comm,
    Parameter,
    SourceCodeLocation,
    CallingContext,
    InterruptGenerator,
    IoFile,
    IoHandle,
}

/// Local → global id table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum IdMap {
    /// `map[local] = global` for a contiguous local range `0..map.len()`.
    Dense {
        /// Global ids indexed by local id.
        map: Vec<u64>,
    },
    /// Sorted `(local, global)` pairs.
    Sparse {
        /// Pairs sorted by local id.
        pairs: Vec<(u64, u64)>,
    },
}

impl IdMap {
    /// Build from arbitrary pairs, choosing the dense form when the local ids
    /// are exactly `0..n`. Later pairs win on repeated local ids.
    #[must_use]
    pub fn from_pairs(pairs: impl IntoIterator<Item = (u64, u64)>) -> Self {
        let sorted: BTreeMap<u64, u64> = pairs.into_iter().collect();
        let dense = sorted.keys().enumerate().all(|(i, &local)| local == i as u64);
        if dense {
            Self::Dense { map: sorted.into_values().collect() }
        } else {
            Self::Sparse { pairs: sorted.into_iter().collect() }
        }
    }

    /// Global id of `local`; unmapped ids map to themselves.
    #[must_use]
    pub fn map(&self, local: u64) -> u64 {
        match self {
            Self::Dense { map } => usize::try_from(local)
                .ok()
                .and_then(|i| map.get(i).copied())
                .unwrap_or(local),
            Self::Sparse { pairs } => pairs
                .binary_search_by_key(&local, |&(l, _)| l)
                .map_or(local, |i| pairs[i].1),
        }
    }

    /// Number of explicit entries.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Dense { map } => map.len(),
            Self::Sparse { pairs } => pairs.len(),
        }
    }

    /// Whether the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One mapping table as stored in a location stream.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingRecord {
    /// Namespace.
    pub mapping_type: MappingType,
    /// Table.
    pub map: IdMap,
}

/// All mapping tables of one location.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LocalMappings {
    tables: BTreeMap<MappingType, IdMap>,
}

impl LocalMappings {
    /// Collect tables; a later table for the same namespace replaces an earlier one.
    #[must_use]
    pub fn from_records(records: &[MappingRecord]) -> Self {
        Self { tables: records.iter().map(|r| (r.mapping_type, r.map.clone())).collect() }
    }

    /// Whether no table is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Global id of `local` in namespace `ty`.
    #[must_use]
    pub fn map(&self, ty: MappingType, local: u64) -> u64 {
        self.tables.get(&ty).map_or(local, |t| t.map(local))
    }

    /// [`map`](Self::map) for 32-bit namespaces. The sentinel is never
    /// remapped; a global id that does not fit maps to the sentinel.
    #[must_use]
    pub fn map_u32(&self, ty: MappingType, local: u32) -> u32 {
        if local == u32::MAX {
            return local;
        }
        u32::try_from(self.map(ty, u64::from(local))).unwrap_or(u32::MAX)
    }

    /// Rewrite the references of `event` from local to global ids.
    #[must_use]
    pub fn remap(&self, event: &EventRecord) -> EventRecord {
        if self.is_empty() {
            return event.clone();
        }
        let mut e = event.clone();
        match &mut e {
            EventRecord::Enter { region, .. } | EventRecord::Leave { region, .. } => {
                *region = self.map_u32(MappingType::Region, *region);
            }
            EventRecord::Metric { metric, .. } => {
                *metric = self.map_u32(MappingType::Metric, *metric);
            }
            EventRecord::MpiSend { communicator, .. } | EventRecord::MpiRecv { communicator, .. } => {
                *communicator = self.map_u32(MappingType::Comm, *communicator);
            }
            EventRecord::ParameterInt { parameter, .. } => {
                *parameter = self.map_u32(MappingType::Parameter, *parameter);
            }
            EventRecord::ParameterString { parameter, value, .. } => {
                *parameter = self.map_u32(MappingType::Parameter, *parameter);
                *value = self.map_u32(MappingType::String, *value);
            }
        }
        e
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contiguous_pairs_become_dense() {
        let m = IdMap::from_pairs([(1, 20), (0, 10), (2, 30)]);
        assert_eq!(m, IdMap::Dense { map: vec![10, 20, 30] });
        assert_eq!(m.map(1), 20);
        assert_eq!(m.map(7), 7);
    }

    #[test]
    fn gaps_become_sparse() {
        let m = IdMap::from_pairs([(5, 50), (2, 20)]);
        assert!(matches!(m, IdMap::Sparse { .. }));
        assert_eq!(m.map(2), 20);
        assert_eq!(m.map(5), 50);
        assert_eq!(m.map(3), 3);
        assert_eq!(m.len(), 2);
    }

    #[test]
    fn remap_touches_only_mapped_namespaces() {
        let mappings = LocalMappings::from_records(&[MappingRecord {
            mapping_type: MappingType::Region,
            map: IdMap::from_pairs([(0, 7)]),
        }]);
        let e = mappings.remap(&EventRecord::Enter { time: 1, region: 0 });
        assert_eq!(e, EventRecord::Enter { time: 1, region: 7 });

        let p = EventRecord::ParameterInt { time: 2, parameter: 0, value: -1 };
        assert_eq!(mappings.remap(&p), p);

        // The sentinel means "none" and is left alone.
        let e = mappings.remap(&EventRecord::Leave { time: 3, region: u32::MAX });
        assert_eq!(e, EventRecord::Leave { time: 3, region: u32::MAX });
    }
}
