//! Static protocol IE registries
//!
//! Each ProtocolIE container type owns one `static` table describing the
//! IEs it can carry. The id index is built on first lookup and is read-only
//! afterwards, so lookups from concurrent decoders need no locking.

use std::collections::HashMap;

use once_cell::sync::OnceCell;

use crate::cursor::UperDecoder;
use crate::error::PerResult;
use crate::types::{Criticality, Presence, ProtocolIeId};

/// Decodes one IE value into its field of the container `C`.
pub type IeDecodeFn<C> = fn(&mut C, &mut UperDecoder<'_>) -> PerResult<()>;

/// One registry row.
pub struct IeDescriptor<C: 'static> {
    pub id: ProtocolIeId,
    pub name: &'static str,
    pub criticality: Criticality,
    pub presence: Presence,
    pub decode: IeDecodeFn<C>,
}

pub struct IeRegistry<C: 'static> {
    entries: &'static [IeDescriptor<C>],
    index: OnceCell<HashMap<u16, usize>>,
}

impl<C: 'static> IeRegistry<C> {
    pub const fn new(entries: &'static [IeDescriptor<C>]) -> Self {
        Self {
            entries,
            index: OnceCell::new(),
        }
    }

    fn index(&self) -> &HashMap<u16, usize> {
        self.index.get_or_init(|| {
            let mut index = HashMap::with_capacity(self.entries.len());
            for (position, entry) in self.entries.iter().enumerate() {
                let previous = index.insert(entry.id.0, position);
                debug_assert!(previous.is_none(), "duplicate IE id {} ({})", entry.id.0, entry.name);
            }
            index
        })
    }

    pub fn lookup(&self, id: ProtocolIeId) -> Option<&IeDescriptor<C>> {
        self.index().get(&id.0).map(|&position| &self.entries[position])
    }

    /// Id of the `idx`-th registered IE.
    pub fn idx_to_id(&self, idx: usize) -> Option<ProtocolIeId> {
        self.entries.get(idx).map(|entry| entry.id)
    }

    pub fn is_id_valid(&self, id: ProtocolIeId) -> bool {
        self.lookup(id).is_some()
    }

    pub fn get_crit(&self, id: ProtocolIeId) -> Option<Criticality> {
        self.lookup(id).map(|entry| entry.criticality)
    }

    pub fn get_presence(&self, id: ProtocolIeId) -> Option<Presence> {
        self.lookup(id).map(|entry| entry.presence)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &IeDescriptor<C>> {
        self.entries.iter()
    }

    /// Mandatory ids that do not appear in `present`.
    pub fn missing_mandatory(&self, present: &[ProtocolIeId]) -> Vec<ProtocolIeId> {
        self.entries
            .iter()
            .filter(|entry| entry.presence == Presence::Mandatory && !present.contains(&entry.id))
            .map(|entry| entry.id)
            .collect()
    }
}
