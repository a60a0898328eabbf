use std::collections::BTreeMap;
use std::fmt;

use super::region::Region;
use crate::error::MaskError;

/// One accepted mask: the id it was filed under and the wavelength bounds the
/// user chose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaskEntry {
    pub id: u32,
    pub region: Region,
}

/// Accepted masks keyed by id.
///
/// Ids increase monotonically and are never handed out twice, even after a
/// removal, so iterating the map yields entries in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MaskLedger {
    entries: BTreeMap<u32, Region>,
    next_id: u32,
}

impl MaskLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// File a new mask and return its id.
    pub fn add(&mut self, region: Region) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.insert(id, region);
        log::info!("Recorded mask {id}: {region}");
        id
    }

    pub fn get(&self, id: u32) -> Result<MaskEntry, MaskError> {
        self.entries
            .get(&id)
            .map(|&region| MaskEntry { id, region })
            .ok_or(MaskError::UnknownMask(id))
    }

    pub fn remove(&mut self, id: u32) -> Result<MaskEntry, MaskError> {
        let region = self.entries.remove(&id).ok_or(MaskError::UnknownMask(id))?;
        log::info!("Removed mask {id}: {region}");
        Ok(MaskEntry { id, region })
    }

    /// All entries in insertion order.
    pub fn list(&self) -> Vec<MaskEntry> {
        self.entries
            .iter()
            .map(|(&id, &region)| MaskEntry { id, region })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// `{0: [4001, 4001], 2: [5100.5, 5102]}`
impl fmt::Display for MaskLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (id, region)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{id}: {region}")?;
        }
        f.write_str("}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(low: f64, high: f64) -> Region {
        Region::new(low, high).unwrap()
    }

    #[test]
    fn test_ids_increase_and_are_not_reused() {
        let mut ledger = MaskLedger::new();
        assert!(ledger.is_empty());
        assert_eq!(ledger.add(region(1.0, 2.0)), 0);
        assert_eq!(ledger.add(region(3.0, 4.0)), 1);
        ledger.remove(1).unwrap();
        assert_eq!(ledger.add(region(5.0, 6.0)), 2);
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn test_list_in_insertion_order() {
        let mut ledger = MaskLedger::new();
        ledger.add(region(9.0, 10.0));
        ledger.add(region(1.0, 2.0));
        let ids: Vec<u32> = ledger.list().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![0, 1]);
        assert_eq!(ledger.list()[0].region, region(9.0, 10.0));
    }

    #[test]
    fn test_remove_unknown_id_leaves_ledger_unchanged() {
        let mut ledger = MaskLedger::new();
        ledger.add(region(1.0, 2.0));
        assert_eq!(ledger.remove(7).unwrap_err(), MaskError::UnknownMask(7));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_display() {
        let mut ledger = MaskLedger::new();
        assert_eq!(ledger.to_string(), "{}");
        ledger.add(region(4001.0, 4001.0));
        ledger.add(region(4100.5, 4102.0));
        assert_eq!(ledger.to_string(), "{0: [4001, 4001], 1: [4100.5, 4102]}");
    }
}
