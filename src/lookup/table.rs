use itertools::Itertools;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use super::LookupError;

/// Internal storage slot of an element
pub type Position = usize;

/// Identity → position lookup that survives element fusion
///
/// `by_identifier` collapses fused elements onto a shared slot, while
/// `original_order` keeps the complete pre-fusion identifier sequence so a
/// position can always be mapped back to the element the caller asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupTable<I>
where
    I: Eq + Hash,
{
    by_identifier: HashMap<I, Position>,
    original_order: Vec<I>,
}

impl<I> LookupTable<I>
where
    I: Eq + Hash + Clone + fmt::Debug,
{
    /// Build a lookup where every identifier owns the slot of its position
    /// in `identifiers`
    pub fn from_identifiers(identifiers: impl IntoIterator<Item = I>) -> Result<Self, LookupError> {
        let original_order: Vec<I> = identifiers.into_iter().collect();
        let mut by_identifier = HashMap::with_capacity(original_order.len());

        for (position, id) in original_order.iter().enumerate() {
            if by_identifier.insert(id.clone(), position).is_some() {
                return Err(LookupError::DuplicateIdentifier(format!("{:?}", id)));
            }
        }

        Ok(Self {
            by_identifier,
            original_order,
        })
    }

    /// Number of identifiers (pre-fusion elements)
    pub fn len(&self) -> usize {
        self.original_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.original_order.is_empty()
    }

    /// Identifiers in their original, pre-fusion order
    pub fn original_order(&self) -> &[I] {
        &self.original_order
    }

    /// Current slot of `id`
    pub fn position(&self, id: &I) -> Result<Position, LookupError> {
        self.by_identifier
            .get(id)
            .copied()
            .ok_or_else(|| LookupError::UnknownIdentifier(format!("{:?}", id)))
    }

    /// Identifier that originally lived at `position`
    pub fn original_identifier(&self, position: Position) -> Result<&I, LookupError> {
        self.original_order
            .get(position)
            .ok_or(LookupError::PositionOutOfRange {
                position: position as i64,
                len: self.original_order.len(),
            })
    }

    /// Forward resolution: slots for `ids`, in input order, duplicates kept
    pub fn positions(&self, ids: &[I]) -> Result<Vec<Position>, LookupError> {
        ids.iter().map(|id| self.position(id)).collect()
    }

    /// Reverse resolution: original identifiers for pre-fusion `positions`
    pub fn original_identifiers(&self, positions: &[Position]) -> Result<Vec<I>, LookupError> {
        positions
            .iter()
            .map(|&p| self.original_identifier(p).cloned())
            .collect()
    }

    /// Fuse `id` into the slot of `into`
    ///
    /// Every identifier currently sharing `id`'s slot moves along, so chains of
    /// fusions end up in a single slot. The original order is never touched.
    pub fn fuse(&mut self, id: &I, into: &I) -> Result<(), LookupError> {
        let from = self.position(id)?;
        let to = self.position(into)?;
        if from == to {
            return Ok(());
        }

        for slot in self.by_identifier.values_mut() {
            if *slot == from {
                *slot = to;
            }
        }
        Ok(())
    }

    /// Move only the identifier originally at `position` onto `slot`
    ///
    /// Other identifiers sharing its current slot stay where they are.
    pub(crate) fn assign_slot(&mut self, position: Position, slot: Position) -> Result<(), LookupError> {
        self.original_identifier(slot)?;
        let id = self.original_identifier(position)?.clone();
        self.by_identifier.insert(id, slot);
        Ok(())
    }

    /// Number of distinct slots in use
    pub fn slot_count(&self) -> usize {
        self.by_identifier.values().unique().count()
    }

    /// True when at least two identifiers share a slot
    pub fn is_fused(&self) -> bool {
        self.slot_count() < self.by_identifier.len()
    }

    /// Groups of identifiers sharing a slot, ordered by slot then by original
    /// order. Singleton slots are left out.
    pub fn fused_groups(&self) -> Vec<Vec<I>> {
        let by_slot = self
            .original_order
            .iter()
            .filter_map(|id| self.by_identifier.get(id).map(|&slot| (slot, id.clone())))
            .into_group_map();

        by_slot
            .into_iter()
            .filter(|(_, ids)| ids.len() > 1)
            .sorted_by_key(|(slot, _)| *slot)
            .map(|(_, ids)| ids)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hundreds() -> LookupTable<i64> {
        LookupTable::from_identifiers((0..10).map(|i| i + 100)).unwrap()
    }

    #[test]
    fn test_positions_follow_original_order() {
        let lookup = hundreds();
        assert_eq!(lookup.len(), 10);
        assert_eq!(lookup.position(&100).unwrap(), 0);
        assert_eq!(lookup.position(&109).unwrap(), 9);
        assert_eq!(lookup.original_identifier(3).unwrap(), &103);
        assert!(!lookup.is_fused());
    }

    #[test]
    fn test_duplicate_identifier_rejected() {
        let err = LookupTable::from_identifiers(vec![1, 2, 1]).unwrap_err();
        assert_eq!(err, LookupError::DuplicateIdentifier("1".to_string()));
    }

    #[test]
    fn test_fuse_collapses_forward_only() {
        let mut lookup = hundreds();
        lookup.fuse(&107, &102).unwrap();

        assert_eq!(lookup.positions(&[102, 107]).unwrap(), vec![2, 2]);
        assert_eq!(lookup.original_identifiers(&[2, 7]).unwrap(), vec![102, 107]);
        assert_eq!(lookup.slot_count(), 9);
        assert!(lookup.is_fused());
    }

    #[test]
    fn test_fuse_moves_whole_slot() {
        let mut lookup = hundreds();
        lookup.fuse(&103, &104).unwrap();
        lookup.fuse(&104, &101).unwrap();

        // 103 was sharing 104's slot and follows it
        assert_eq!(lookup.positions(&[101, 103, 104]).unwrap(), vec![1, 1, 1]);
        assert_eq!(lookup.fused_groups(), vec![vec![101, 103, 104]]);
    }

    #[test]
    fn test_fuse_unknown_identifier() {
        let mut lookup = hundreds();
        assert!(matches!(
            lookup.fuse(&42, &101),
            Err(LookupError::UnknownIdentifier(_))
        ));
        assert!(!lookup.is_fused());
    }

    #[test]
    fn test_out_of_range_position() {
        let lookup = hundreds();
        assert_eq!(
            lookup.original_identifier(10).unwrap_err(),
            LookupError::PositionOutOfRange { position: 10, len: 10 }
        );
    }

    #[test]
    fn test_string_identifiers() {
        let mut lookup =
            LookupTable::from_identifiers(["a", "b", "c"].map(String::from)).unwrap();
        lookup.fuse(&"c".to_string(), &"a".to_string()).unwrap();
        assert_eq!(
            lookup.positions(&["c".to_string(), "b".to_string()]).unwrap(),
            vec![0, 1]
        );
    }

    #[test]
    fn test_assign_slot_moves_single_identifier() {
        let mut lookup = LookupTable::from_identifiers([10, 11, 12]).unwrap();
        lookup.fuse(&12, &11).unwrap();
        lookup.assign_slot(1, 0).unwrap();

        assert_eq!(lookup.positions(&[10, 11, 12]).unwrap(), vec![0, 0, 1]);
        assert_eq!(
            lookup.assign_slot(0, 3).unwrap_err(),
            LookupError::PositionOutOfRange { position: 3, len: 3 }
        );
    }
}
