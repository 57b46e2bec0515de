//! Bounded traversal of a building's household chain

use crate::core::types::HouseholdRef;
use crate::population::{Household, PopulationIndex};

/// Iterator over `(ref, household)` pairs starting at a chain head
///
/// Stops at the end of the chain, at a missing record, or once more records
/// have been visited than the host can hold. The last case means the chain
/// loops; it is logged and reported through [`ChainWalk::corrupted`].
pub struct ChainWalk<'a, I: PopulationIndex + ?Sized> {
    index: &'a I,
    next: HouseholdRef,
    visited: u32,
    limit: u32,
    corrupted: bool,
}

/// Walk the chain that starts at `head`
pub fn walk_chain<I: PopulationIndex + ?Sized>(index: &I, head: HouseholdRef) -> ChainWalk<'_, I> {
    ChainWalk {
        index,
        next: head,
        visited: 0,
        limit: index.household_capacity(),
        corrupted: false,
    }
}

impl<I: PopulationIndex + ?Sized> ChainWalk<'_, I> {
    /// True once the walk was cut short by the length bound
    pub fn corrupted(&self) -> bool {
        self.corrupted
    }
}

impl<I: PopulationIndex + ?Sized> Iterator for ChainWalk<'_, I> {
    type Item = (HouseholdRef, Household);

    fn next(&mut self) -> Option<Self::Item> {
        if self.next.is_none() || self.corrupted {
            return None;
        }

        self.visited += 1;
        if self.visited > self.limit {
            self.corrupted = true;
            tracing::error!(
                "Invalid household list detected: more than {} records reachable from chain",
                self.limit
            );
            return None;
        }

        let current = self.next;
        match self.index.household(current) {
            Some(household) => {
                self.next = household.next;
                Some((current, household))
            }
            None => {
                tracing::warn!("Household chain points at missing record {:?}", current);
                self.next = HouseholdRef::NONE;
                None
            }
        }
    }
}
