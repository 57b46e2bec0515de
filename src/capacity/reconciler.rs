//! Room capacity reconciliation
//!
//! Grows or shrinks the chain of Home households anchored at a facility so
//! that it holds exactly the target number of rooms. Empty rooms go first;
//! occupied rooms are only removed after their occupants have been evicted.
//! The anchor record itself is never removed.

use serde::Serialize;

use crate::core::types::{BuildingId, HouseholdRef};
use crate::population::{walk_chain, Household, HouseholdFlags, PopulationStore};

/// Result of one reconcile call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReconcileOutcome {
    /// Room count already matched the target
    Unchanged,
    /// Rooms appended to the chain
    Created(u32),
    /// Rooms missing but creation was not allowed
    Deferred(u32),
    Deleted { empty: u32, occupied: u32 },
    /// The host could not allocate the rooms
    CreateFailed(u32),
    /// The chain is corrupted; nothing was changed
    Aborted,
    MissingBuilding,
}

/// Stateless capacity surgery on a facility's household chain
#[derive(Debug, Clone, Copy, Default)]
pub struct CapacityReconciler;

impl CapacityReconciler {
    /// Bring the Home room count of `building` to `target`
    ///
    /// Only appends new rooms when `allow_create` is set; right after a load
    /// the host tops rooms up itself.
    pub fn reconcile<S: PopulationStore + ?Sized>(
        store: &mut S,
        building: BuildingId,
        target: u32,
        allow_create: bool,
    ) -> ReconcileOutcome {
        let Some(record) = store.building(building) else {
            return ReconcileOutcome::MissingBuilding;
        };

        let mut rooms = 0u32;
        let mut tail = HouseholdRef::NONE;
        let mut walk = walk_chain(&*store, record.household_head);
        for (household_ref, household) in walk.by_ref() {
            if household.is_home() {
                rooms += 1;
            }
            tail = household_ref;
        }
        if walk.corrupted() {
            return ReconcileOutcome::Aborted;
        }

        if rooms == target {
            return ReconcileOutcome::Unchanged;
        }

        if rooms < target {
            let missing = target - rooms;
            if !allow_create {
                tracing::debug!(
                    "Building {:?} is {} rooms short, waiting for the host",
                    building,
                    missing
                );
                return ReconcileOutcome::Deferred(missing);
            }

            let flags = HouseholdFlags::HOME | HouseholdFlags::CREATED;
            let Some(head) = store.create_households(missing, building, flags) else {
                tracing::warn!("Could not allocate {} rooms for building {:?}", missing, building);
                return ReconcileOutcome::CreateFailed(missing);
            };
            if tail.is_none() {
                store.set_household_head(building, head);
            } else {
                store.set_household_next(tail, head);
            }
            tracing::info!("Added {} rooms to building {:?} ({} total)", missing, building, target);
            return ReconcileOutcome::Created(missing);
        }

        let (empty, occupied) = Self::delete_rooms(store, record.household_head, rooms - target);
        if empty + occupied == 0 {
            // Only the anchor is left
            return ReconcileOutcome::Unchanged;
        }
        tracing::info!(
            "Removed {} empty and {} occupied rooms from building {:?}",
            empty,
            occupied,
            building
        );
        ReconcileOutcome::Deleted { empty, occupied }
    }

    /// Remove up to `count` Home rooms after the anchor, empty ones first
    ///
    /// Returns how many empty and occupied rooms were removed.
    pub fn delete_rooms<S: PopulationStore + ?Sized>(
        store: &mut S,
        anchor: HouseholdRef,
        count: u32,
    ) -> (u32, u32) {
        let empty = Self::unlink_after_anchor(store, anchor, count, |h| h.is_empty());
        let occupied = Self::unlink_after_anchor(store, anchor, count - empty, |h| !h.is_empty());
        (empty, occupied)
    }

    /// Clear every occupant's association with a household, then release it
    pub fn evict_occupants<S: PopulationStore + ?Sized>(
        store: &mut S,
        household_ref: HouseholdRef,
        household: &Household,
    ) {
        let flags = household.flags;
        for person in household.occupants() {
            if flags.contains(HouseholdFlags::HOME) {
                store.clear_home(person);
            }
            if flags.intersects(HouseholdFlags::WORK | HouseholdFlags::STUDENT) {
                store.clear_work_or_student(person);
            }
            if flags.contains(HouseholdFlags::VISIT) {
                store.clear_visit(person);
            }
            if flags.contains(HouseholdFlags::VEHICLE) {
                store.clear_vehicle(person);
            }
        }
        store.release_household(household_ref);
    }

    fn unlink_after_anchor<S, F>(store: &mut S, anchor: HouseholdRef, count: u32, select: F) -> u32
    where
        S: PopulationStore + ?Sized,
        F: Fn(&Household) -> bool,
    {
        if count == 0 || anchor.is_none() {
            return 0;
        }
        let Some(anchor_record) = store.household(anchor) else {
            return 0;
        };

        let limit = store.household_capacity();
        let mut removed = 0;
        let mut visited = 0u32;
        let mut prev = anchor;
        let mut current = anchor_record.next;

        while current.is_some() && removed < count {
            visited += 1;
            if visited > limit {
                tracing::error!(
                    "Invalid household list detected: more than {} records reachable from chain",
                    limit
                );
                break;
            }
            let Some(household) = store.household(current) else {
                break;
            };
            let next = household.next;

            if household.is_home() && select(&household) {
                store.set_household_next(prev, next);
                Self::evict_occupants(store, current, &household);
                removed += 1;
            } else {
                prev = current;
            }
            current = next;
        }
        removed
    }
}
