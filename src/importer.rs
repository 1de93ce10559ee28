//! Sample import
//!
//! Applies starbase listings and their sampled details to the tracked
//! structures. Fuel levels go in first, carrying the reported state
//! timestamp, and only then is the reported state applied, so the state
//! change does not disturb the level check.

use std::sync::Arc;

use ahash::AHashMap;

use crate::core::context::TrackerContext;
use crate::core::error::Result;
use crate::core::types::{ItemId, ItemTypeId, StructureState, Timestamp};
use crate::sample::{SampleSet, StarbaseDetail, StarbaseListing};
use crate::structure::{ResourceUpdate, Structure, StructureReport};

/// Owner of every tracked structure, keyed by item id
#[derive(Debug)]
pub struct Tracker {
    context: Arc<TrackerContext>,
    structures: AHashMap<ItemId, Structure>,
}

impl Tracker {
    pub fn new(context: Arc<TrackerContext>) -> Self {
        Self {
            context,
            structures: AHashMap::new(),
        }
    }

    pub fn context(&self) -> &TrackerContext {
        &self.context
    }

    /// Structure for `listing`, created on first sight
    pub fn add_structure(&mut self, listing: &StarbaseListing) -> &mut Structure {
        let context = &self.context;
        self.structures.entry(listing.item_id).or_insert_with(|| {
            tracing::info!("Tracking new structure {}", listing.item_id);
            Structure::new(listing, Arc::clone(context))
        })
    }

    pub fn structure(&self, item_id: ItemId) -> Option<&Structure> {
        self.structures.get(&item_id)
    }

    pub fn structure_mut(&mut self, item_id: ItemId) -> Option<&mut Structure> {
        self.structures.get_mut(&item_id)
    }

    /// Tracked structures ordered by item id
    pub fn structures(&self) -> Vec<&Structure> {
        let mut structures: Vec<&Structure> = self.structures.values().collect();
        structures.sort_by_key(|s| s.item_id());
        structures
    }

    pub fn len(&self) -> usize {
        self.structures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.structures.is_empty()
    }

    /// Apply one listing and its detail sample, returning the rebuilt
    /// fuel ids. A missing detail only registers the structure.
    pub fn import(
        &mut self,
        listing: &StarbaseListing,
        detail: Option<&StarbaseDetail>,
    ) -> Result<Vec<ItemTypeId>> {
        let structure = self.add_structure(listing);
        let Some(detail) = detail else {
            tracing::warn!(
                "No detail sampled for structure {}, listing may be out of date",
                listing.item_id
            );
            return Ok(Vec::new());
        };

        let state = StructureState::try_from(detail.state)?;
        tracing::info!(
            "Structure {} sampled at {}, state timestamp {:?}",
            detail.item_id,
            detail.sampled_at,
            detail.state_timestamp
        );

        let updated = structure.update_resources(
            ResourceUpdate::new(detail.levels(), detail.sampled_at)
                .with_state_timestamp(detail.state_timestamp),
        );
        structure.set_state(state, None, detail.sampled_at, None);
        Ok(updated)
    }

    /// Import a whole sample set, returning the number of samples applied.
    /// Samples that fail to apply are logged and skipped.
    pub fn import_all(&mut self, samples: &SampleSet) -> usize {
        let total = samples.listings.len();
        tracing::info!("{} starbases listed", total);

        let mut applied = 0;
        for (index, listing) in samples.listings.iter().enumerate() {
            tracing::info!("({}/{}) starbases processed", index, total);

            let details = samples.details_for(listing.item_id);
            if details.is_empty() {
                // registers the structure and reports the gap
                let _ = self.import(listing, None);
                continue;
            }
            for detail in details {
                match self.import(listing, Some(detail)) {
                    Ok(_) => applied += 1,
                    Err(e) => tracing::warn!(
                        "Skipping sample for structure {} at {}: {}",
                        listing.item_id,
                        detail.sampled_at,
                        e
                    ),
                }
            }
        }

        tracing::info!("({}/{}) processing complete", total, total);
        applied
    }

    /// Reports for every tracked structure at `ts`
    pub fn reports(&self, ts: Timestamp) -> Vec<StructureReport> {
        self.structures().into_iter().map(|s| s.report(ts)).collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::catalog::fixtures;
    use crate::core::error::TrackerError;
    use crate::sample::FuelLevel;
    use crate::structure::monitor::{ObservedEvent, RecordingObserver, TrackedField};
    use crate::structure::test_support::{context, listing, observed_context};

    const BLOCK: ItemTypeId = ItemTypeId(fixtures::FUEL_BLOCK);
    const STRONT: ItemTypeId = ItemTypeId(fixtures::STRONTIUM);

    fn detail(state: u8, state_timestamp: Option<Timestamp>, sampled_at: Timestamp, block: i64) -> StarbaseDetail {
        StarbaseDetail {
            item_id: ItemId(1000001),
            state,
            state_timestamp,
            sampled_at,
            fuel: vec![
                FuelLevel { type_id: BLOCK, quantity: block },
                FuelLevel { type_id: STRONT, quantity: 9600 },
            ],
        }
    }

    #[test]
    fn test_add_structure_once() {
        let mut tracker = Tracker::new(context());
        let l = listing(fixtures::LOWSEC, fixtures::OTHER_CORP, StructureState::Online, Some(0));
        tracker.add_structure(&l);
        tracker.add_structure(&l);
        assert_eq!(tracker.len(), 1);
        assert!(tracker.structure(ItemId(1000001)).is_some());
    }

    #[test]
    fn test_import_detail() {
        let mut tracker = Tracker::new(context());
        let l = listing(fixtures::LOWSEC, fixtures::OTHER_CORP, StructureState::Online, Some(0));

        let updated = tracker.import(&l, Some(&detail(4, Some(1200), 3000, 28000))).unwrap();
        assert_eq!(updated, vec![BLOCK, STRONT]);

        let tower = tracker.structure(ItemId(1000001)).unwrap();
        assert_eq!(tower.resource_pulse(), 1200);
        assert_eq!(tower.fuel(BLOCK).unwrap().timestamp(), 4800);
        assert_eq!(tower.resources(4800 + 3600)[&BLOCK], 27960);

        // the next hourly sample agrees with the extrapolation
        let updated = tracker.import(&l, Some(&detail(4, Some(1200), 3000 + 7200, 27960))).unwrap();
        assert!(updated.is_empty());
    }

    #[test]
    fn test_import_state_change() {
        let mut tracker = Tracker::new(context());
        let l = listing(fixtures::LOWSEC, fixtures::OTHER_CORP, StructureState::Online, Some(0));
        tracker.import(&l, Some(&detail(4, Some(0), 0, 28000))).unwrap();
        tracker.import(&l, Some(&detail(1, Some(0), 36000, 27600))).unwrap();

        let tower = tracker.structure(ItemId(1000001)).unwrap();
        assert_eq!(tower.state(), StructureState::Anchored);
        assert_eq!(tower.resources(72000)[&BLOCK], 27600);
    }

    #[test]
    fn test_import_rejects_bad_state() {
        let mut tracker = Tracker::new(context());
        let l = listing(fixtures::LOWSEC, fixtures::OTHER_CORP, StructureState::Online, Some(0));
        let err = tracker.import(&l, Some(&detail(9, Some(0), 0, 28000))).unwrap_err();
        assert!(matches!(err, TrackerError::InvalidState(_)));
        // nothing was applied
        assert!(tracker.structure(ItemId(1000001)).unwrap().fuels().is_empty());
    }

    #[test]
    fn test_import_missing_detail() {
        let mut tracker = Tracker::new(context());
        let l = listing(fixtures::LOWSEC, fixtures::OTHER_CORP, StructureState::Online, Some(0));
        assert!(tracker.import(&l, None).unwrap().is_empty());
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_import_all_skips_bad_samples() {
        let l = listing(fixtures::LOWSEC, fixtures::OTHER_CORP, StructureState::Online, Some(0));
        let samples = SampleSet {
            listings: vec![l],
            details: vec![
                detail(4, Some(0), 0, 28000),
                detail(7, Some(0), 3600, 27960),
                detail(4, Some(0), 7200, 27920),
            ],
        };
        let mut tracker = Tracker::new(context());
        assert_eq!(tracker.import_all(&samples), 2);
        assert_eq!(tracker.reports(7200).len(), 1);
    }

    #[test]
    fn test_import_notifies_state_timestamp_change() {
        let observer = Arc::new(RecordingObserver::new());
        let mut tracker = Tracker::new(observed_context(observer.clone()));
        let l = listing(fixtures::LOWSEC, fixtures::OTHER_CORP, StructureState::Online, Some(0));
        tracker.import(&l, Some(&detail(4, Some(1200), 3000, 28000))).unwrap();

        let updates: Vec<_> = observer
            .take()
            .into_iter()
            .filter(|e| matches!(e, ObservedEvent::Updated(_)))
            .collect();
        assert_eq!(updates, vec![ObservedEvent::Updated(vec![TrackedField::StateTimestamp])]);
    }
}
