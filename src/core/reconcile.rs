//! # Equip Reconciler
//!
//! Turns a click on a catalog entry into an equip request, and turns the
//! backend's answer into loadout and highlight updates.
//!
//! ```text
//! click ──► plan_equip() ──► EquipPlan { target, payload }
//!                                  │  POST /armorcore (payload)
//!                                  ▼
//!            apply_equip(plan, response) ──► [HighlightUpdate, ...]
//! ```
//!
//! Planning never touches live state: the payload is a copy of the equipped
//! snapshot with the change applied. Only `apply_equip` commits, so a failed
//! request leaves the loadout exactly as it was.
//!
//! Changing the core asks the backend for the core's default theme
//! (`GetInv = true`). Each theme path that matches a `CorePath` in the
//! helmet, visor, glove or coating row re-equips that entry; slots without
//! a match keep their current item.

use log::{debug, info};
use std::collections::HashMap;
use std::fmt;

use super::highlight::HighlightState;
use super::inventory::Inventory;
use super::item::{CurrentlyEquipped, CustomKit, EquippableItem};
use super::slot::{SLOTS, SlotKind};
use crate::api::types::ArmorCoreResponse;

#[derive(Debug, PartialEq)]
pub enum PlanError {
    /// A non-core slot was equipped before any core.
    NoCore,
    /// The item doesn't belong to the equipped core.
    Incompatible { item_id: String, core_id: String },
}

impl fmt::Display for PlanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanError::NoCore => write!(f, "no core equipped"),
            PlanError::Incompatible { item_id, core_id } => {
                write!(f, "{item_id} does not fit core {core_id}")
            }
        }
    }
}

impl std::error::Error for PlanError {}

/// What the user asked to equip.
#[derive(Debug, Clone, PartialEq)]
pub enum EquipTarget {
    Core(EquippableItem),
    Item(EquippableItem),
    Kit(CustomKit),
}

/// A ready-to-send equip request.
#[derive(Debug, Clone, PartialEq)]
pub struct EquipPlan {
    pub target: EquipTarget,
    /// Snapshot sent as `CurrentlyEquipped`.
    pub payload: CurrentlyEquipped,
}

impl EquipPlan {
    /// The key under which in-flight requests supersede each other.
    pub fn slot_key(&self) -> SlotKind {
        match &self.target {
            EquipTarget::Core(_) => SlotKind::ArmorCore,
            EquipTarget::Item(item) => item.kind,
            EquipTarget::Kit(_) => SlotKind::ArmorKit,
        }
    }

    /// Every slot this plan writes on success. A kit claims each slot it
    /// sets along with the kit key.
    pub fn claimed_slots(&self) -> Vec<SlotKind> {
        match &self.target {
            EquipTarget::Core(_) | EquipTarget::Item(_) => vec![self.slot_key()],
            EquipTarget::Kit(kit) => std::iter::once(SlotKind::ArmorKit)
                .chain(kit.loadout.iter().map(|(kind, _)| kind))
                .collect(),
        }
    }

    /// Narrows a kit plan to the slots in `owned`; other targets are unchanged.
    pub fn retain_slots(&mut self, owned: &[SlotKind]) {
        if let EquipTarget::Kit(kit) = &mut self.target {
            kit.loadout.retain(|kind| owned.contains(&kind));
        }
    }

    pub fn describe(&self) -> String {
        match &self.target {
            EquipTarget::Core(item) | EquipTarget::Item(item) => {
                format!("{} {}", item.kind.label(), item.display_name())
            }
            EquipTarget::Kit(kit) => format!("kit {}", kit.name),
        }
    }
}

/// One highlight write, in the order it was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightUpdate {
    pub slot: SlotKind,
    pub item_id: String,
}

/// Plans equipping a catalog entry.
///
/// Returns `Ok(None)` when the entry already occupies its slot; no request
/// should be sent in that case.
pub fn plan_equip(
    item: &EquippableItem,
    equipped: &CurrentlyEquipped,
) -> Result<Option<EquipPlan>, PlanError> {
    if equipped.get(item.kind).map(|current| current.id.as_str()) == Some(item.id.as_str()) {
        debug!("{} {} already equipped, skipping", item.kind, item.id);
        return Ok(None);
    }

    let mut payload = equipped.clone();

    if item.kind.is_core() {
        let mut core = item.clone();
        core.get_inv = Some(true);
        payload.set(core);
        return Ok(Some(EquipPlan {
            target: EquipTarget::Core(item.clone()),
            payload,
        }));
    }

    let core = equipped.core().ok_or(PlanError::NoCore)?;
    if !item.fits_core(core) {
        return Err(PlanError::Incompatible {
            item_id: item.id.clone(),
            core_id: core.id.clone(),
        });
    }

    let mut core = core.clone();
    core.get_inv = Some(false);
    payload.set(core);
    payload.set(item.clone());

    Ok(Some(EquipPlan {
        target: EquipTarget::Item(item.clone()),
        payload,
    }))
}

/// Plans equipping every slot a custom kit sets.
pub fn plan_kit_equip(
    kit: &CustomKit,
    equipped: &CurrentlyEquipped,
) -> Result<Option<EquipPlan>, PlanError> {
    if kit.loadout.is_empty() {
        return Ok(None);
    }
    if kit.loadout.core().is_none() && equipped.core().is_none() {
        return Err(PlanError::NoCore);
    }

    let unchanged = kit
        .loadout
        .iter()
        .all(|(kind, item)| equipped.get(kind).map(|e| e.id.as_str()) == Some(item.id.as_str()));
    if unchanged {
        debug!("Kit '{}' already equipped, skipping", kit.name);
        return Ok(None);
    }

    let mut payload = equipped.clone();
    for (_, item) in kit.loadout.iter() {
        payload.set(item.clone());
    }
    if let Some(mut core) = payload.core().cloned() {
        core.get_inv = Some(false);
        payload.set(core);
    }

    Ok(Some(EquipPlan {
        target: EquipTarget::Kit(kit.clone()),
        payload,
    }))
}

/// Commits a successful equip and returns the highlight writes in order.
///
/// For a core change the core is written first, then each matched
/// dependent slot in table order.
pub fn apply_equip(
    plan: &EquipPlan,
    response: &ArmorCoreResponse,
    inventory: &Inventory,
    equipped: &mut CurrentlyEquipped,
    highlights: &mut HighlightState,
) -> Vec<HighlightUpdate> {
    let mut updates = Vec::new();
    let mut commit = |item: EquippableItem, updates: &mut Vec<HighlightUpdate>| {
        highlights.set(item.kind, &item.id);
        updates.push(HighlightUpdate {
            slot: item.kind,
            item_id: item.id.clone(),
        });
        equipped.set(item);
    };

    match &plan.target {
        EquipTarget::Item(item) => commit(item.clone(), &mut updates),
        EquipTarget::Kit(kit) => {
            for (_, item) in kit.loadout.iter() {
                commit(item.clone(), &mut updates);
            }
        }
        EquipTarget::Core(core) => {
            commit(core.clone(), &mut updates);

            let Some(theme) = response.themes.first() else {
                debug!("Core {} equipped without a default theme", core.id);
                return updates;
            };

            for spec in SLOTS {
                let Some(theme_key) = spec.theme_key else {
                    continue;
                };
                let Some(path) = theme.path(theme_key) else {
                    continue;
                };
                match inventory.find_by_core_path(spec.kind, path) {
                    Some(found) => commit(found.clone(), &mut updates),
                    None => debug!("{} {} has no catalog match", theme_key, path),
                }
            }
        }
    }

    info!(
        "Equipped {} ({} highlight update(s))",
        plan.describe(),
        updates.len()
    );
    updates
}

/// Identifies one in-flight equip request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub slot: SlotKind,
    pub seq: u64,
}

/// Tracks which in-flight equip request owns each slot.
///
/// Issuing a ticket claims its slots, taking them over from any older
/// ticket. A completion only applies to the slots its ticket still owns,
/// and is dropped entirely once its own slot key has been taken over.
#[derive(Debug, Default)]
pub struct InFlight {
    next_seq: u64,
    pending: HashMap<SlotKind, u64>,
}

impl InFlight {
    /// Issues a ticket keyed by `slot` that also claims `claims`.
    pub fn issue(&mut self, slot: SlotKind, claims: &[SlotKind]) -> Ticket {
        self.next_seq += 1;
        for kind in std::iter::once(slot).chain(claims.iter().copied()) {
            if let Some(old) = self.pending.insert(kind, self.next_seq)
                && old != self.next_seq
            {
                debug!("Superseding in-flight request #{} for {}", old, kind);
            }
        }
        Ticket {
            slot,
            seq: self.next_seq,
        }
    }

    /// Marks `ticket` finished and returns the slots it still owned, in
    /// table order. Empty if a newer request took over its slot key.
    pub fn settle(&mut self, ticket: Ticket) -> Vec<SlotKind> {
        let mut owned: Vec<SlotKind> = self
            .pending
            .iter()
            .filter(|&(_, &seq)| seq == ticket.seq)
            .map(|(&kind, _)| kind)
            .collect();
        for kind in &owned {
            self.pending.remove(kind);
        }
        if !owned.contains(&ticket.slot) {
            return Vec::new();
        }
        owned.sort();
        owned
    }

    pub fn is_pending(&self, slot: SlotKind) -> bool {
        self.pending.contains_key(&slot)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::Theme;
    use crate::core::highlight::check_consistency;
    use crate::test_support::{core_response, item, kit, loaded};

    #[test]
    fn test_same_item_is_noop() {
        let (_, equipped, _) = loaded();
        let current = equipped.get(SlotKind::ArmorHelmet).unwrap().clone();
        assert_eq!(plan_equip(&current, &equipped), Ok(None));
    }

    #[test]
    fn test_helmet_scenario() {
        let (inventory, mut equipped, mut highlights) = loaded();
        assert_eq!(highlights.get(SlotKind::ArmorHelmet), Some("H1"));

        let h2 = inventory.find(SlotKind::ArmorHelmet, "H2").unwrap().clone();
        let plan = plan_equip(&h2, &equipped).unwrap().unwrap();

        assert_eq!(plan.slot_key(), SlotKind::ArmorHelmet);
        assert_eq!(plan.payload.get(SlotKind::ArmorHelmet).unwrap().id, "H2");
        assert_eq!(plan.payload.core().unwrap().get_inv, Some(false));
        // Live state untouched until the response arrives
        assert_eq!(equipped.get(SlotKind::ArmorHelmet).unwrap().id, "H1");

        let updates = apply_equip(
            &plan,
            &ArmorCoreResponse::default(),
            &inventory,
            &mut equipped,
            &mut highlights,
        );
        assert_eq!(
            updates,
            vec![HighlightUpdate {
                slot: SlotKind::ArmorHelmet,
                item_id: "H2".into()
            }]
        );
        assert_eq!(highlights.get(SlotKind::ArmorHelmet), Some("H2"));
        assert_eq!(check_consistency(&equipped, &highlights), Ok(()));
    }

    #[test]
    fn test_core_change_cascades_to_theme_matches() {
        let (inventory, mut equipped, mut highlights) = loaded();
        let c2 = inventory.find(SlotKind::ArmorCore, "C2").unwrap().clone();
        let coating_before = equipped.get(SlotKind::ArmorCoating).unwrap().id.clone();

        let plan = plan_equip(&c2, &equipped).unwrap().unwrap();
        assert_eq!(plan.payload.core().unwrap().get_inv, Some(true));

        // Helmet, visor and glove match; the coating path has no catalog entry
        let response = core_response(Some("X"), Some("VX"), Some("GX"), Some("missing"));
        let updates = apply_equip(&plan, &response, &inventory, &mut equipped, &mut highlights);

        let slots: Vec<SlotKind> = updates.iter().map(|u| u.slot).collect();
        assert_eq!(
            slots,
            vec![
                SlotKind::ArmorCore,
                SlotKind::ArmorHelmet,
                SlotKind::ArmorVisor,
                SlotKind::ArmorGlove
            ]
        );
        assert_eq!(highlights.get(SlotKind::ArmorHelmet), Some("H9"));
        assert_eq!(equipped.get(SlotKind::ArmorHelmet).unwrap().id, "H9");
        assert_eq!(equipped.get(SlotKind::ArmorCoating).unwrap().id, coating_before);
        assert_eq!(check_consistency(&equipped, &highlights), Ok(()));
    }

    #[test]
    fn test_core_change_without_themes_only_updates_core() {
        let (inventory, mut equipped, mut highlights) = loaded();
        let c2 = inventory.find(SlotKind::ArmorCore, "C2").unwrap().clone();
        let plan = plan_equip(&c2, &equipped).unwrap().unwrap();

        let updates = apply_equip(
            &plan,
            &ArmorCoreResponse::default(),
            &inventory,
            &mut equipped,
            &mut highlights,
        );
        assert_eq!(updates.len(), 1);
        assert_eq!(equipped.core().unwrap().id, "C2");
        assert_eq!(equipped.core().unwrap().get_inv, None);
    }

    #[test]
    fn test_only_first_theme_is_used() {
        let (inventory, mut equipped, mut highlights) = loaded();
        let c2 = inventory.find(SlotKind::ArmorCore, "C2").unwrap().clone();
        let plan = plan_equip(&c2, &equipped).unwrap().unwrap();

        let mut response = core_response(None, None, None, None);
        response.themes.push(Theme::from_paths(&[("HelmetPath", "X")]));
        let updates = apply_equip(&plan, &response, &inventory, &mut equipped, &mut highlights);
        assert_eq!(updates.len(), 1);
    }

    #[test]
    fn test_incompatible_item_rejected() {
        let (inventory, equipped, _) = loaded();
        let h9 = inventory.find(SlotKind::ArmorHelmet, "H9").unwrap().clone();
        assert_eq!(
            plan_equip(&h9, &equipped),
            Err(PlanError::Incompatible {
                item_id: "H9".into(),
                core_id: "C1".into()
            })
        );
    }

    #[test]
    fn test_non_core_without_core_fails() {
        let equipped = CurrentlyEquipped::default();
        let helmet = item("H1", SlotKind::ArmorHelmet);
        assert_eq!(plan_equip(&helmet, &equipped), Err(PlanError::NoCore));
    }

    #[test]
    fn test_kit_equip_highlights_every_slot() {
        let (inventory, mut equipped, mut highlights) = loaded();
        let h2 = inventory.find(SlotKind::ArmorHelmet, "H2").unwrap().clone();
        let custom = kit("Mine", None, vec![item("C1", SlotKind::ArmorCore), h2]);

        let plan = plan_kit_equip(&custom, &equipped).unwrap().unwrap();
        assert_eq!(plan.slot_key(), SlotKind::ArmorKit);

        let updates = apply_equip(
            &plan,
            &ArmorCoreResponse::default(),
            &inventory,
            &mut equipped,
            &mut highlights,
        );
        assert_eq!(updates[0].slot, SlotKind::ArmorCore);
        assert_eq!(highlights.get(SlotKind::ArmorHelmet), Some("H2"));
        assert_eq!(check_consistency(&equipped, &highlights), Ok(()));

        // Equipping it again is a no-op
        assert_eq!(plan_kit_equip(&custom, &equipped), Ok(None));
    }

    #[test]
    fn test_in_flight_supersedes_same_slot() {
        let mut in_flight = InFlight::default();
        let first = in_flight.issue(SlotKind::ArmorHelmet, &[]);
        let other = in_flight.issue(SlotKind::ArmorVisor, &[]);
        let second = in_flight.issue(SlotKind::ArmorHelmet, &[]);

        assert!(in_flight.settle(first).is_empty());
        assert!(in_flight.is_pending(SlotKind::ArmorHelmet));
        assert_eq!(in_flight.settle(second), vec![SlotKind::ArmorHelmet]);
        assert_eq!(in_flight.settle(other), vec![SlotKind::ArmorVisor]);
        assert!(in_flight.is_empty());
    }

    #[test]
    fn test_later_item_takes_slot_from_pending_kit() {
        let (inventory, mut equipped, mut highlights) = loaded();
        let h2 = inventory.find(SlotKind::ArmorHelmet, "H2").unwrap().clone();
        let v9 = item("V9", SlotKind::ArmorVisor);
        let custom = kit("Mine", None, vec![h2, v9]);
        let kit_plan = plan_kit_equip(&custom, &equipped).unwrap().unwrap();
        assert_eq!(
            kit_plan.claimed_slots(),
            vec![SlotKind::ArmorKit, SlotKind::ArmorHelmet, SlotKind::ArmorVisor]
        );

        let mut in_flight = InFlight::default();
        let kit_ticket = in_flight.issue(kit_plan.slot_key(), &kit_plan.claimed_slots());
        let h3 = inventory.find(SlotKind::ArmorHelmet, "H3").unwrap().clone();
        let h3_plan = plan_equip(&h3, &equipped).unwrap().unwrap();
        let h3_ticket = in_flight.issue(h3_plan.slot_key(), &h3_plan.claimed_slots());

        // The helmet click lands first, the kit arrives late
        assert_eq!(in_flight.settle(h3_ticket), vec![SlotKind::ArmorHelmet]);
        apply_equip(&h3_plan, &ArmorCoreResponse::default(), &inventory, &mut equipped, &mut highlights);

        let owned = in_flight.settle(kit_ticket);
        assert_eq!(owned, vec![SlotKind::ArmorVisor, SlotKind::ArmorKit]);
        let mut late = kit_plan.clone();
        late.retain_slots(&owned);
        apply_equip(&late, &ArmorCoreResponse::default(), &inventory, &mut equipped, &mut highlights);

        assert_eq!(equipped.get(SlotKind::ArmorHelmet).unwrap().id, "H3");
        assert_eq!(equipped.get(SlotKind::ArmorVisor).unwrap().id, "V9");
        assert_eq!(check_consistency(&equipped, &highlights), Ok(()));
        assert!(in_flight.is_empty());
    }

    #[test]
    fn test_kit_superseded_by_newer_kit_owns_nothing() {
        let mut in_flight = InFlight::default();
        let first = in_flight.issue(SlotKind::ArmorKit, &[SlotKind::ArmorHelmet]);
        let second = in_flight.issue(SlotKind::ArmorKit, &[SlotKind::ArmorVisor]);

        // The helmet claim is still first's, but its kit key was taken over
        assert!(in_flight.settle(first).is_empty());
        assert!(!in_flight.is_pending(SlotKind::ArmorHelmet));
        assert_eq!(
            in_flight.settle(second),
            vec![SlotKind::ArmorVisor, SlotKind::ArmorKit]
        );
    }
}
