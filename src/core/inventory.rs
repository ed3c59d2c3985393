//! # Inventory
//!
//! The catalog rows for every slot kind plus the user's custom kits, as
//! consumed by the armory screen.
//!
//! Custom kits arrive from a separate endpoint and usually lack image data.
//! `merge_custom_kits` fills those images in from the catalog rows and
//! returns resolved copies; the fetched kits are never mutated in place.

use log::debug;
use std::collections::BTreeMap;
use std::fmt;

use super::highlight::HighlightState;
use super::item::{CurrentlyEquipped, CustomKit, EquippableItem};
use super::slot::SlotKind;

#[derive(Debug)]
pub enum InventoryError {
    /// Neither the equipped snapshot nor the core row names a core.
    MissingCore,
}

impl fmt::Display for InventoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InventoryError::MissingCore => write!(f, "inventory has no equipped core"),
        }
    }
}

impl std::error::Error for InventoryError {}

/// An entry of the kit row: either a catalog kit or a resolved custom kit.
#[derive(Debug, Clone, Copy)]
pub enum KitEntry<'a> {
    Catalog(&'a EquippableItem),
    Custom(usize, &'a CustomKit),
}

#[derive(Debug, Clone, Default)]
pub struct Inventory {
    rows: BTreeMap<SlotKind, Vec<EquippableItem>>,
    custom_kits: Vec<CustomKit>,
}

impl Inventory {
    pub fn new(rows: BTreeMap<SlotKind, Vec<EquippableItem>>) -> Self {
        Self {
            rows,
            custom_kits: Vec::new(),
        }
    }

    /// Resolves kit images against the catalog and appends the kits to the kit row.
    pub fn with_custom_kits(mut self, kits: &[CustomKit]) -> Self {
        self.custom_kits = merge_custom_kits(&self, kits);
        self
    }

    pub fn row(&self, kind: SlotKind) -> &[EquippableItem] {
        self.rows.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All rows in table order, including empty ones.
    pub fn rows(&self) -> impl Iterator<Item = (SlotKind, &[EquippableItem])> {
        SlotKind::all().map(|kind| (kind, self.row(kind)))
    }

    pub fn find(&self, kind: SlotKind, id: &str) -> Option<&EquippableItem> {
        self.row(kind).iter().find(|item| item.id == id)
    }

    pub fn find_by_core_path(&self, kind: SlotKind, path: &str) -> Option<&EquippableItem> {
        self.row(kind)
            .iter()
            .find(|item| item.core_path.as_deref() == Some(path))
    }

    /// The entries of a row that may sit on `core`.
    pub fn compatible_row(&self, kind: SlotKind, core: &EquippableItem) -> Vec<&EquippableItem> {
        self.row(kind)
            .iter()
            .filter(|item| item.fits_core(core))
            .collect()
    }

    pub fn custom_kits(&self) -> &[CustomKit] {
        &self.custom_kits
    }

    /// Catalog kits followed by custom kits.
    pub fn kit_row(&self) -> impl Iterator<Item = KitEntry<'_>> {
        self.row(SlotKind::ArmorKit)
            .iter()
            .map(KitEntry::Catalog)
            .chain(
                self.custom_kits
                    .iter()
                    .enumerate()
                    .map(|(i, kit)| KitEntry::Custom(i, kit)),
            )
    }

    /// Builds the starting loadout for the armory screen.
    ///
    /// Highlights are seeded from the rows' `isHighlighted` flags, then every
    /// occupied slot of the snapshot overrides its row's flag. A snapshot
    /// without a core borrows the highlighted entry of the core row.
    pub fn initial_loadout(
        &self,
        mut equipped: CurrentlyEquipped,
    ) -> Result<(CurrentlyEquipped, HighlightState), InventoryError> {
        let mut highlights = HighlightState::seed(self.rows());

        if equipped.core().is_none() {
            let flagged = self
                .row(SlotKind::ArmorCore)
                .iter()
                .find(|item| item.is_highlighted)
                .cloned()
                .ok_or(InventoryError::MissingCore)?;
            debug!("Snapshot had no core, using highlighted core {}", flagged.id);
            equipped.set(flagged);
        }

        for (kind, item) in equipped.iter() {
            if highlights.get(kind) != Some(item.id.as_str()) {
                debug!("Highlighting equipped {} {} over the row flag", kind, item.id);
                highlights.set(kind, &item.id);
            }
        }

        Ok((equipped, highlights))
    }
}

/// Fills missing kit images from the catalog rows.
///
/// Each kit item without an `Image` is looked up by `(Type, id)`. When found,
/// the row's image is copied onto the item, and onto the kit itself if the
/// item's type is the kit's `ImageType`. Unresolved items stay imageless.
pub fn merge_custom_kits(inventory: &Inventory, kits: &[CustomKit]) -> Vec<CustomKit> {
    let mut resolved = Vec::with_capacity(kits.len());

    for kit in kits {
        let image_slot = kit.image_slot();
        let mut merged = kit.clone();
        let mut loadout = CurrentlyEquipped::default();

        for (kind, kit_item) in kit.loadout.iter() {
            let mut kit_item = kit_item.clone();
            if kit_item.image.is_none()
                && let Some(found) = inventory.find(kind, &kit_item.id)
                && let Some(image) = &found.image
            {
                kit_item.image = Some(image.clone());
                if image_slot == Some(kind) {
                    merged.image = Some(image.clone());
                }
            } else if kit_item.image.is_none() {
                debug!(
                    "Kit '{}': no catalog image for {} {}",
                    kit.name, kind, kit_item.id
                );
            }
            loadout.set(kit_item);
        }

        merged.loadout = loadout;
        resolved.push(merged);
    }

    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::highlight::check_consistency;
    use crate::test_support::{item, item_with_image, kit, sample_inventory};

    #[test]
    fn test_kit_merge_copies_catalog_image() {
        let mut rows = BTreeMap::new();
        rows.insert(
            SlotKind::ArmorHelmet,
            vec![item_with_image("H1", SlotKind::ArmorHelmet, "aGVsbWV0")],
        );
        let inventory = Inventory::new(rows);

        let kits = vec![kit(
            "Recon",
            Some("ArmorHelmet"),
            vec![item("C1", SlotKind::ArmorCore), item("H1", SlotKind::ArmorHelmet)],
        )];

        let merged = merge_custom_kits(&inventory, &kits);
        assert_eq!(merged[0].image.as_deref(), Some("aGVsbWV0"));
        assert_eq!(
            merged[0]
                .loadout
                .get(SlotKind::ArmorHelmet)
                .and_then(|i| i.image.as_deref()),
            Some("aGVsbWV0")
        );
        // Input untouched
        assert!(kits[0].image.is_none());
    }

    #[test]
    fn test_kit_merge_absent_item_leaves_image_unset() {
        let inventory = Inventory::new(BTreeMap::new());
        let kits = vec![kit(
            "Ghost",
            Some("ArmorHelmet"),
            vec![item("H404", SlotKind::ArmorHelmet)],
        )];

        let merged = merge_custom_kits(&inventory, &kits);
        assert_eq!(merged.len(), 1);
        assert!(merged[0].image.is_none());
        assert!(
            merged[0]
                .loadout
                .get(SlotKind::ArmorHelmet)
                .unwrap()
                .image
                .is_none()
        );
    }

    #[test]
    fn test_kit_image_only_from_image_type_slot() {
        let mut rows = BTreeMap::new();
        rows.insert(
            SlotKind::ArmorVisor,
            vec![item_with_image("V1", SlotKind::ArmorVisor, "dmlzb3I=")],
        );
        let inventory = Inventory::new(rows);
        let kits = vec![kit(
            "Visor only",
            Some("ArmorHelmet"),
            vec![item("V1", SlotKind::ArmorVisor)],
        )];

        let merged = merge_custom_kits(&inventory, &kits);
        assert!(merged[0].image.is_none());
        assert!(merged[0].loadout.get(SlotKind::ArmorVisor).unwrap().image.is_some());
    }

    #[test]
    fn test_kit_row_appends_custom_kits() {
        let inventory = sample_inventory().with_custom_kits(&[kit(
            "Mine",
            None,
            vec![item("C1", SlotKind::ArmorCore)],
        )]);

        let entries: Vec<KitEntry> = inventory.kit_row().collect();
        assert!(matches!(entries.last(), Some(KitEntry::Custom(0, k)) if k.name == "Mine"));
        assert_eq!(entries.len(), inventory.row(SlotKind::ArmorKit).len() + 1);
    }

    #[test]
    fn test_initial_loadout_falls_back_to_highlighted_core() {
        let inventory = sample_inventory();
        let (equipped, highlights) = inventory
            .initial_loadout(CurrentlyEquipped::default())
            .unwrap();
        assert_eq!(equipped.core().map(|c| c.id.as_str()), Some("C1"));
        assert_eq!(highlights.get(SlotKind::ArmorCore), Some("C1"));
    }

    #[test]
    fn test_equipped_item_without_flagged_row_is_highlighted() {
        let inventory = sample_inventory();
        let mut snapshot = CurrentlyEquipped::default();
        snapshot.set(inventory.find(SlotKind::ArmorCore, "C1").unwrap().clone());
        // Flagged entry is H1, but the snapshot says H3
        snapshot.set(inventory.find(SlotKind::ArmorHelmet, "H3").unwrap().clone());
        // No ArmorFx row at all
        snapshot.set(item("FX1", SlotKind::ArmorFx));

        let (equipped, highlights) = inventory.initial_loadout(snapshot).unwrap();
        assert_eq!(highlights.get(SlotKind::ArmorHelmet), Some("H3"));
        assert_eq!(highlights.get(SlotKind::ArmorFx), Some("FX1"));
        assert_eq!(check_consistency(&equipped, &highlights), Ok(()));
    }

    #[test]
    fn test_initial_loadout_without_any_core_fails() {
        let inventory = Inventory::new(BTreeMap::new());
        assert!(matches!(
            inventory.initial_loadout(CurrentlyEquipped::default()),
            Err(InventoryError::MissingCore)
        ));
    }

    #[test]
    fn test_compatible_row_filters_by_core() {
        let inventory = sample_inventory();
        let core = inventory.find(SlotKind::ArmorCore, "C1").unwrap().clone();
        let helmets: Vec<&str> = inventory
            .compatible_row(SlotKind::ArmorHelmet, &core)
            .iter()
            .map(|i| i.id.as_str())
            .collect();
        assert!(helmets.contains(&"H1"));
        assert!(!helmets.contains(&"H9"));
    }
}
