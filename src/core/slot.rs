//! # Slot Table
//!
//! Every equip position is a `SlotKind`. Everything the rest of the crate
//! needs to know about a slot (its `CurrentlyEquipped` key, its catalog row
//! in the inventory response, its theme path for core cascades, and how it
//! relates to the equipped core) lives in one static table.
//!
//! ```text
//! SlotKind ──► SlotSpec { equipped_key, row_key, theme_key, compat }
//! ```
//!
//! Adding a slot kind means adding a variant and a row to `SLOTS`.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SlotKind {
    ArmorCore,
    ArmorHelmet,
    ArmorVisor,
    ArmorGlove,
    ArmorCoating,
    ArmorLeftShoulderPad,
    ArmorRightShoulderPad,
    ArmorWristAttachment,
    ArmorHipAttachment,
    ArmorChestAttachment,
    ArmorKneePad,
    ArmorKit,
    ArmorFx,
    ArmorMythicFx,
}

/// How items in a slot relate to the equipped core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreCompat {
    /// The slot holds the core itself.
    Core,
    /// Item must belong to the equipped core unless flagged cross-core.
    CoreBound,
    /// Any item fits any core.
    Global,
}

/// Static description of one slot kind.
#[derive(Debug)]
pub struct SlotSpec {
    pub kind: SlotKind,
    /// Key inside a `CurrentlyEquipped` record.
    pub equipped_key: &'static str,
    /// Key of the catalog row in the `/spartan` response.
    pub row_key: &'static str,
    /// Key inside a core's default theme, for slots re-equipped on core change.
    pub theme_key: Option<&'static str>,
    pub compat: CoreCompat,
    /// Short label for display.
    pub label: &'static str,
}

pub const SLOTS: &[SlotSpec] = &[
    SlotSpec {
        kind: SlotKind::ArmorCore,
        equipped_key: "CurrentlyEquippedCore",
        row_key: "ArmoryRow",
        theme_key: None,
        compat: CoreCompat::Core,
        label: "Core",
    },
    SlotSpec {
        kind: SlotKind::ArmorHelmet,
        equipped_key: "CurrentlyEquippedHelmet",
        row_key: "ArmoryRowHelmets",
        theme_key: Some("HelmetPath"),
        compat: CoreCompat::CoreBound,
        label: "Helmet",
    },
    SlotSpec {
        kind: SlotKind::ArmorVisor,
        equipped_key: "CurrentlyEquippedVisor",
        row_key: "ArmoryRowVisors",
        theme_key: Some("VisorPath"),
        compat: CoreCompat::CoreBound,
        label: "Visor",
    },
    SlotSpec {
        kind: SlotKind::ArmorGlove,
        equipped_key: "CurrentlyEquippedGlove",
        row_key: "ArmoryRowGloves",
        theme_key: Some("GlovePath"),
        compat: CoreCompat::CoreBound,
        label: "Gloves",
    },
    SlotSpec {
        kind: SlotKind::ArmorCoating,
        equipped_key: "CurrentlyEquippedCoating",
        row_key: "ArmoryRowCoatings",
        theme_key: Some("CoatingPath"),
        compat: CoreCompat::CoreBound,
        label: "Coating",
    },
    SlotSpec {
        kind: SlotKind::ArmorLeftShoulderPad,
        equipped_key: "CurrentlyEquippedLeftShoulderPad",
        row_key: "ArmoryRowLeftShoulderPads",
        theme_key: None,
        compat: CoreCompat::CoreBound,
        label: "Left Shoulder",
    },
    SlotSpec {
        kind: SlotKind::ArmorRightShoulderPad,
        equipped_key: "CurrentlyEquippedRightShoulderPad",
        row_key: "ArmoryRowRightShoulderPads",
        theme_key: None,
        compat: CoreCompat::CoreBound,
        label: "Right Shoulder",
    },
    SlotSpec {
        kind: SlotKind::ArmorWristAttachment,
        equipped_key: "CurrentlyEquippedWristAttachment",
        row_key: "ArmoryRowWristAttachments",
        theme_key: None,
        compat: CoreCompat::CoreBound,
        label: "Wrist",
    },
    SlotSpec {
        kind: SlotKind::ArmorHipAttachment,
        equipped_key: "CurrentlyEquippedHipAttachment",
        row_key: "ArmoryRowHipAttachments",
        theme_key: None,
        compat: CoreCompat::CoreBound,
        label: "Hip",
    },
    SlotSpec {
        kind: SlotKind::ArmorChestAttachment,
        equipped_key: "CurrentlyEquippedChestAttachment",
        row_key: "ArmoryRowChestAttachments",
        theme_key: None,
        compat: CoreCompat::CoreBound,
        label: "Chest",
    },
    SlotSpec {
        kind: SlotKind::ArmorKneePad,
        equipped_key: "CurrentlyEquippedKneePad",
        row_key: "ArmoryRowKneePads",
        theme_key: None,
        compat: CoreCompat::CoreBound,
        label: "Knee Pads",
    },
    SlotSpec {
        kind: SlotKind::ArmorKit,
        equipped_key: "CurrentlyEquippedKit",
        row_key: "ArmoryRowKits",
        theme_key: None,
        compat: CoreCompat::Global,
        label: "Kit",
    },
    SlotSpec {
        kind: SlotKind::ArmorFx,
        equipped_key: "CurrentlyEquippedArmorFx",
        row_key: "ArmoryRowArmorFx",
        theme_key: None,
        compat: CoreCompat::Global,
        label: "Armor FX",
    },
    SlotSpec {
        kind: SlotKind::ArmorMythicFx,
        equipped_key: "CurrentlyEquippedArmorMythicFx",
        row_key: "ArmoryRowMythicFx",
        theme_key: None,
        compat: CoreCompat::Global,
        label: "Mythic FX",
    },
];

impl SlotKind {
    /// All slot kinds in table order (core first).
    pub fn all() -> impl Iterator<Item = SlotKind> {
        SLOTS.iter().map(|spec| spec.kind)
    }

    pub fn spec(self) -> &'static SlotSpec {
        // SLOTS is declared in enum order
        &SLOTS[self as usize]
    }

    /// The wire name, as it appears in an item's `Type` field.
    pub fn type_name(self) -> &'static str {
        match self {
            SlotKind::ArmorCore => "ArmorCore",
            SlotKind::ArmorHelmet => "ArmorHelmet",
            SlotKind::ArmorVisor => "ArmorVisor",
            SlotKind::ArmorGlove => "ArmorGlove",
            SlotKind::ArmorCoating => "ArmorCoating",
            SlotKind::ArmorLeftShoulderPad => "ArmorLeftShoulderPad",
            SlotKind::ArmorRightShoulderPad => "ArmorRightShoulderPad",
            SlotKind::ArmorWristAttachment => "ArmorWristAttachment",
            SlotKind::ArmorHipAttachment => "ArmorHipAttachment",
            SlotKind::ArmorChestAttachment => "ArmorChestAttachment",
            SlotKind::ArmorKneePad => "ArmorKneePad",
            SlotKind::ArmorKit => "ArmorKit",
            SlotKind::ArmorFx => "ArmorFx",
            SlotKind::ArmorMythicFx => "ArmorMythicFx",
        }
    }

    pub fn from_equipped_key(key: &str) -> Option<SlotKind> {
        SLOTS
            .iter()
            .find(|spec| spec.equipped_key == key)
            .map(|spec| spec.kind)
    }

    /// Key used in the highlight map, e.g. `armorhelmetId`.
    pub fn highlight_key(self) -> String {
        format!("{}Id", self.type_name().to_lowercase())
    }

    pub fn is_core(self) -> bool {
        self.spec().compat == CoreCompat::Core
    }

    pub fn label(self) -> &'static str {
        self.spec().label
    }
}

impl fmt::Display for SlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}
