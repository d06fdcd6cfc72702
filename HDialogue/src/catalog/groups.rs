//! Script keys holding dialogue sets, per entity kind

use super::types::EntityKind;

/// A script key and the name its sets are shown under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryGroup {
    pub source_key: &'static str,
    pub name: &'static str,
}

const fn group(source_key: &'static str, name: &'static str) -> CategoryGroup {
    CategoryGroup { source_key, name }
}

const NPC_GROUPS: &[CategoryGroup] = &[
    group("InteractTextLineSets", "Interacts"),
    group("RepeatableTextLineSets", "Repeatables"),
    group("GiftTextLineSets", "Gifts"),
];

const ENEMY_GROUPS: &[CategoryGroup] = &[
    group("BossPresentationIntroTextLineSets", "Intros"),
    group("BossPresentationTextLineSets", "Basic Conversations"),
    group("BossPresentationPriorityIntroTextLineSets", "Priorities"),
    group("BossPresentationSuperPriorityIntroTextLineSets", "Super Priorities"),
    group("BossPresentationRepeatableTextLineSets", "Repeatables"),
];

const LOOT_GROUPS: &[CategoryGroup] = &[
    group("PickupTextLineSets", "Pickups"),
    group("DuoPickupTextLineSets", "Duos"),
    group("BoughtTextLines", "Bought"),
    group("GiftTextLineSets", "Gifts"),
    group("PriorityPickupTextLineSets", "Priorities"),
    group("SuperPriorityPickupTextLineSets", "Super Priorities"),
    group("RejectionTextLines", "Rejections"),
    group("MakeUpTextLines", "Makeups"),
];

/// Category groups for a kind, in display order.
#[must_use]
pub fn groups(kind: EntityKind) -> &'static [CategoryGroup] {
    match kind {
        EntityKind::Npc => NPC_GROUPS,
        EntityKind::Enemy => ENEMY_GROUPS,
        EntityKind::Loot => LOOT_GROUPS,
    }
}

/// Whether `key` holds dialogue sets for any kind.
#[must_use]
pub fn is_group_key(key: &str) -> bool {
    EntityKind::ALL
        .iter()
        .any(|&kind| groups(kind).iter().any(|g| g.source_key == key))
}
