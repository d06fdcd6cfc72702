//! Typed catalog structures

use std::fmt;
use std::path::PathBuf;

/// The three script sources a dialogue owner can come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Npc,
    Enemy,
    Loot,
}

impl EntityKind {
    pub const ALL: [Self; 3] = [Self::Npc, Self::Enemy, Self::Loot];

    /// Singular label used in messages ("NPC", "Enemy", "Loot")
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Npc => "NPC",
            Self::Enemy => "Enemy",
            Self::Loot => "Loot",
        }
    }

    /// Heading used in listings ("NPCs", "Enemies", "Loot")
    #[must_use]
    pub fn plural(self) -> &'static str {
        match self {
            Self::Npc => "NPCs",
            Self::Enemy => "Enemies",
            Self::Loot => "Loot",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One voiced (or silent) line.
#[derive(Debug, Clone, PartialEq)]
pub struct Cue {
    /// Audio identifier, empty for a line with no audio
    pub audio_id: String,
    /// Who speaks the line
    pub speaker: String,
    /// Subtitle text; absent for response lines after a portrait closes
    pub text: Option<String>,
    /// Resolved clip on disk
    pub audio_path: Option<PathBuf>,
    /// Seconds to wait before the line
    pub delay: f64,
    /// Audio identifier of a sound played alongside the line
    pub start_sound: Option<String>,
    /// Player choice that leads to this line
    pub choice: Option<String>,
}

impl Cue {
    #[must_use]
    pub fn has_audio(&self) -> bool {
        !self.audio_id.is_empty()
    }

    /// One-line description: id plus delay, start sound and choice notes.
    #[must_use]
    pub fn label(&self) -> String {
        let mut parts = Vec::with_capacity(4);
        if self.has_audio() {
            parts.push(self.audio_id.clone());
        } else {
            parts.push("(no audio)".to_string());
        }
        if self.delay > 0.0 {
            parts.push(format!("({:.1}s delay)", self.delay));
        }
        if let Some(sound) = &self.start_sound {
            parts.push(format!("(StartSound: {sound})"));
        }
        if let Some(choice) = &self.choice {
            parts.push(format!("(choice: {choice})"));
        }
        parts.join(" ")
    }
}

/// A named, ordered conversation or barks group.
#[derive(Debug, Clone, PartialEq)]
pub struct DialogueSet {
    pub id: String,
    pub cues: Vec<Cue>,
    /// Pool the set was taken from when it was defined by reference
    pub pool: Option<String>,
}

impl DialogueSet {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }
}

/// Dialogue sets an entity keeps under one script key.
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    /// Display name ("Pickups", "Gifts", ...)
    pub name: String,
    /// Script key the sets were read from (`PickupTextLineSets`, ...)
    pub source_key: String,
    pub sets: Vec<DialogueSet>,
}

impl Category {
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&DialogueSet> {
        self.sets.iter().find(|s| s.id == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.sets.iter().map(|s| s.id.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

/// A character, boss or boon giver that owns dialogue.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub kind: EntityKind,
    /// Script identifier (`NPC_Hermes_01`, `ZeusUpgrade`)
    pub id: String,
    pub display_name: String,
    /// Non-empty categories in display order
    pub categories: Vec<Category>,
}

impl Entity {
    /// Category by display name or script key.
    #[must_use]
    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories
            .iter()
            .find(|c| c.name == name || c.source_key == name)
    }

    /// First category (in display order) containing `id`.
    #[must_use]
    pub fn find_dialogue_set(&self, id: &str) -> Option<(&Category, &DialogueSet)> {
        self.categories
            .iter()
            .find_map(|c| c.get(id).map(|s| (c, s)))
    }

    /// Every category containing `id`.
    pub fn categories_containing<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Category> {
        self.categories.iter().filter(move |c| c.get(id).is_some())
    }

    /// All dialogue sets, category by category.
    pub fn dialogue_sets(&self) -> impl Iterator<Item = (&Category, &DialogueSet)> {
        self.categories
            .iter()
            .flat_map(|c| c.sets.iter().map(move |s| (c, s)))
    }

    #[must_use]
    pub fn set_count(&self) -> usize {
        self.categories.iter().map(Category::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cue(id: &str) -> Cue {
        Cue {
            audio_id: id.to_string(),
            speaker: String::new(),
            text: None,
            audio_path: None,
            delay: 0.0,
            start_sound: None,
            choice: None,
        }
    }

    #[test]
    fn test_cue_label() {
        assert_eq!(cue("").label(), "(no audio)");

        let mut c = cue("Orpheus_0120");
        c.delay = 1.5;
        c.start_sound = Some("CerberusWhine".into());
        c.choice = Some("Choice_Song1".into());
        assert_eq!(
            c.label(),
            "Orpheus_0120 (1.5s delay) (StartSound: CerberusWhine) (choice: Choice_Song1)"
        );
    }

    #[test]
    fn test_entity_lookups() {
        let set = |id: &str| DialogueSet {
            id: id.to_string(),
            cues: vec![cue("Hermes_0010")],
            pool: None,
        };
        let entity = Entity {
            kind: EntityKind::Loot,
            id: "HermesUpgrade".into(),
            display_name: "Hermes".into(),
            categories: vec![
                Category {
                    name: "Priorities".into(),
                    source_key: "PriorityPickupTextLineSets".into(),
                    sets: vec![set("HermesPostEnding01"), set("HermesAboutZeus")],
                },
                Category {
                    name: "Super Priorities".into(),
                    source_key: "SuperPriorityPickupTextLineSets".into(),
                    sets: vec![set("HermesPostEnding01")],
                },
            ],
        };

        assert!(entity.category("Priorities").is_some());
        assert!(entity.category("SuperPriorityPickupTextLineSets").is_some());
        assert!(entity.category("Pickups").is_none());

        let (category, _) = entity.find_dialogue_set("HermesPostEnding01").unwrap();
        assert_eq!(category.name, "Priorities");
        assert_eq!(entity.categories_containing("HermesPostEnding01").count(), 2);

        let ids: Vec<&str> = entity.dialogue_sets().map(|(_, s)| s.id.as_str()).collect();
        assert_eq!(ids, vec!["HermesPostEnding01", "HermesAboutZeus", "HermesPostEnding01"]);
        assert_eq!(entity.set_count(), 3);
    }
}
