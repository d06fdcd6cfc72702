//! Builds the typed catalog from parsed script tables
//!
//! Each source's root table maps entity ids to entity tables. Within an
//! entity, every known category key maps dialogue set ids either to an
//! inline table of cues or to the name of a pool defined elsewhere. Pools
//! are resolved in one pass against every inline set and top-level table
//! of the same build.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::diagnostic::{Diagnostic, DiagnosticKind};
use super::groups::{self, CategoryGroup};
use super::types::{Category, Cue, DialogueSet, Entity, EntityKind};
use super::Catalog;
use crate::audio::OggLibrary;
use crate::script::{LuaTable, LuaValue, RawTable};

/// Prefix of script cue paths naming a voice clip.
const VO_PREFIX: &str = "/VO/";

/// Start sounds that are plain effects rather than voice clips.
const IGNORED_START_SOUND: &str = "/Leftovers/World Sounds/MapZoomInShort";
const SFX_PREFIX: &str = "/SFX/";

/// Top-level names of the entity tables in each source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogRoots {
    pub npc: String,
    pub enemy: String,
    pub loot: String,
}

impl Default for CatalogRoots {
    fn default() -> Self {
        Self {
            npc: "UnitSetData.NPCs".to_string(),
            enemy: "UnitSetData.Enemies".to_string(),
            loot: "LootData".to_string(),
        }
    }
}

/// A built catalog plus everything worth reporting about the build.
#[derive(Debug)]
pub struct BuildOutput {
    pub catalog: Catalog,
    pub diagnostics: Vec<Diagnostic>,
}

/// How a dialogue set is defined in the script.
#[derive(Debug, Clone, Copy)]
pub enum SetSource<'a> {
    /// Cues written in place
    Inline(&'a LuaTable),
    /// Name of a pool defined elsewhere
    Reference(&'a str),
}

impl<'a> SetSource<'a> {
    /// Classify a set entry. Values that are neither tables nor names are not
    /// dialogue sets.
    #[must_use]
    pub fn classify(value: &'a LuaValue) -> Option<Self> {
        match value {
            LuaValue::Table(table) => Some(Self::Inline(table)),
            LuaValue::Str(name) | LuaValue::Name(name) => Some(Self::Reference(name)),
            _ => None,
        }
    }
}

/// Build a catalog with the default roots.
pub fn build(
    raw_npc: &RawTable,
    raw_enemy: &RawTable,
    raw_loot: &RawTable,
    audio: &OggLibrary,
) -> BuildOutput {
    CatalogBuilder::new(audio).build(raw_npc, raw_enemy, raw_loot)
}

/// Catalog construction state.
pub struct CatalogBuilder<'a> {
    audio: &'a OggLibrary,
    roots: CatalogRoots,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> CatalogBuilder<'a> {
    pub fn new(audio: &'a OggLibrary) -> Self {
        Self {
            audio,
            roots: CatalogRoots::default(),
            diagnostics: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_roots(mut self, roots: CatalogRoots) -> Self {
        self.roots = roots;
        self
    }

    /// Build the catalog. Malformed entries are reported, never fatal.
    pub fn build(
        mut self,
        raw_npc: &RawTable,
        raw_enemy: &RawTable,
        raw_loot: &RawTable,
    ) -> BuildOutput {
        let start = std::time::Instant::now();
        let empty = LuaTable::new();
        let npc_root = root_table(raw_npc, &self.roots.npc).unwrap_or(&empty);
        let enemy_root = root_table(raw_enemy, &self.roots.enemy).unwrap_or(&empty);
        let loot_root = root_table(raw_loot, &self.roots.loot).unwrap_or(&empty);

        let pools = build_pool_map(
            &[raw_npc, raw_enemy, raw_loot],
            &[npc_root, enemy_root, loot_root],
        );

        // The enemy data carries one NPC-style unit and the NPC data carries
        // boss-style units, so each kind reads both unit tables.
        let npcs = self.build_kind(EntityKind::Npc, &[npc_root, enemy_root], &pools);
        let enemies = self.build_kind(EntityKind::Enemy, &[enemy_root, npc_root], &pools);
        let loot = self.build_kind(EntityKind::Loot, &[loot_root], &pools);

        let catalog = Catalog::from_parts(npcs, enemies, loot);
        let counts = catalog.counts();
        tracing::info!(
            "Built catalog in {:.2}s: {} NPCs, {} enemies, {} loot, {} dialogue sets, {} cues \
             ({} diagnostics)",
            start.elapsed().as_secs_f64(),
            counts.npcs,
            counts.enemies,
            counts.loot,
            counts.dialogue_sets,
            counts.cues,
            self.diagnostics.len()
        );

        BuildOutput {
            catalog,
            diagnostics: self.diagnostics,
        }
    }

    fn report(&mut self, kind: DiagnosticKind, context: &str, message: String) {
        // Missing clips are common (partial extractions) and reported on play
        if kind == DiagnosticKind::MissingAudio {
            tracing::debug!("{}: {}", context, message);
        } else {
            tracing::warn!("{}: {}", context, message);
        }
        self.diagnostics.push(Diagnostic::new(kind, context, message));
    }

    fn build_kind(
        &mut self,
        kind: EntityKind,
        sources: &[&LuaTable],
        pools: &HashMap<String, &LuaTable>,
    ) -> BTreeMap<String, Entity> {
        let mut entities = BTreeMap::new();
        for source in sources {
            for (id, value) in source.named() {
                let Some(table) = value.as_table() else {
                    continue;
                };
                if let Some(entity) = self.build_entity(kind, id, table, pools) {
                    // Later sources replace earlier ones
                    entities.insert(id.to_string(), entity);
                }
            }
        }
        entities
    }

    fn build_entity(
        &mut self,
        kind: EntityKind,
        id: &str,
        table: &LuaTable,
        pools: &HashMap<String, &LuaTable>,
    ) -> Option<Entity> {
        let mut categories = Vec::new();
        let mut seen_ids: HashSet<String> = HashSet::new();

        for group in groups::groups(kind) {
            let Some(sets_table) = table.get(group.source_key) else {
                continue;
            };
            let Some(sets_table) = sets_table.as_table() else {
                tracing::debug!(
                    "{} {}: {} is a {}, not a table",
                    kind,
                    id,
                    group.source_key,
                    sets_table.type_name()
                );
                continue;
            };
            let category = self.build_category(kind, id, group, sets_table, pools);
            if category.is_empty() {
                continue;
            }
            for set in &category.sets {
                if !seen_ids.insert(set.id.clone()) {
                    self.report(
                        DiagnosticKind::DuplicateDialogue,
                        &format!("{kind} {id}"),
                        format!("{} found in more than one category", set.id),
                    );
                }
            }
            categories.push(category);
        }

        if categories.is_empty() {
            return None;
        }
        Some(Entity {
            kind,
            id: id.to_string(),
            display_name: display_name(kind, id),
            categories,
        })
    }

    fn build_category(
        &mut self,
        kind: EntityKind,
        entity_id: &str,
        group: &CategoryGroup,
        sets_table: &LuaTable,
        pools: &HashMap<String, &LuaTable>,
    ) -> Category {
        let mut sets = Vec::new();

        for (set_id, value) in sets_table.named() {
            let context = format!("{kind} {entity_id} / {} / {set_id}", group.name);
            let Some(source) = SetSource::classify(value) else {
                tracing::debug!("{}: skipping {} entry", context, value.type_name());
                continue;
            };

            match source {
                SetSource::Inline(table) => {
                    let cues = self.extract_cues(table, &context);
                    if cues.is_empty() {
                        tracing::debug!("{}: no cues", context);
                        continue;
                    }
                    sets.push(DialogueSet {
                        id: set_id.to_string(),
                        cues,
                        pool: None,
                    });
                }
                SetSource::Reference(name) => {
                    let cues = match resolve_pool(pools, name) {
                        Some(pool) => {
                            let cues = self.extract_cues(pool, &context);
                            if cues.is_empty() {
                                self.report(
                                    DiagnosticKind::EmptyReference,
                                    &context,
                                    format!("dialogue pool {name} has no cues"),
                                );
                            }
                            cues
                        }
                        None => {
                            self.report(
                                DiagnosticKind::UnresolvedReference,
                                &context,
                                format!("no dialogue pool named {name}"),
                            );
                            Vec::new()
                        }
                    };
                    sets.push(DialogueSet {
                        id: set_id.to_string(),
                        cues,
                        pool: Some(name.to_string()),
                    });
                }
            }
        }

        Category {
            name: group.name.to_string(),
            source_key: group.source_key.to_string(),
            sets,
        }
    }

    /// Cues of one set table, in authored order. The first cue never waits.
    fn extract_cues(&mut self, table: &LuaTable, context: &str) -> Vec<Cue> {
        let mut cues = Vec::new();

        // A plain list of entries has no named fields and reads with no
        // initial delay or choice.
        let mut initial_delay = table.get_f64("PreLineWait").unwrap_or(0.0);
        let choice = table.get_str("ChoiceText");

        for entry in table.positional().filter_map(LuaValue::as_table) {
            if let Some(choices) = entry.get_table("Choices") {
                for option in choices.positional().filter_map(LuaValue::as_table) {
                    cues.extend(self.extract_cues(option, context));
                }
            } else if let Some(cue) = self.cue_from_entry(entry, initial_delay, choice, context) {
                cues.push(cue);
                initial_delay = 0.0;
            }
        }

        if let Some(end_cue) = table.get("EndCue") {
            match end_cue.as_str().and_then(voice_id) {
                Some(id) => {
                    let delay = table.get_f64("EndWait").unwrap_or(0.0);
                    let cue = self.make_cue(id, None, None, delay, None, choice, context);
                    cues.push(cue);
                }
                None => self.report(
                    DiagnosticKind::MalformedCue,
                    context,
                    format!("EndCue is not a voice path: {}", describe(end_cue)),
                ),
            }
        }

        if let Some(end_lines) = table.get_table("EndVoiceLines") {
            if end_lines.is_sequence() {
                // Either a list of cue entries or a list of line sets
                for entry in end_lines.positional().filter_map(LuaValue::as_table) {
                    if entry.get("Cue").is_some() {
                        if let Some(cue) = self.cue_from_entry(entry, 0.0, None, context) {
                            cues.push(cue);
                        }
                    } else {
                        cues.extend(self.extract_cues(entry, context));
                    }
                }
            } else {
                cues.extend(self.extract_cues(end_lines, context));
            }
        }

        if let Some(first) = cues.first_mut() {
            first.delay = 0.0;
        }
        cues
    }

    /// A cue from one entry table. Entries without a `Cue` field are not
    /// lines and yield `None` silently.
    fn cue_from_entry(
        &mut self,
        entry: &LuaTable,
        extra_delay: f64,
        choice: Option<&str>,
        context: &str,
    ) -> Option<Cue> {
        let raw_cue = entry.get("Cue")?;
        let id = match raw_cue
            .as_str()
            .and_then(|path| if path.is_empty() { Some("") } else { voice_id(path) })
        {
            Some(id) => id,
            None => {
                self.report(
                    DiagnosticKind::MalformedCue,
                    context,
                    format!("Cue is not a voice path: {}", describe(raw_cue)),
                );
                return None;
            }
        };

        let start_sound = match entry.get("StartSound") {
            None => None,
            Some(value) => match value.as_str() {
                Some(path) if voice_id(path).is_some() => voice_id(path),
                Some(path) if path.starts_with(SFX_PREFIX) || path == IGNORED_START_SOUND => None,
                _ => {
                    self.report(
                        DiagnosticKind::MalformedCue,
                        context,
                        format!("StartSound is not a voice path: {}", describe(value)),
                    );
                    None
                }
            },
        };

        let delay = entry.get_f64("PreLineWait").unwrap_or(0.0) + extra_delay;
        Some(self.make_cue(
            id,
            entry.get_str("Speaker"),
            entry.get_str("Text"),
            delay,
            start_sound,
            choice,
            context,
        ))
    }

    fn make_cue(
        &mut self,
        id: &str,
        speaker: Option<&str>,
        text: Option<&str>,
        delay: f64,
        start_sound: Option<&str>,
        choice: Option<&str>,
        context: &str,
    ) -> Cue {
        let audio_path = if id.is_empty() {
            None
        } else {
            let path = self.audio.lookup(id).map(std::path::Path::to_path_buf);
            if path.is_none() {
                self.report(
                    DiagnosticKind::MissingAudio,
                    context,
                    format!("no audio file for {id}"),
                );
            }
            path
        };

        Cue {
            audio_id: id.to_string(),
            speaker: speaker.map_or_else(|| speaker_from_id(id).to_string(), str::to_string),
            text: text.map(str::to_string),
            audio_path,
            delay,
            start_sound: start_sound.map(str::to_string),
            choice: choice.map(str::to_string),
        }
    }
}

/// Name → pool table map: top-level tables by dotted name, then every inline
/// set by id (first definition wins).
fn build_pool_map<'a>(
    sources: &[&'a RawTable],
    roots: &[&'a LuaTable],
) -> HashMap<String, &'a LuaTable> {
    let mut pools = HashMap::new();

    for source in sources {
        for (name, value) in source.named() {
            if let Some(table) = value.as_table() {
                pools.entry(name.to_string()).or_insert(table);
            }
        }
    }

    for root in roots {
        for (_, entity) in root.iter() {
            let Some(entity) = entity.as_table() else {
                continue;
            };
            for (key, sets) in entity.named() {
                if !groups::is_group_key(key) {
                    continue;
                }
                let Some(sets) = sets.as_table() else {
                    continue;
                };
                for (set_id, set) in sets.named() {
                    if let Some(table) = set.as_table() {
                        pools.entry(set_id.to_string()).or_insert(table);
                    }
                }
            }
        }
    }

    pools
}

fn root_table<'t>(raw: &'t RawTable, name: &str) -> Option<&'t LuaTable> {
    let table = raw.get_table(name);
    if table.is_none() {
        tracing::debug!("Script data has no `{}` table", name);
    }
    table
}

/// Look a pool up by full name, falling back to the last dotted segment.
fn resolve_pool<'a>(pools: &HashMap<String, &'a LuaTable>, name: &str) -> Option<&'a LuaTable> {
    pools.get(name).copied().or_else(|| {
        name.rsplit_once('.')
            .and_then(|(_, last)| pools.get(last).copied())
    })
}

/// `/VO/Hermes_0010` → `Hermes_0010`
fn voice_id(path: &str) -> Option<&str> {
    path.strip_prefix(VO_PREFIX)
        .filter(|id| !id.is_empty() && !id.contains(char::is_whitespace))
}

/// Speaker implied by an audio id: everything before the last `_`.
fn speaker_from_id(id: &str) -> &str {
    id.rsplit_once('_').map_or(id, |(speaker, _)| speaker)
}

fn describe(value: &LuaValue) -> String {
    match value {
        LuaValue::Str(s) => format!("{s:?}"),
        LuaValue::Name(n) => n.clone(),
        other => other.type_name().to_string(),
    }
}

/// Human-readable entity name: `NPC_Hades_01` → `Hades`, `ZeusUpgrade` → `Zeus`.
#[must_use]
pub fn display_name(kind: EntityKind, id: &str) -> String {
    let mut name = id.strip_prefix("NPC_").unwrap_or(id);
    if let Some((head, tail)) = name.rsplit_once('_') {
        if !tail.is_empty() && tail.chars().all(|c| c.is_ascii_digit()) {
            name = head;
        }
    }
    if kind == EntityKind::Loot {
        if let Some(stripped) = name.strip_suffix("Upgrade").filter(|s| !s.is_empty()) {
            name = stripped;
        }
    }
    name.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::parse;
    use pretty_assertions::assert_eq;

    const NPC_DATA: &str = r#"
UnitSetData.NPCs =
{
    NPC_Hermes_01 =
    {
        InteractTextLineSets =
        {
            HermesFirstMeeting =
            {
                PlayOnce = true,
                PreLineWait = 0.5,
                { Cue = "/VO/Hermes_0001", Text = "Hey there!" },
                {
                    Cue = "/VO/ZagreusHome_0001",
                    Speaker = "CharProtag",
                    PreLineWait = 1.0,
                    Text = "Hermes.",
                },
                { Cue = "", Text = "(silence)" },
                EndCue = "/VO/Hermes_0002",
                EndWait = 0.25,
            },
            HermesNothingHere = { PlayOnce = true },
        },
        RepeatableTextLineSets =
        {
            HermesChat01 = { { Cue = "/VO/Hermes_0100" }, { Cue = "/VO/Hermes_0101" } },
        },
        GiftTextLineSets =
        {
            HermesGift01 = "GlobalVoiceLines.HermesGiftLines",
            HermesGift02 = GlobalVoiceLines.NoSuchPool,
        },
    },
    NPC_Orpheus_01 =
    {
        InteractTextLineSets =
        {
            OrpheusSong01 =
            {
                { Cue = "/VO/Orpheus_0001", Text = "Which song?" },
                {
                    Choices =
                    {
                        {
                            ChoiceText = "Choice_Song1",
                            { Cue = "/VO/Orpheus_0010" },
                            { Cue = "/VO/Orpheus_0011", PreLineWait = 0.5 },
                        },
                        { ChoiceText = "Choice_Song2", { Cue = "/VO/Orpheus_0020" } },
                    },
                },
            },
        },
    },
    NPC_Nobody_01 = { Portrait = "Portrait_Nobody" },
    NPC_Cerberus_01 =
    {
        BossPresentationIntroTextLineSets =
        {
            CerberusIntro01 = { { Cue = "/VO/Hades_0500", StartSound = "/VO/CerberusWhine" } },
        },
    },
}

GlobalVoiceLines = GlobalVoiceLines or {}
GlobalVoiceLines.HermesGiftLines = { { Cue = "/VO/Hermes_0200", Text = "For me?" } }
"#;

    const ENEMY_DATA: &str = r#"
UnitSetData.Enemies =
{
    Harpy =
    {
        BossPresentationTextLineSets =
        {
            MegaeraFirstMeeting =
            {
                { Cue = "/VO/Megaera_0001", StartSound = "/SFX/WhipCrack" },
                { Cue = "/Music/Boss", },
            },
        },
    },
    TrainingMelee =
    {
        InteractTextLineSets =
        {
            SkellyFirst = { { Cue = "/VO/Skelly_0001", Text = "Hi." } },
        },
    },
}
"#;

    const LOOT_DATA: &str = r#"
LootData =
{
    ZeusUpgrade =
    {
        PickupTextLineSets =
        {
            ZeusFirstPickUp =
            {
                { Cue = "/VO/Zeus_0001", StartSound = "/Leftovers/World Sounds/MapZoomInShort" },
            },
            ZeusSecond = { { Cue = "/VO/Zeus_0002" } },
        },
        PriorityPickupTextLineSets =
        {
            ZeusSecond = { { Cue = "/VO/Zeus_0003" } },
        },
        EndVoiceLines = { { Cue = "/VO/Zeus_0999" } },
    },
    HermesUpgrade =
    {
        DuoPickupTextLineSets =
        {
            HermesWithZeus =
            {
                { Cue = "/VO/Hermes_0300" },
                EndVoiceLines =
                {
                    { PreLineWait = 0.4, { Cue = "/VO/Zeus_0300" } },
                    { { Cue = "/VO/Hermes_0301" } },
                },
            },
            HermesBorrowed = HermesFirstMeeting,
        },
    },
}
"#;

    fn build_fixture() -> BuildOutput {
        let audio = OggLibrary::from_entries([
            ("Hermes_0001", "/ogg/Hermes_0001.ogg"),
            ("Hermes_0002", "/ogg/Hermes_0002.ogg"),
            ("ZagreusHome_0001", "/ogg/ZagreusHome_0001.ogg"),
            ("Zeus_0001", "/ogg/Zeus_0001.ogg"),
        ]);
        build(
            &parse(NPC_DATA).unwrap(),
            &parse(ENEMY_DATA).unwrap(),
            &parse(LOOT_DATA).unwrap(),
            &audio,
        )
    }

    fn ids(set: &DialogueSet) -> Vec<&str> {
        set.cues.iter().map(|c| c.audio_id.as_str()).collect()
    }

    fn count(output: &BuildOutput, kind: DiagnosticKind) -> usize {
        output.diagnostics.iter().filter(|d| d.kind == kind).count()
    }

    #[test]
    fn test_entities_per_kind() {
        let output = build_fixture();
        let catalog = &output.catalog;

        let entity_ids = |kind| -> Vec<&str> {
            catalog.list_entities(kind).map(|e| e.id.as_str()).collect()
        };

        let npcs = entity_ids(EntityKind::Npc);
        assert_eq!(npcs, vec!["NPC_Hermes_01", "NPC_Orpheus_01", "TrainingMelee"]);

        let enemies = entity_ids(EntityKind::Enemy);
        assert_eq!(enemies, vec!["Harpy", "NPC_Cerberus_01"]);

        let loot = entity_ids(EntityKind::Loot);
        assert_eq!(loot, vec!["HermesUpgrade", "ZeusUpgrade"]);
    }

    #[test]
    fn test_cue_order_delays_and_paths() {
        let output = build_fixture();
        let set = output
            .catalog
            .get_dialogue_set(EntityKind::Npc, "NPC_Hermes_01", "Interacts", "HermesFirstMeeting")
            .unwrap();

        assert_eq!(ids(set), vec!["Hermes_0001", "ZagreusHome_0001", "", "Hermes_0002"]);

        let delays: Vec<f64> = set.cues.iter().map(|c| c.delay).collect();
        assert_eq!(delays, vec![0.0, 1.0, 0.0, 0.25]);

        let first = &set.cues[0];
        assert_eq!(first.speaker, "Hermes");
        assert_eq!(first.text.as_deref(), Some("Hey there!"));
        assert_eq!(first.audio_path.as_deref(), Some(std::path::Path::new("/ogg/Hermes_0001.ogg")));

        assert_eq!(set.cues[1].speaker, "CharProtag");
        assert!(!set.cues[2].has_audio());
        assert_eq!(set.cues[2].audio_path, None);
        assert_eq!(set.cues[3].text, None);
    }

    #[test]
    fn test_empty_inline_sets_are_dropped() {
        let output = build_fixture();
        let hermes = output.catalog.get_entity(EntityKind::Npc, "NPC_Hermes_01").unwrap();
        let interacts: Vec<&str> = hermes.category("Interacts").unwrap().ids().collect();
        assert_eq!(interacts, vec!["HermesFirstMeeting"]);

        assert!(output.catalog.get_entity(EntityKind::Npc, "NPC_Nobody_01").is_err());
    }

    #[test]
    fn test_category_order() {
        let output = build_fixture();
        let hermes = output.catalog.get_entity(EntityKind::Npc, "NPC_Hermes_01").unwrap();
        let names: Vec<&str> = hermes.categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Interacts", "Repeatables", "Gifts"]);
        assert_eq!(hermes.display_name, "Hermes");
    }

    #[test]
    fn test_choices_are_flattened() {
        let output = build_fixture();
        let set = output
            .catalog
            .get_dialogue_set(EntityKind::Npc, "NPC_Orpheus_01", "Interacts", "OrpheusSong01")
            .unwrap();
        assert_eq!(ids(set), vec!["Orpheus_0001", "Orpheus_0010", "Orpheus_0011", "Orpheus_0020"]);

        let choices: Vec<Option<&str>> = set.cues.iter().map(|c| c.choice.as_deref()).collect();
        assert_eq!(
            choices,
            vec![None, Some("Choice_Song1"), Some("Choice_Song1"), Some("Choice_Song2")]
        );
        // The first cue of each choice never waits
        assert!(set.cues[1].delay.abs() < f64::EPSILON);
        assert!((set.cues[2].delay - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_references() {
        let output = build_fixture();
        let hermes = output.catalog.get_entity(EntityKind::Npc, "NPC_Hermes_01").unwrap();
        let gifts = hermes.category("Gifts").unwrap();

        let resolved = gifts.get("HermesGift01").unwrap();
        assert_eq!(resolved.pool.as_deref(), Some("GlobalVoiceLines.HermesGiftLines"));
        assert_eq!(ids(resolved), vec!["Hermes_0200"]);

        let unresolved = gifts.get("HermesGift02").unwrap();
        assert!(unresolved.is_empty());
        assert_eq!(count(&output, DiagnosticKind::UnresolvedReference), 1);

        // Inline set ids are pools too
        let borrowed = output
            .catalog
            .get_dialogue_set(EntityKind::Loot, "HermesUpgrade", "Duos", "HermesBorrowed")
            .unwrap();
        assert_eq!(ids(borrowed)[0], "Hermes_0001");
    }

    #[test]
    fn test_cross_source_entities() {
        let output = build_fixture();
        let skelly = output.catalog.get_entity(EntityKind::Npc, "TrainingMelee").unwrap();
        assert_eq!(skelly.categories[0].name, "Interacts");

        let cerberus = output.catalog.get_entity(EntityKind::Enemy, "NPC_Cerberus_01").unwrap();
        let intro = cerberus.category("Intros").unwrap().get("CerberusIntro01").unwrap();
        assert_eq!(intro.cues[0].start_sound.as_deref(), Some("CerberusWhine"));
        assert_eq!(cerberus.display_name, "Cerberus");
    }

    #[test]
    fn test_malformed_and_ignored_sounds() {
        let output = build_fixture();
        let set = output
            .catalog
            .get_dialogue_set(
                EntityKind::Enemy,
                "Harpy",
                "Basic Conversations",
                "MegaeraFirstMeeting",
            )
            .unwrap();
        assert_eq!(ids(set), vec!["Megaera_0001"]);
        assert_eq!(set.cues[0].start_sound, None);
        assert_eq!(count(&output, DiagnosticKind::MalformedCue), 1);

        let zeus = output
            .catalog
            .get_dialogue_set(EntityKind::Loot, "ZeusUpgrade", "Pickups", "ZeusFirstPickUp")
            .unwrap();
        assert_eq!(zeus.cues[0].start_sound, None);
    }

    #[test]
    fn test_end_voice_lines() {
        let output = build_fixture();
        let set = output
            .catalog
            .get_dialogue_set(EntityKind::Loot, "HermesUpgrade", "Duos", "HermesWithZeus")
            .unwrap();
        assert_eq!(ids(set), vec!["Hermes_0300", "Zeus_0300", "Hermes_0301"]);
    }

    #[test]
    fn test_duplicates_and_missing_audio() {
        let output = build_fixture();
        let zeus = output.catalog.get_entity(EntityKind::Loot, "ZeusUpgrade").unwrap();
        assert_eq!(zeus.categories_containing("ZeusSecond").count(), 2);
        assert_eq!(zeus.find_dialogue_set("ZeusSecond").unwrap().0.name, "Pickups");
        assert_eq!(count(&output, DiagnosticKind::DuplicateDialogue), 1);

        assert!(output
            .diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::MissingAudio && d.message.contains("Zeus_0002")));
        assert!(!output
            .diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::MissingAudio && d.message.contains("Zeus_0001")));
    }

    #[test]
    fn test_reference_to_empty_pool() {
        let npc = parse(
            r#"
HermesQuietLines = { PlayOnce = true }
UnitSetData.NPCs =
{
    NPC_Hermes_01 =
    {
        GiftTextLineSets = { HermesGift03 = "HermesQuietLines" },
    },
}
"#,
        )
        .unwrap();
        let empty = RawTable::new();
        let output = build(&npc, &empty, &empty, &OggLibrary::default());

        let set = output
            .catalog
            .get_dialogue_set(EntityKind::Npc, "NPC_Hermes_01", "Gifts", "HermesGift03")
            .unwrap();
        assert!(set.is_empty());
        assert_eq!(set.pool.as_deref(), Some("HermesQuietLines"));
        assert_eq!(count(&output, DiagnosticKind::EmptyReference), 1);
        assert_eq!(count(&output, DiagnosticKind::UnresolvedReference), 0);
        assert_eq!(
            output.diagnostics[0].to_string(),
            "empty reference: NPC NPC_Hermes_01 / Gifts / HermesGift03: \
             dialogue pool HermesQuietLines has no cues"
        );
    }

    #[test]
    fn test_custom_roots() {
        let npc = parse(
            r#"
Mods.Units =
{
    NPC_Dusa_01 = { GiftTextLineSets = { DusaGift01 = { { Cue = "/VO/Dusa_0001" } } } },
}
"#,
        )
        .unwrap();
        let empty = RawTable::new();
        let roots = CatalogRoots {
            npc: "Mods.Units".to_string(),
            ..CatalogRoots::default()
        };
        let output = CatalogBuilder::new(&OggLibrary::default())
            .with_roots(roots)
            .build(&npc, &empty, &empty);
        assert!(output.catalog.get_entity(EntityKind::Npc, "NPC_Dusa_01").is_ok());

        let default_roots = build(&npc, &empty, &empty, &OggLibrary::default());
        assert_eq!(default_roots.catalog.counts().npcs, 0);
    }

    #[test]
    fn test_missing_roots_build_empty() {
        let empty = RawTable::new();
        let output = build(&empty, &empty, &empty, &OggLibrary::default());
        assert_eq!(output.catalog.counts().dialogue_sets, 0);
        assert!(output.diagnostics.is_empty());
    }

    #[test]
    fn test_display_names() {
        assert_eq!(display_name(EntityKind::Npc, "NPC_Hades_01"), "Hades");
        assert_eq!(display_name(EntityKind::Npc, "NPC_FurySister_01"), "FurySister");
        assert_eq!(display_name(EntityKind::Enemy, "Harpy2"), "Harpy2");
        assert_eq!(display_name(EntityKind::Loot, "ZeusUpgrade"), "Zeus");
        assert_eq!(display_name(EntityKind::Loot, "Upgrade"), "Upgrade");
        assert_eq!(display_name(EntityKind::Npc, "TrainingMelee"), "TrainingMelee");
    }

    #[test]
    fn test_speaker_from_id() {
        assert_eq!(speaker_from_id("Hermes_0010"), "Hermes");
        assert_eq!(speaker_from_id("ZagreusField_0001"), "ZagreusField");
        assert_eq!(speaker_from_id("Solo"), "Solo");
    }
}
