//! Batch operations behind the `hdialogue` flags

use std::io::{BufRead, Write};

use crate::audio::MediaPlayer;
use crate::catalog::{Catalog, Entity, EntityKind};
use crate::error::{Error, Result};
use crate::playback::{PlaybackSession, Playlist, Step};

/// Print every entity id, sorted, under one heading per kind.
pub fn show(catalog: &Catalog, out: &mut impl Write) -> Result<()> {
    for kind in EntityKind::ALL {
        let heading = kind.plural();
        writeln!(out, "{heading}")?;
        writeln!(out, "{}", "-".repeat(heading.len()))?;
        for entity in catalog.list_entities(kind) {
            writeln!(out, "{}", entity.id)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Print the entity's dialogue ids grouped by category.
pub fn list(entity: &Entity, out: &mut impl Write) -> Result<()> {
    for category in entity.categories.iter().filter(|c| !c.is_empty()) {
        let heading = format!("{} ({})", category.name, category.source_key);
        writeln!(out, "{heading}")?;
        writeln!(out, "{}", "-".repeat(heading.chars().count()))?;
        for id in category.ids() {
            writeln!(out, "{id}")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Play one dialogue set from the first category that holds it.
pub fn play_one<P: MediaPlayer>(
    entity: &Entity,
    id: &str,
    player: P,
    out: &mut impl Write,
) -> Result<()> {
    let (category, set) = entity
        .find_dialogue_set(id)
        .ok_or_else(|| Error::not_found("dialogue set", format!("{}/{id}", entity.id)))?;

    let others: Vec<&str> = entity
        .categories_containing(id)
        .skip(1)
        .map(|c| c.name.as_str())
        .collect();
    if !others.is_empty() {
        writeln!(
            out,
            "NOTE: {id} also appears in {}; playing the one from {}",
            others.join(", "),
            category.name
        )?;
        writeln!(out)?;
    }

    let mut session = PlaybackSession::new(Playlist::from_sets([set]), player)?;
    session.play_current()
}

/// Play every set of the entity in order, waiting for Enter between sets.
///
/// `prefix` keeps only sets whose id starts with it.
pub fn play_all<P: MediaPlayer>(
    entity: &Entity,
    prefix: Option<&str>,
    player: P,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<usize> {
    let mut playlist = Playlist::from_entity(entity);
    if let Some(prefix) = prefix {
        playlist = playlist.filter_prefix(prefix);
    }
    if playlist.is_empty() {
        writeln!(out, "No dialogue to play for {}", entity.id)?;
        return Ok(0);
    }

    let total = playlist.len();
    let mut session = PlaybackSession::new(playlist, player)?;
    loop {
        writeln!(out, "({}/{total})", session.cursor() + 1)?;
        session.play_current()?;
        if session.next() == Step::AtBoundary {
            break;
        }
        write!(out, "Enter to continue...")?;
        out.flush()?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            break;
        }
    }
    Ok(session.last_played().map_or(0, |i| i + 1))
}
