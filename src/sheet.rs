//! Encounter Sheet Composer
//!
//! Pure: no I/O, nothing mutated. The roster expands by quantity, the grid
//! does not.

use crate::config::SheetConfig;
use crate::document::{EncounterSheet, RosterRow, StatBlock};
use crate::encounter::ResolvedEncounter;
use crate::format;
use crate::statblock::render_stat_block;

pub fn compose(encounter: &ResolvedEncounter, config: &SheetConfig) -> EncounterSheet {
    EncounterSheet {
        title: encounter.name.clone(),
        initiative: initiative_slots(config.initiative_slots),
        roster: roster(encounter),
        grid: grid(encounter, config.per_row),
    }
}

/// Slot numbers from `count` down to 1.
pub fn initiative_slots(count: u32) -> Vec<u32> {
    (1..=count).rev().collect()
}

/// One row per tracked creature; numbering restarts for each reference.
pub fn roster(encounter: &ResolvedEncounter) -> Vec<RosterRow> {
    encounter
        .monsters
        .iter()
        .flat_map(|entry| {
            (1..=entry.quantity).map(move |n| RosterRow {
                label: format!("{} {}", entry.monster.name, n),
                ac: format::short_value(&entry.monster.ac).to_string(),
                hp: format::short_value(&entry.monster.hp).to_string(),
            })
        })
        .collect()
}

/// One stat block per reference, `per_row` to a row.
pub fn grid(encounter: &ResolvedEncounter, per_row: usize) -> Vec<Vec<StatBlock>> {
    let blocks: Vec<StatBlock> = encounter
        .monsters
        .iter()
        .map(|entry| render_stat_block(&entry.monster))
        .collect();
    blocks.chunks(per_row.max(1)).map(<[StatBlock]>::to_vec).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encounter::ResolvedRef;
    use crate::monster::MonsterRecord;
    use std::sync::Arc;

    fn entry(name: &str, quantity: u32) -> ResolvedRef {
        ResolvedRef {
            source: "mm.xml".into(),
            name: name.into(),
            quantity,
            monster: Arc::new(MonsterRecord {
                name: name.into(),
                ac: "15 (leather armor, shield)".into(),
                hp: "7 (2d6)".into(),
                ..Default::default()
            }),
        }
    }

    fn encounter(entries: Vec<ResolvedRef>) -> ResolvedEncounter {
        ResolvedEncounter {
            name: "Ambush".into(),
            source: "mm.xml".into(),
            monsters: entries,
        }
    }

    #[test]
    fn test_roster_numbering_resets_per_ref() {
        let enc = encounter(vec![entry("Goblin", 2), entry("Wolf", 1), entry("Goblin", 2)]);
        let labels: Vec<_> = roster(&enc).into_iter().map(|r| r.label).collect();
        assert_eq!(labels, vec!["Goblin 1", "Goblin 2", "Wolf 1", "Goblin 1", "Goblin 2"]);
    }

    #[test]
    fn test_roster_uses_short_values() {
        let rows = roster(&encounter(vec![entry("Goblin", 1)]));
        assert_eq!(rows[0].ac, "15");
        assert_eq!(rows[0].hp, "7");
    }

    #[test]
    fn test_grid_one_block_per_ref() {
        let enc = encounter(vec![entry("Goblin", 5), entry("Wolf", 3), entry("Bugbear", 1)]);
        let sheet = compose(&enc, &SheetConfig::default());
        assert_eq!(sheet.stat_block_count(), 3);
        assert_eq!(sheet.grid.len(), 2);
        assert_eq!(sheet.grid[0].len(), 2);
        assert_eq!(sheet.grid[1][0].name, "Bugbear");
        assert_eq!(sheet.roster.len(), 9);
    }

    #[test]
    fn test_grid_respects_per_row() {
        let enc = encounter(vec![entry("A", 1), entry("B", 1), entry("C", 1), entry("D", 1)]);
        let config = SheetConfig::from_user(10, 3).unwrap();
        let rows: Vec<_> = compose(&enc, &config).grid.iter().map(Vec::len).collect();
        assert_eq!(rows, vec![3, 1]);
    }

    #[test]
    fn test_initiative_slots_descending() {
        assert_eq!(initiative_slots(3), vec![3, 2, 1]);
        let sheet = compose(&encounter(vec![]), &SheetConfig::default());
        assert_eq!(sheet.initiative.len(), 30);
        assert_eq!(sheet.initiative.first(), Some(&30));
        assert!(sheet.grid.is_empty());
    }
}
