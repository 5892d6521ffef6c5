//! Stat-Block Renderer
//!
//! Empty fields are skipped, never rendered as empty labeled lines.
//! Empty ability lists skip their whole group, heading included.

use crate::document::{AbilityScore, BlockGroup, Inline, PropertyBlock, PropertyLine, StatBlock};
use crate::format;
use crate::monster::{Ability, MonsterRecord};

pub fn render_stat_block(m: &MonsterRecord) -> StatBlock {
    StatBlock {
        name: m.name.clone(),
        subtitle: format::subtitle(&m.size, &m.creature_type, &m.alignment),
        top_stats: vec![
            PropertyLine::new("Armor Class", m.ac.as_str()),
            PropertyLine::new("Hit Points", m.hp.as_str()),
            PropertyLine::new("Speed", m.speed.as_str()),
        ],
        abilities: m
            .ability_scores()
            .iter()
            .map(|(short, score)| AbilityScore {
                label: short.to_uppercase(),
                text: format::ability_text(score),
            })
            .collect(),
        details: details(m),
        groups: groups(m),
        description: (!m.description.is_empty()).then(|| PropertyBlock {
            title: None,
            paragraphs: vec![vec![Inline::Plain(m.description.clone())]],
        }),
    }
}

fn details(m: &MonsterRecord) -> Vec<PropertyLine> {
    let optional = [
        ("Saving Throws", &m.saves),
        ("Skills", &m.skills),
        ("Damage Vulnerabilities", &m.vulnerabilities),
        ("Damage Resistances", &m.resistances),
        ("Damage Immunities", &m.damage_immunities),
        ("Condition Immunities", &m.condition_immunities),
    ];

    let mut lines: Vec<_> = optional
        .into_iter()
        .filter(|(_, text)| !text.is_empty())
        .map(|(label, text)| PropertyLine::new(label, text.as_str()))
        .collect();

    lines.push(PropertyLine::new("Senses", senses_text(m)));
    if !m.languages.is_empty() {
        lines.push(PropertyLine::new("Languages", m.languages.as_str()));
    }
    lines.push(PropertyLine::new("Challenge", m.cr.as_str()));
    lines
}

fn senses_text(m: &MonsterRecord) -> String {
    if m.senses.is_empty() {
        format!("passive Perception {}", m.passive)
    } else {
        format!("{}, passive Perception {}", m.senses, m.passive)
    }
}

fn groups(m: &MonsterRecord) -> Vec<BlockGroup> {
    [
        (None, &m.traits),
        (Some("Actions"), &m.actions),
        (Some("Reactions"), &m.reactions),
        (Some("Legendary Actions"), &m.legendary),
    ]
    .into_iter()
    .filter(|(_, list)| !list.is_empty())
    .map(|(heading, list)| BlockGroup {
        heading: heading.map(str::to_string),
        blocks: list.iter().map(property_block).collect(),
    })
    .collect()
}

fn property_block(ability: &Ability) -> PropertyBlock {
    PropertyBlock {
        title: Some(format!("{}.", ability.name)),
        paragraphs: ability.text.iter().map(|t| format::mark_hits(t)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn orc() -> MonsterRecord {
        MonsterRecord {
            name: "Orc".into(),
            size: "M".into(),
            creature_type: "humanoid (orc)".into(),
            alignment: "chaotic evil".into(),
            ac: "13 (hide armor)".into(),
            hp: "15 (2d8 + 6)".into(),
            speed: "30 ft.".into(),
            str: "16".into(),
            dex: "12".into(),
            con: "16".into(),
            int: "7".into(),
            wis: "11".into(),
            cha: "10".into(),
            skills: "Intimidation +2".into(),
            senses: "darkvision 60 ft.".into(),
            passive: "10".into(),
            languages: "Common, Orc".into(),
            cr: "1/2".into(),
            traits: vec![Ability {
                name: "Aggressive".into(),
                text: vec!["As a bonus action, the orc can move up to its speed.".into()],
                attacks: vec![],
            }],
            actions: vec![Ability {
                name: "Greataxe".into(),
                text: vec!["Melee Weapon Attack: +5 to hit. Hit: 9 (1d12 + 3) slashing damage.".into()],
                attacks: vec!["Greataxe|5|1d12+3".into()],
            }],
            ..Default::default()
        }
    }

    fn labels(lines: &[PropertyLine]) -> Vec<&str> {
        lines.iter().map(|l| l.label.as_str()).collect()
    }

    #[test]
    fn test_heading_and_top_stats() {
        let block = render_stat_block(&orc());
        assert_eq!(block.name, "Orc");
        assert_eq!(block.subtitle, "Medium humanoid (orc), chaotic evil");
        assert_eq!(labels(&block.top_stats), vec!["Armor Class", "Hit Points", "Speed"]);
        assert_eq!(block.top_stats[0].text, "13 (hide armor)");
    }

    #[test]
    fn test_ability_scores_formatted() {
        let block = render_stat_block(&orc());
        let texts: Vec<_> = block.abilities.iter().map(|a| a.text.as_str()).collect();
        assert_eq!(texts, vec!["16 (+3)", "12 (+1)", "16 (+3)", "7 (\u{2013}2)", "11 (+0)", "10 (+0)"]);
        assert_eq!(block.abilities[0].label, "STR");
    }

    #[test]
    fn test_empty_fields_omitted() {
        let block = render_stat_block(&orc());
        assert_eq!(labels(&block.details), vec!["Skills", "Senses", "Languages", "Challenge"]);
        assert_eq!(block.details[1].text, "darkvision 60 ft., passive Perception 10");

        let mut quiet = orc();
        quiet.skills.clear();
        quiet.languages.clear();
        quiet.senses.clear();
        let block = render_stat_block(&quiet);
        assert_eq!(labels(&block.details), vec!["Senses", "Challenge"]);
        assert_eq!(block.details[0].text, "passive Perception 10");
    }

    #[test]
    fn test_groups_and_headings() {
        let block = render_stat_block(&orc());
        assert_eq!(block.groups.len(), 2);
        assert_eq!(block.groups[0].heading, None);
        assert_eq!(block.groups[1].heading.as_deref(), Some("Actions"));
        assert_eq!(block.groups[1].blocks[0].title.as_deref(), Some("Greataxe."));

        let paragraph = &block.groups[1].blocks[0].paragraphs[0];
        assert!(paragraph.contains(&Inline::Emphasis("Hit:".into())));
    }

    #[test]
    fn test_no_actions_no_heading() {
        let mut m = orc();
        m.actions.clear();
        let block = render_stat_block(&m);
        assert!(block.groups.iter().all(|g| g.heading.as_deref() != Some("Actions")));
    }

    #[test]
    fn test_all_groups_in_order() {
        let mut m = orc();
        m.reactions = vec![Ability { name: "Parry".into(), ..Default::default() }];
        m.legendary = vec![Ability { name: "Detect".into(), ..Default::default() }];
        let block = render_stat_block(&m);
        let headings: Vec<_> = block.groups.iter().map(|g| g.heading.as_deref()).collect();
        assert_eq!(headings, vec![None, Some("Actions"), Some("Reactions"), Some("Legendary Actions")]);
    }

    #[test]
    fn test_description_unlabeled() {
        let mut m = orc();
        assert!(render_stat_block(&m).description.is_none());

        m.description = "Orcs are savage raiders.".into();
        let description = render_stat_block(&m).description.unwrap();
        assert_eq!(description.title, None);
        assert_eq!(description.paragraphs, vec![vec![Inline::Plain("Orcs are savage raiders.".into())]]);
    }

    #[test]
    fn test_description_has_no_hit_emphasis() {
        let mut m = orc();
        m.description = "Hit: the orc strikes first.".into();
        let description = render_stat_block(&m).description.unwrap();
        assert_eq!(description.paragraphs, vec![vec![Inline::Plain("Hit: the orc strikes first.".into())]]);
    }
}
