//! Monster Record Parser - Compendium XML to Library
//!
//! Unknown monster children are kept as raw XML, never rejected.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use crate::monster::{Ability, Library, MonsterRecord, UnrecognizedField};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{origin}: malformed document at byte {position}: {message}")]
pub struct ParseError {
    pub origin: String,
    /// Byte offset reached when the problem was detected.
    pub position: usize,
    pub message: String,
}

/// Parse one compendium document. `path` identifies the document in the
/// returned Library and in errors.
pub fn parse_library(text: &str, path: &Path) -> Result<Library, ParseError> {
    let parser = Parser::new(text, path.display().to_string());
    let (name, monsters) = parser.document()?;
    debug!("Parsed {} monsters from {}", monsters.len(), path.display());
    Ok(Library::new(path, name, monsters))
}

/// UTF-8 byte order mark. The reader skips it, so spans would not line up
/// with the source text if it were left in place.
const BOM: char = '\u{feff}';

struct Parser<'a> {
    source: &'a str,
    reader: Reader<&'a [u8]>,
    origin: String,
    /// Bytes stripped ahead of `source`, added back to error positions.
    offset: usize,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str, origin: String) -> Self {
        let source = text.strip_prefix(BOM).unwrap_or(text);
        let reader = Reader::from_str(source);
        Self {
            source,
            reader,
            origin,
            offset: text.len() - source.len(),
        }
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError {
            origin: self.origin.clone(),
            position: self.offset + self.reader.buffer_position() as usize,
            message: message.into(),
        }
    }

    fn next(&mut self) -> Result<Event<'a>, ParseError> {
        self.reader.read_event().map_err(|e| self.error(e.to_string()))
    }

    fn document(mut self) -> Result<(Option<String>, Vec<MonsterRecord>), ParseError> {
        loop {
            match self.next()? {
                Event::Start(e) => {
                    self.expect_root(&e)?;
                    let name = self.attribute(&e, b"name")?;
                    let monsters = self.compendium()?;
                    return Ok((name, monsters));
                }
                Event::Empty(e) => {
                    self.expect_root(&e)?;
                    return Ok((self.attribute(&e, b"name")?, Vec::new()));
                }
                Event::Text(t) if t.iter().all(u8::is_ascii_whitespace) => {}
                Event::Text(_) | Event::CData(_) => {
                    return Err(self.error("text outside of the <compendium> element"));
                }
                Event::End(e) => {
                    let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    return Err(self.error(format!("unexpected closing tag </{tag}>")));
                }
                Event::Eof => return Err(self.error("document has no <compendium> element")),
                _ => {}
            }
        }
    }

    fn expect_root(&self, e: &BytesStart) -> Result<(), ParseError> {
        if e.name().as_ref() == b"compendium" {
            Ok(())
        } else {
            Err(self.error(format!(
                "expected <compendium> root element, found <{}>",
                tag_name(e)
            )))
        }
    }

    fn compendium(&mut self) -> Result<Vec<MonsterRecord>, ParseError> {
        let mut monsters = Vec::new();
        loop {
            match self.next()? {
                Event::Start(e) if e.name().as_ref() == b"monster" => {
                    monsters.push(self.monster()?);
                }
                Event::Start(e) => {
                    debug!("Skipping <{}> entry in {}", tag_name(&e), self.origin);
                    self.raw_content(&e)?;
                }
                Event::Empty(e) if e.name().as_ref() == b"monster" => {
                    monsters.push(MonsterRecord::default());
                }
                Event::End(_) => return Ok(monsters),
                Event::Eof => {
                    return Err(self.error("unexpected end of document inside <compendium>"));
                }
                _ => {}
            }
        }
    }

    fn monster(&mut self) -> Result<MonsterRecord, ParseError> {
        let mut m = MonsterRecord::default();
        loop {
            match self.next()? {
                Event::Start(e) => {
                    let tag = tag_name(&e);
                    if let Some(list) = ability_list(&mut m, &tag) {
                        list.push(self.ability(&e)?);
                    } else if let Some(field) = text_field(&mut m, &tag) {
                        *field = self.text(&e)?;
                    } else {
                        let content = self.raw_content(&e)?;
                        m.unrecognized.push(UnrecognizedField { tag, content });
                    }
                }
                Event::Empty(e) => {
                    let tag = tag_name(&e);
                    if let Some(list) = ability_list(&mut m, &tag) {
                        list.push(Ability::default());
                    } else if let Some(field) = text_field(&mut m, &tag) {
                        field.clear();
                    } else {
                        m.unrecognized.push(UnrecognizedField { tag, content: String::new() });
                    }
                }
                Event::End(_) => return Ok(m),
                Event::Eof => {
                    return Err(self.error("unexpected end of document inside <monster>"));
                }
                _ => {}
            }
        }
    }

    fn ability(&mut self, start: &BytesStart) -> Result<Ability, ParseError> {
        let mut ability = Ability::default();
        loop {
            match self.next()? {
                Event::Start(e) => match e.name().as_ref() {
                    b"name" => ability.name = self.text(&e)?,
                    b"text" => ability.text.push(self.text(&e)?),
                    b"attack" => ability.attacks.push(self.text(&e)?),
                    _ => {
                        debug!("Ignoring <{}> inside <{}>", tag_name(&e), tag_name(start));
                        self.raw_content(&e)?;
                    }
                },
                Event::Empty(e) if e.name().as_ref() == b"text" => ability.text.push(String::new()),
                Event::End(_) => return Ok(ability),
                Event::Eof => {
                    return Err(self.error(format!(
                        "unexpected end of document inside <{}>",
                        tag_name(start)
                    )));
                }
                _ => {}
            }
        }
    }

    /// Character data of an element, nested markup flattened. Whitespace
    /// inside is kept as written; only the ends of the result are trimmed.
    fn text(&mut self, start: &BytesStart) -> Result<String, ParseError> {
        let mut out = String::new();
        let mut depth = 0usize;
        loop {
            match self.next()? {
                Event::Text(t) => {
                    let s = t.unescape().map_err(|e| self.error(e.to_string()))?;
                    out.push_str(&s);
                }
                Event::CData(c) => out.push_str(&String::from_utf8_lossy(&c.into_inner())),
                Event::Start(_) => depth += 1,
                Event::End(_) if depth == 0 => return Ok(out.trim().to_string()),
                Event::End(_) => depth -= 1,
                Event::Eof => {
                    return Err(self.error(format!(
                        "unexpected end of document inside <{}>",
                        tag_name(start)
                    )));
                }
                _ => {}
            }
        }
    }

    /// Consume an element and return its inner XML verbatim.
    fn raw_content(&mut self, start: &BytesStart) -> Result<String, ParseError> {
        let span = self
            .reader
            .read_to_end(start.name())
            .map_err(|e| self.error(e.to_string()))?;
        let range = span.start as usize..span.end as usize;
        self.source
            .get(range)
            .map(str::to_string)
            .ok_or_else(|| self.error(format!("could not slice content of <{}>", tag_name(start))))
    }

    fn attribute(&self, e: &BytesStart, key: &[u8]) -> Result<Option<String>, ParseError> {
        for attr in e.attributes() {
            let attr = attr.map_err(|err| self.error(err.to_string()))?;
            if attr.key.as_ref() == key {
                let value = attr
                    .unescape_value()
                    .map_err(|err| self.error(err.to_string()))?;
                return Ok(Some(value.into_owned()));
            }
        }
        Ok(None)
    }
}

fn tag_name(e: &BytesStart) -> String {
    String::from_utf8_lossy(e.name().as_ref()).into_owned()
}

fn text_field<'m>(m: &'m mut MonsterRecord, tag: &str) -> Option<&'m mut String> {
    let field = match tag {
        "name" => &mut m.name,
        "size" => &mut m.size,
        "type" => &mut m.creature_type,
        "alignment" => &mut m.alignment,
        "ac" => &mut m.ac,
        "hp" => &mut m.hp,
        "speed" => &mut m.speed,
        "str" => &mut m.str,
        "dex" => &mut m.dex,
        "con" => &mut m.con,
        "int" => &mut m.int,
        "wis" => &mut m.wis,
        "cha" => &mut m.cha,
        "save" => &mut m.saves,
        "skill" => &mut m.skills,
        "vulnerable" => &mut m.vulnerabilities,
        "resist" => &mut m.resistances,
        "immune" => &mut m.damage_immunities,
        "conditionImmune" => &mut m.condition_immunities,
        "senses" => &mut m.senses,
        "passive" => &mut m.passive,
        "languages" => &mut m.languages,
        "cr" => &mut m.cr,
        "spells" => &mut m.spells,
        "slots" => &mut m.slots,
        "description" => &mut m.description,
        _ => return None,
    };
    Some(field)
}

fn ability_list<'m>(m: &'m mut MonsterRecord, tag: &str) -> Option<&'m mut Vec<Ability>> {
    match tag {
        "trait" => Some(&mut m.traits),
        "action" => Some(&mut m.actions),
        "reaction" => Some(&mut m.reactions),
        "legendary" => Some(&mut m.legendary),
        _ => None,
    }
}
