//! Document Writers - Markup Serialization
//!
//! Writers only decide markup. Which sections exist was settled when the
//! document was built.

use crate::document::{
    AbilityScore, EncounterSheet, Inline, Paragraph, PropertyBlock, PropertyLine, StatBlock,
};

pub trait DocumentWriter {
    fn monster_page(&self, block: &StatBlock) -> String;
    fn encounter_page(&self, sheet: &EncounterSheet) -> String;
}

/// Escape text for element content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Self-contained HTML using the stat-block custom element names.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlWriter;

const STYLE: &str = r#"
body { margin: 0; padding: 20px; font-family: 'Noto Sans', 'Myriad Pro', Calibri, Helvetica, Arial, sans-serif; font-size: 13.5px; }
stat-block { display: inline-block; vertical-align: top; width: 400px; margin: 0 20px 20px 0; padding: 0.6em; background: #FDF1DC; border-top: 5px solid #E69A28; border-bottom: 5px solid #E69A28; box-shadow: 0 0 1.5em #867453; }
creature-heading h1 { font-family: 'Libre Baskerville', Georgia, serif; color: #7A200D; font-size: 23px; font-variant: small-caps; margin: 0; }
creature-heading h2 { font-size: 12px; font-style: italic; font-weight: normal; margin: 0; }
top-stats { display: block; color: #7A200D; border-top: 2px solid #922610; border-bottom: 2px solid #922610; margin: 0.6em 0; padding: 0.3em 0; }
property-line { display: block; line-height: 1.4; text-indent: -1em; padding-left: 1em; }
property-line h4, property-block h4 { display: inline; margin: 0; }
property-line p, property-block p:first-of-type { display: inline; margin: 0; }
property-block { display: block; margin: 0.3em 0 0.9em; line-height: 1.5; }
property-block h4 { font-style: italic; }
property-block p { margin: 0; text-indent: 1em; }
abilities-block table { width: 100%; border-collapse: collapse; margin: 0.3em 0; }
abilities-block th, abilities-block td { text-align: center; width: 50px; }
h3 { border-bottom: 1px solid #7A200D; color: #7A200D; font-size: 21px; font-variant: small-caps; font-weight: normal; margin: 0 0 0.3em; }
table.tracker { border-collapse: collapse; margin-bottom: 20px; }
table.tracker th, table.tracker td { border: 1px solid #999; padding: 2px 8px; }
table.tracker td.blank { min-width: 80px; }
.initiative td { height: 1.4em; }
.grid-row { display: block; page-break-inside: avoid; }
"#;

impl HtmlWriter {
    fn page(&self, title: &str, body: &str) -> String {
        format!(
            "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"/><title>{}</title><style>{}</style></head><body>\n{}\n</body></html>\n",
            escape_html(title),
            STYLE,
            body
        )
    }

    pub fn stat_block(&self, block: &StatBlock) -> String {
        let mut out = String::from("<stat-block>\n <creature-heading>\n");
        out.push_str(&format!("  <h1>{}</h1>\n", escape_html(&block.name)));
        out.push_str(&format!("  <h2>{}</h2>\n", escape_html(&block.subtitle)));
        out.push_str(" </creature-heading>\n <top-stats>\n");

        for line in &block.top_stats {
            out.push_str(&self.property_line(line));
        }
        out.push_str(&self.abilities(&block.abilities));
        for line in &block.details {
            out.push_str(&self.property_line(line));
        }
        out.push_str(" </top-stats>\n");

        for group in &block.groups {
            if let Some(heading) = &group.heading {
                out.push_str(&format!(" <h3>{}</h3>\n", escape_html(heading)));
            }
            for b in &group.blocks {
                out.push_str(&self.property_block(b));
            }
        }
        if let Some(description) = &block.description {
            out.push_str(&self.property_block(description));
        }
        out.push_str("</stat-block>\n");
        out
    }

    fn property_line(&self, line: &PropertyLine) -> String {
        format!(
            "  <property-line>\n   <h4>{}</h4>\n   <p>{}</p>\n  </property-line>\n",
            escape_html(&line.label),
            escape_html(&line.text)
        )
    }

    fn abilities(&self, scores: &[AbilityScore]) -> String {
        let headers: String = scores
            .iter()
            .map(|s| format!("<th>{}</th>", escape_html(&s.label)))
            .collect();
        let cells: String = scores
            .iter()
            .map(|s| format!("<td>{}</td>", escape_html(&s.text)))
            .collect();
        format!(
            "  <abilities-block>\n   <table>\n    <tr>{}</tr>\n    <tr>{}</tr>\n   </table>\n  </abilities-block>\n",
            headers, cells
        )
    }

    fn property_block(&self, block: &PropertyBlock) -> String {
        let mut out = String::from(" <property-block>\n");
        let title = block.title.as_deref().unwrap_or("");
        out.push_str(&format!("  <h4>{}</h4>\n", escape_html(title)));
        for p in &block.paragraphs {
            out.push_str(&format!("  <p>{}</p>\n", self.paragraph(p)));
        }
        out.push_str(" </property-block>\n");
        out
    }

    fn paragraph(&self, paragraph: &Paragraph) -> String {
        paragraph
            .iter()
            .map(|span| match span {
                Inline::Plain(text) => escape_html(text),
                Inline::Emphasis(text) => format!("<i>{}</i>", escape_html(text)),
            })
            .collect()
    }

    fn tracker(&self, sheet: &EncounterSheet) -> String {
        let mut out = String::from("<table class=\"tracker initiative\">\n <tr><th>Init</th><th>Creature</th></tr>\n");
        for slot in &sheet.initiative {
            out.push_str(&format!(" <tr><td>{}</td><td class=\"blank\"></td></tr>\n", slot));
        }
        out.push_str("</table>\n");

        out.push_str("<table class=\"tracker roster\">\n <tr><th>Creature</th><th>AC</th><th>Max HP</th><th>Condition</th><th>Current HP</th></tr>\n");
        for row in &sheet.roster {
            out.push_str(&format!(
                " <tr><td>{}</td><td>{}</td><td>{}</td><td class=\"blank\"></td><td class=\"blank\"></td></tr>\n",
                escape_html(&row.label),
                escape_html(&row.ac),
                escape_html(&row.hp)
            ));
        }
        out.push_str("</table>\n");
        out
    }
}

impl DocumentWriter for HtmlWriter {
    fn monster_page(&self, block: &StatBlock) -> String {
        self.page(&block.name, &self.stat_block(block))
    }

    fn encounter_page(&self, sheet: &EncounterSheet) -> String {
        let mut body = format!("<h1>{}</h1>\n", escape_html(&sheet.title));
        body.push_str(&self.tracker(sheet));
        for row in &sheet.grid {
            body.push_str("<div class=\"grid-row\">\n");
            for block in row {
                body.push_str(&self.stat_block(block));
            }
            body.push_str("</div>\n");
        }
        self.page(&sheet.title, &body)
    }
}

/// Plain text for terminals. Emphasis is shown as `_Hit:_`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextWriter;

const RULE: &str = "----------------------------------------";

impl TextWriter {
    pub fn stat_block(&self, block: &StatBlock) -> String {
        let mut lines = vec![block.name.to_uppercase(), block.subtitle.clone(), RULE.to_string()];
        lines.extend(block.top_stats.iter().map(|l| format!("{} {}", l.label, l.text)));
        lines.push(
            block
                .abilities
                .iter()
                .map(|a| format!("{} {}", a.label, a.text))
                .collect::<Vec<_>>()
                .join("  "),
        );
        lines.extend(block.details.iter().map(|l| format!("{} {}", l.label, l.text)));
        lines.push(RULE.to_string());

        for group in &block.groups {
            if let Some(heading) = &group.heading {
                lines.push(String::new());
                lines.push(heading.clone());
            }
            for b in &group.blocks {
                lines.extend(self.block_lines(b));
            }
        }
        if let Some(description) = &block.description {
            lines.push(String::new());
            lines.extend(self.block_lines(description));
        }
        lines.join("\n") + "\n"
    }

    fn block_lines(&self, block: &PropertyBlock) -> Vec<String> {
        let mut lines = vec![];
        for (i, p) in block.paragraphs.iter().enumerate() {
            let text: String = p
                .iter()
                .map(|span| match span {
                    Inline::Plain(t) => t.clone(),
                    Inline::Emphasis(t) => format!("_{}_", t),
                })
                .collect();
            match (&block.title, i) {
                (Some(title), 0) => lines.push(format!("{} {}", title, text)),
                _ => lines.push(format!("  {}", text)),
            }
        }
        if lines.is_empty() {
            if let Some(title) = &block.title {
                lines.push(title.clone());
            }
        }
        lines
    }
}

impl DocumentWriter for TextWriter {
    fn monster_page(&self, block: &StatBlock) -> String {
        self.stat_block(block)
    }

    fn encounter_page(&self, sheet: &EncounterSheet) -> String {
        let mut out = format!("{}\n{}\n\n", sheet.title, "=".repeat(sheet.title.chars().count()));

        let slots: Vec<_> = sheet.initiative.iter().map(u32::to_string).collect();
        out.push_str(&format!("Initiative: {}\n\n", slots.join(" ")));

        for row in &sheet.roster {
            out.push_str(&format!(
                "{:<24} AC {:<4} HP {:<5} Condition ________  Current HP ____\n",
                row.label, row.ac, row.hp
            ));
        }

        for row in &sheet.grid {
            out.push('\n');
            out.push_str(&format!("{}\n", "=".repeat(RULE.len())));
            for block in row {
                out.push('\n');
                out.push_str(&self.stat_block(block));
            }
        }
        out
    }
}
