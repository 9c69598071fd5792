use rulelink::{ColoredExtractor, ColoredRecord, ColoredRule, FieldDisplay, Fragment, Palette};

mod ansi {
    use rulelink::Swatch;

    pub const RESET: &str = "\x1b[0m";
    pub const DIM: &str = "\x1b[2m";
    pub const BOLD: &str = "\x1b[1m";

    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";

    pub struct Palette {
        enabled: bool,
    }

    impl Palette {
        pub fn new(enabled: bool) -> Self {
            Self { enabled }
        }

        pub fn paint(&self, s: impl AsRef<str>, color: &str) -> String {
            if self.enabled { format!("{}{}{}", color, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn bold(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", BOLD, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn dim(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", DIM, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        /// Truecolor background/foreground from a swatch; brackets when colour is off.
        pub fn swatch(&self, s: &str, swatch: &Swatch, slot: usize) -> String {
            if !self.enabled {
                return format!("[{s}]{slot}");
            }
            match (rgb(&swatch.background), rgb(&swatch.foreground)) {
                (Some((br, bg, bb)), Some((fr, fg, fb))) => {
                    format!("\x1b[48;2;{br};{bg};{bb}m\x1b[38;2;{fr};{fg};{fb}m{BOLD}{s}{RESET}")
                }
                _ => self.bold(s),
            }
        }
    }

    /// `#RRGGBB`
    fn rgb(hex: &str) -> Option<(u8, u8, u8)> {
        let hex = hex.strip_prefix('#')?;
        if hex.len() != 6 {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        Some((channel(0)?, channel(2)?, channel(4)?))
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn parses_hex_swatches() {
            assert_eq!(rgb("#F0FCFE"), Some((0xF0, 0xFC, 0xFE)));
            assert_eq!(rgb("F0FCFE"), None);
            assert_eq!(rgb("#F0F"), None);
        }
    }
}

pub fn print_rules(rules: &[ColoredRule], swatches: &Palette, color: bool) {
    let palette = ansi::Palette::new(color);

    let total: usize = rules.iter().map(|r| r.number_of_matches).sum();
    println!(
        "\n{}",
        palette.bold(palette.paint(format!("⚙  {} rules over {} matches", rules.len(), total), ansi::CYAN))
    );

    if rules.is_empty() {
        println!("{}", palette.dim("  No rules induced"));
        println!("\n{}", palette.paint("Possible reasons:", ansi::YELLOW));
        println!("  • No predictions in the input");
        println!("  • No field mapping has both a source and a target");
        println!("\n{}", palette.dim("  Tip: pass --map <source>:<target> for each field pair"));
        println!();
        return;
    }

    for (idx, rule) in rules.iter().enumerate() {
        let header = match rule.average_score {
            Some(avg) => format!("━━━ Rule {} · {} matches · avg {:.2} ━━━", idx + 1, rule.number_of_matches, avg),
            None => format!("━━━ Rule {} · {} matches ━━━", idx + 1, rule.number_of_matches),
        };
        println!("\n{}", palette.paint(header, ansi::GRAY));

        for extractor in &rule.extractors {
            print_extractor(extractor, &palette, swatches);
        }

        for (m_idx, m) in rule.matches.iter().enumerate() {
            println!(
                "  {} {}",
                palette.paint(format!("[{}]", m_idx), ansi::GRAY),
                palette.paint(format!("score {:.2}", m.score), ansi::GREEN),
            );
            for extractor in &rule.extractors {
                let record = m.record(extractor.entity_set);
                println!(
                    "      {} {}",
                    palette.dim(format!("{}:", record.id)),
                    fmt_field(record, &extractor.field, &palette, swatches)
                );
            }
        }
    }
    println!();
}

fn print_extractor(extractor: &ColoredExtractor, palette: &ansi::Palette, swatches: &Palette) {
    println!(
        "  {} {}  {}",
        palette.paint(format!("{}.{}", extractor.entity_set, extractor.field), ansi::BLUE),
        palette.dim("│"),
        fmt_fragments(&extractor.pattern, palette, swatches)
    );
}

fn fmt_field(record: &ColoredRecord, field: &str, palette: &ansi::Palette, swatches: &Palette) -> String {
    match record.field(field) {
        Some(FieldDisplay::Fragments(fragments)) => fmt_fragments(fragments, palette, swatches),
        Some(FieldDisplay::Value(serde_json::Value::String(s))) => s.clone(),
        Some(FieldDisplay::Value(other)) => palette.dim(other.to_string()),
        None => palette.dim("(missing)"),
    }
}

fn fmt_fragments(fragments: &[Fragment], palette: &ansi::Palette, swatches: &Palette) -> String {
    fragments
        .iter()
        .map(|f| match f {
            Fragment::Plain(text) => text.clone(),
            Fragment::Linked { color_index, text } => {
                palette.swatch(text, swatches.swatch(*color_index), swatches.slot(*color_index))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rulelink::fragments;

    #[test]
    fn plain_rendering_marks_linked_slots() {
        let palette = ansi::Palette::new(false);
        let out = fmt_fragments(&fragments!["VAL", "_", (0, "23"), "_", (9, "XF")], &palette, &Palette::default());
        assert_eq!(out, "VAL_[23]0_[XF]1");
    }

    #[test]
    fn colored_rendering_uses_swatch_rgb() {
        let palette = ansi::Palette::new(true);
        let out = fmt_fragments(&fragments![(0, "23")], &palette, &Palette::default());
        assert!(out.starts_with("\x1b[48;2;240;252;254m\x1b[38;2;7;90;117m"));
        assert!(out.ends_with(ansi::RESET));
    }

    #[test]
    fn custom_palette_drives_rendering() {
        let palette = ansi::Palette::new(true);
        let mono = Palette::new(vec![rulelink::Swatch::new("#000000", "#FFFFFF")]);
        let out = fmt_fragments(&fragments![(3, "XF")], &palette, &mono);
        assert!(out.starts_with("\x1b[48;2;0;0;0m\x1b[38;2;255;255;255m"));
    }
}
