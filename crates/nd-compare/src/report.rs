//! Report assembly and rendering.
//!
//! Builds a structured [`DiffReport`] from the raw difference list (dedup,
//! full per-byte recompute, classification) and renders it as text or JSON,
//! in the manner the badge captures were taken: one section per differing
//! block, one line per capture.

use std::collections::HashSet;
use std::fmt;

use nd_core::offset_in_sector;
use serde::{Deserialize, Serialize};

use crate::classify::{ascii_char, ascii_line, classify, decimal_line, Classification};
use crate::diff::{byte_changes, Difference};

/// Fixed banner describing the target and capture methodology.
pub const BANNER: &str = "\
   TARGET :\n\
\n\
   Detection and analysis of a potential NFC copy protection system\n\
\n\
   All scans after the first use were performed after each new use\n\
   of the NFC badge.\n";

/// Full report over one analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffReport {
    /// Per-capture display labels, in capture order.
    pub captures: Vec<String>,
    /// One section per distinct differing block address.
    pub blocks: Vec<BlockSection>,
}

/// Report section for one differing block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockSection {
    pub sector: u32,
    pub block: u32,
    pub offset: u32,
    /// Joined hex tokens per capture.
    pub hex: Vec<String>,
    /// Printable-ASCII rendering per capture; `None` renders as
    /// "Not convertible".
    pub ascii: Vec<Option<String>>,
    pub changes: Vec<ChangeSection>,
}

/// Report entry for one differing byte position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeSection {
    pub position: usize,
    /// Raw token per capture.
    pub values: Vec<String>,
    pub ascii: Option<Vec<char>>,
    pub decimal: Option<Vec<i64>>,
    pub interpretation: Interpretation,
}

/// Serializable rendering of a [`Classification`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Interpretation {
    Counter { deltas: Vec<i64>, total: i64 },
    Timestamp { instants: Vec<String> },
    Unclassified,
}

impl From<Classification> for Interpretation {
    fn from(c: Classification) -> Self {
        match c {
            Classification::Counter { deltas, total } => Interpretation::Counter { deltas, total },
            Classification::Timestamp { instants } => Interpretation::Timestamp {
                instants: instants
                    .iter()
                    .map(|i| i.format("%Y-%m-%d %H:%M:%S").to_string())
                    .collect(),
            },
            Classification::Unclassified => Interpretation::Unclassified,
        }
    }
}

impl DiffReport {
    /// Assemble the report from the aligner's raw output.
    ///
    /// Differences are deduplicated by (sector, block) — the aligner emits
    /// each address once, but the guard is kept so a hand-built list cannot
    /// produce a doubled section. For every retained block the complete
    /// per-byte comparison is recomputed here; the aligner only recorded
    /// the first differing position.
    pub fn build(captures: Vec<String>, differences: &[Difference]) -> Self {
        let mut reported: HashSet<(u32, u32)> = HashSet::new();
        let mut blocks = Vec::new();

        for diff in differences {
            if !reported.insert((diff.sector, diff.block)) {
                continue;
            }

            let changes: Vec<ChangeSection> = byte_changes(&diff.blocks)
                .into_iter()
                .map(|change| ChangeSection {
                    ascii: change.values.iter().map(|v| ascii_char(v)).collect(),
                    decimal: decimal_line(&change.values),
                    interpretation: classify(&change.values).into(),
                    position: change.position,
                    values: change.values,
                })
                .collect();

            blocks.push(BlockSection {
                sector: diff.sector,
                block: diff.block,
                offset: offset_in_sector(diff.block),
                hex: diff.blocks.iter().map(|b| b.join(" ")).collect(),
                ascii: diff.blocks.iter().map(|b| ascii_line(b)).collect(),
                changes,
            });
        }

        Self { captures, blocks }
    }

    /// Render the full text report.
    pub fn to_text(&self) -> String {
        self.to_string()
    }

    /// Print the text report to stdout.
    pub fn print(&self) {
        println!("{self}");
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
    }
}

impl fmt::Display for DiffReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{BANNER}")?;
        for (i, label) in self.captures.iter().enumerate() {
            writeln!(f, "        Capture {} was used on : {}", i + 1, label)?;
        }

        for block in &self.blocks {
            write!(f, "{block}")?;
        }
        Ok(())
    }
}

impl fmt::Display for BlockSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "\n \nSector {}, Block {} (linear address {}, offset {} in sector): \n",
            self.sector, self.block, self.block, self.offset
        )?;
        for (i, hex) in self.hex.iter().enumerate() {
            writeln!(f, "  Hex capture {} : {}", i + 1, hex)?;
        }
        for (i, ascii) in self.ascii.iter().enumerate() {
            match ascii {
                Some(text) => writeln!(f, "  ASCII capture {} : {}", i + 1, text)?,
                None => writeln!(f, "  ASCII capture {} : Not convertible", i + 1)?,
            }
        }

        if self.changes.is_empty() {
            return Ok(());
        }
        writeln!(f, "\n  CHANGES DETECTED :")?;
        for change in &self.changes {
            write!(f, "{change}")?;
        }
        Ok(())
    }
}

impl fmt::Display for ChangeSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "\n    Byte {}  : {}",
            self.position,
            self.values.join(" -> ")
        )?;
        match &self.ascii {
            Some(chars) => {
                let rendered: Vec<String> = chars.iter().map(char::to_string).collect();
                writeln!(f, "    ASCII   : {}", rendered.join(" -> "))?;
            }
            None => writeln!(f, "    ASCII   : Not convertible")?,
        }
        match &self.decimal {
            Some(numbers) => {
                let rendered: Vec<String> = numbers.iter().map(i64::to_string).collect();
                writeln!(f, "    Decimal : {}", rendered.join(" -> "))?;
            }
            None => writeln!(f, "    Decimal : Not convertible")?,
        }

        match &self.interpretation {
            Interpretation::Counter { deltas, total } => {
                let rendered: Vec<String> = deltas.iter().map(i64::to_string).collect();
                writeln!(f, "\n    Digital difference : {total}")?;
                writeln!(
                    f,
                    "    Digital difference between each capture : {}",
                    rendered.join(" -> ")
                )?;
            }
            Interpretation::Timestamp { instants } => {
                for (i, instant) in instants.iter().enumerate() {
                    writeln!(f, "    Timestamp {} : {}", i + 1, instant)?;
                }
            }
            Interpretation::Unclassified => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(bytes: &[&str]) -> Vec<String> {
        bytes.iter().map(|b| b.to_string()).collect()
    }

    fn counter_difference() -> Difference {
        Difference {
            sector: 1,
            block: 5,
            byte_index: 0,
            blocks: vec![tokens(&["10", "41"]), tokens(&["11", "41"])],
        }
    }

    #[test]
    fn test_build_recomputes_all_changes() {
        let diff = Difference {
            sector: 1,
            block: 5,
            byte_index: 3,
            blocks: vec![
                tokens(&["00", "00", "00", "01", "00", "00", "00", "00", "00", "01"]),
                tokens(&["00", "00", "00", "02", "00", "00", "00", "00", "00", "02"]),
            ],
        };
        let report = DiffReport::build(vec!["d1".into(), "d2".into()], &[diff]);
        let positions: Vec<usize> = report.blocks[0].changes.iter().map(|c| c.position).collect();
        assert_eq!(positions, [3, 9]);
    }

    #[test]
    fn test_duplicate_differences_reported_once() {
        let report = DiffReport::build(
            vec!["d1".into(), "d2".into()],
            &[counter_difference(), counter_difference()],
        );
        assert_eq!(report.blocks.len(), 1);
    }

    #[test]
    fn test_counter_section_rendering() {
        let report = DiffReport::build(vec!["a".into(), "b".into()], &[counter_difference()]);
        let text = report.to_text();
        assert!(text.contains("Sector 1, Block 5"));
        assert!(text.contains("Byte 0  : 10 -> 11"));
        assert!(text.contains("Digital difference : 1"));
        assert!(text.contains("ASCII capture 1 : .A"));
    }

    #[test]
    fn test_sentinel_poisons_only_its_ascii_line() {
        let diff = Difference {
            sector: 0,
            block: 2,
            byte_index: 0,
            blocks: vec![tokens(&["41", "42"]), tokens(&["??", "??"])],
        };
        let report = DiffReport::build(vec!["a".into(), "b".into()], &[diff]);
        let section = &report.blocks[0];
        assert_eq!(section.ascii[0], Some("AB".to_string()));
        assert_eq!(section.ascii[1], None);

        let text = report.to_text();
        assert!(text.contains("ASCII capture 1 : AB"));
        assert!(text.contains("ASCII capture 2 : Not convertible"));
    }

    #[test]
    fn test_timestamp_section_lists_one_instant_per_capture() {
        let diff = Difference {
            sector: 0,
            block: 1,
            byte_index: 0,
            blocks: vec![tokens(&["5f5e1000"]), tokens(&["5f5e1001"])],
        };
        let report = DiffReport::build(vec!["a".into(), "b".into()], &[diff]);
        let Interpretation::Timestamp { instants } = &report.blocks[0].changes[0].interpretation
        else {
            panic!("expected timestamp interpretation");
        };
        assert_eq!(instants.len(), 2);
        let text = report.to_text();
        assert!(text.contains("Timestamp 1 :"));
        assert!(text.contains("Timestamp 2 :"));
    }

    #[test]
    fn test_banner_and_labels_lead_the_report() {
        let report = DiffReport::build(vec!["2024-01-05".into(), "2024-01-12".into()], &[]);
        let text = report.to_text();
        assert!(text.starts_with(BANNER));
        assert!(text.contains("Capture 1 was used on : 2024-01-05"));
        assert!(text.contains("Capture 2 was used on : 2024-01-12"));
    }

    #[test]
    fn test_json_round_trip() {
        let report = DiffReport::build(vec!["a".into(), "b".into()], &[counter_difference()]);
        let parsed: DiffReport = serde_json::from_str(&report.to_json()).unwrap();
        assert_eq!(parsed.blocks.len(), 1);
        assert_eq!(
            parsed.blocks[0].changes[0].interpretation,
            Interpretation::Counter {
                deltas: vec![1],
                total: 1
            }
        );
    }
}
