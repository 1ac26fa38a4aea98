//! Pedigree table parser and sibship construction.
//!
//! The pedigree file is whitespace-delimited with one header line:
//!
//! ```text
//! IID      PARENT   [MISSING_PARENT]
//! child1   dad1     mum1
//! child2   dad1     mum1
//! ```
//!
//! Each row pairs a genotyped offspring with its genotyped parent. The
//! optional third column names the ungenotyped co-parent; offspring sharing
//! both the genotyped parent and the co-parent label form one sibship.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::warn;

use crate::sample::SampleIndex;

/// One offspring / genotyped-parent pair from the pedigree file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PedigreeRow {
    pub offspring: String,
    pub parent: String,
    pub missing_parent: Option<String>,
}

/// Full siblings sharing a genotyped parent and an ungenotyped co-parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sibship {
    pub parent: String,
    pub missing_parent: Option<String>,
    pub offspring: Vec<String>,
}

impl Sibship {
    /// Label for the imputed (missing) parent, used as the output row name.
    pub fn label(&self) -> String {
        match &self.missing_parent {
            Some(m) => m.clone(),
            None => format!("{}_coparent", self.parent),
        }
    }
}

/// Pedigree restricted to samples present in the genotype file.
#[derive(Debug, Clone, Default)]
pub struct ResolvedPedigree {
    /// Sibships in first-appearance order.
    pub sibships: Vec<Sibship>,
    /// Rows that were kept.
    pub rows: Vec<PedigreeRow>,
    /// Number of rows dropped because an ID was not genotyped.
    pub n_dropped: usize,
}

impl ResolvedPedigree {
    /// All sample IDs referenced by the kept sibships (parents and offspring).
    pub fn sample_ids(&self) -> Vec<String> {
        let mut ids = Vec::new();
        for sib in &self.sibships {
            ids.push(sib.parent.clone());
            ids.extend(sib.offspring.iter().cloned());
        }
        ids
    }
}

/// Parse a pedigree file. The first line is a header and is skipped.
pub fn parse_pedigree(path: &Path) -> Result<Vec<PedigreeRow>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read pedigree file: {}", path.display()))?;
    parse_pedigree_str(&contents)
}

fn parse_pedigree_str(contents: &str) -> Result<Vec<PedigreeRow>> {
    let mut lines = contents.lines();
    if lines.next().is_none() {
        bail!("Empty pedigree file");
    }

    let mut rows = Vec::new();
    for (line_num, line) in lines.enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 2 {
            bail!("Pedigree line {} has fewer than 2 fields", line_num + 2);
        }
        if fields[0] == fields[1] {
            bail!(
                "Pedigree line {}: offspring '{}' listed as its own parent",
                line_num + 2,
                fields[0]
            );
        }
        rows.push(PedigreeRow {
            offspring: fields[0].to_string(),
            parent: fields[1].to_string(),
            missing_parent: fields
                .get(2)
                .filter(|m| !matches!(**m, "0" | "NA" | "."))
                .map(|m| m.to_string()),
        });
    }
    Ok(rows)
}

/// Group rows into sibships keyed by (parent, missing parent), in order of
/// first appearance. Repeated offspring within a sibship are kept once.
pub fn group_sibships(rows: &[PedigreeRow]) -> Vec<Sibship> {
    let mut order: HashMap<(&str, Option<&str>), usize> = HashMap::new();
    let mut sibships: Vec<Sibship> = Vec::new();

    for row in rows {
        let key = (row.parent.as_str(), row.missing_parent.as_deref());
        let idx = *order.entry(key).or_insert_with(|| {
            sibships.push(Sibship {
                parent: row.parent.clone(),
                missing_parent: row.missing_parent.clone(),
                offspring: Vec::new(),
            });
            sibships.len() - 1
        });
        let sib = &mut sibships[idx];
        if sib.offspring.contains(&row.offspring) {
            warn!(
                "Offspring {} listed twice for parent {}; keeping one",
                row.offspring, row.parent
            );
        } else {
            sib.offspring.push(row.offspring.clone());
        }
    }
    sibships
}

/// Drop rows whose offspring or genotyped parent is not in `sample_ids`,
/// then group the remaining rows into sibships.
pub fn resolve_sibships(rows: &[PedigreeRow], sample_ids: &[String]) -> ResolvedPedigree {
    let index = SampleIndex::new(sample_ids);
    let mut kept = Vec::with_capacity(rows.len());
    let mut n_dropped = 0;

    for row in rows {
        if index.contains(&row.offspring) && index.contains(&row.parent) {
            kept.push(row.clone());
        } else {
            warn!("Missing genotype data for {}; dropping pedigree row", row.offspring);
            n_dropped += 1;
        }
    }

    ResolvedPedigree {
        sibships: group_sibships(&kept),
        rows: kept,
        n_dropped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn row(o: &str, p: &str, m: Option<&str>) -> PedigreeRow {
        PedigreeRow {
            offspring: o.into(),
            parent: p.into(),
            missing_parent: m.map(String::from),
        }
    }

    #[test]
    fn test_parse_pedigree_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fam.ped");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "IID\tPARENT\tCOPARENT").unwrap();
        writeln!(f, "c1\tp1\tm1").unwrap();
        writeln!(f, "c2 p1").unwrap();
        writeln!(f).unwrap();
        writeln!(f, "c3\tp2\tNA").unwrap();

        let rows = parse_pedigree(&path).unwrap();
        assert_eq!(
            rows,
            vec![
                row("c1", "p1", Some("m1")),
                row("c2", "p1", None),
                row("c3", "p2", None),
            ]
        );
    }

    #[test]
    fn test_parse_rejects_short_and_self_rows() {
        assert!(parse_pedigree_str("IID PARENT\nc1\n").is_err());
        assert!(parse_pedigree_str("IID PARENT\nc1 c1\n").is_err());
        assert!(parse_pedigree_str("").is_err());
    }

    #[test]
    fn test_group_sibships_by_both_parents() {
        let rows = vec![
            row("c1", "p1", Some("m1")),
            row("c2", "p2", None),
            row("c3", "p1", Some("m1")),
            row("c4", "p1", Some("m2")),
            row("c1", "p1", Some("m1")),
        ];
        let sibs = group_sibships(&rows);
        assert_eq!(sibs.len(), 3);
        assert_eq!(sibs[0].offspring, vec!["c1", "c3"]);
        assert_eq!(sibs[1].parent, "p2");
        assert_eq!(sibs[1].label(), "p2_coparent");
        assert_eq!(sibs[2].label(), "m2");
    }

    #[test]
    fn test_resolve_drops_ungenotyped() {
        let rows = vec![
            row("c1", "p1", None),
            row("c2", "p1", None),
            row("c3", "p9", None),
            row("c9", "p1", None),
        ];
        let samples: Vec<String> = ["p1", "c1", "c2", "c3"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let resolved = resolve_sibships(&rows, &samples);
        assert_eq!(resolved.n_dropped, 2);
        assert_eq!(resolved.rows.len(), 2);
        assert_eq!(resolved.sibships.len(), 1);
        assert_eq!(resolved.sibships[0].offspring, vec!["c1", "c2"]);
        assert_eq!(resolved.sample_ids(), vec!["p1", "c1", "c2"]);
    }
}
