use std::fs;
use std::path::{Path, PathBuf};

use super::model::AnalysisConfig;
use crate::assignment::Assignment;
use crate::sequence::Sequence;

pub const SUMMARY_FILE: &str = "output.txt";
pub const VARIANTS_FILE: &str = "wrongversions.txt";

const METRIC_HEADER: &str = "Metric Simples";
const COMPLEX_HEADER: &str = "Complexsequences";
const BOI_HEADER: &str = "Beats of Interest";
const METRIC_VARIANTS_HEADER: &str = "Metric wrong versions";
const COMPLEX_VARIANTS_HEADER: &str = "Complex wrong versions";

/// Metric targets, their complex matches and beats of interest, in parallel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub metric: Vec<String>,
    pub complex: Vec<String>,
    pub beats_of_interest: Vec<String>,
}

pub fn load_config(path: &Path) -> Result<AnalysisConfig, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Cannot read config file '{}': {}", path.display(), e))?;
    serde_yaml::from_str(&content)
        .map_err(|e| format!("Cannot parse config file '{}': {}", path.display(), e))
}

pub fn render_assignments(assignments: &[Assignment]) -> String {
    assignments.iter().map(|a| format!("{a}\n")).collect()
}

pub fn parse_assignments(text: &str) -> Result<Vec<Assignment>, String> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(str::parse)
        .collect()
}

/// Write `<dir>/<sequence>.txt` with one assignment per line.
pub fn write_match_file(dir: &Path, sequence: &Sequence, assignments: &[Assignment]) -> Result<PathBuf, String> {
    let path = dir.join(format!("{sequence}.txt"));
    fs::write(&path, render_assignments(assignments))
        .map_err(|e| format!("Error writing {}: {}", path.display(), e))?;
    Ok(path)
}

/// Read every match file in `dir`, in file name order, skipping the summary
/// and variant files.
pub fn read_match_dir(dir: &Path) -> Result<Vec<Assignment>, String> {
    let entries = fs::read_dir(dir).map_err(|e| format!("Cannot list '{}': {}", dir.display(), e))?;
    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "txt"))
        .filter(|p| {
            p.file_name()
                .is_some_and(|name| name != SUMMARY_FILE && name != VARIANTS_FILE)
        })
        .collect();
    paths.sort();

    let mut all = Vec::new();
    for path in paths {
        let content = fs::read_to_string(&path)
            .map_err(|e| format!("Cannot read '{}': {}", path.display(), e))?;
        let parsed = parse_assignments(&content).map_err(|e| format!("{}: {}", path.display(), e))?;
        all.extend(parsed);
    }
    Ok(all)
}

pub fn summarize(assignments: &[Assignment]) -> Summary {
    Summary {
        metric: assignments.iter().map(|a| a.target.clone()).collect(),
        complex: assignments.iter().map(|a| a.matched.clone()).collect(),
        beats_of_interest: assignments.iter().map(|a| a.beat_of_interest.to_string()).collect(),
    }
}

pub fn render_summary(summary: &Summary) -> String {
    let mut out = format!("{METRIC_HEADER}\n\n");
    for s in &summary.metric {
        out.push_str(&format!("{s}\n"));
    }
    out.push_str(&format!("\n{COMPLEX_HEADER}\n\n"));
    for s in &summary.complex {
        out.push_str(&format!("{s}\n"));
    }
    out.push_str(&format!("\n{BOI_HEADER}\n"));
    for s in &summary.beats_of_interest {
        out.push_str(&format!("{s}\n"));
    }
    out
}

pub fn parse_summary(text: &str) -> Result<Summary, String> {
    let mut summary = Summary::default();
    let mut section: Option<&mut Vec<String>> = None;
    let mut headers_seen = 0;

    for line in text.lines().map(str::trim) {
        match line {
            "" => {}
            METRIC_HEADER => {
                section = Some(&mut summary.metric);
                headers_seen += 1;
            }
            COMPLEX_HEADER => {
                section = Some(&mut summary.complex);
                headers_seen += 1;
            }
            BOI_HEADER => {
                section = Some(&mut summary.beats_of_interest);
                headers_seen += 1;
            }
            value => match section.as_deref_mut() {
                Some(list) => list.push(value.to_string()),
                None => return Err(format!("line '{value}' before any section header")),
            },
        }
    }

    if headers_seen == 0 {
        return Err("no summary sections found".to_string());
    }
    Ok(summary)
}

pub fn render_variants(metric: &[Sequence], complex: &[Sequence]) -> String {
    let mut out = format!("{METRIC_VARIANTS_HEADER}\n\n");
    for s in metric {
        out.push_str(&format!("{s}\n"));
    }
    out.push_str(&format!("\n{COMPLEX_VARIANTS_HEADER}\n\n"));
    for s in complex {
        out.push_str(&format!("{s}\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Assignment> {
        vec![
            Assignment {
                target: "211314".to_string(),
                matched: "214131".to_string(),
                beat_of_interest: 9,
            },
            Assignment {
                target: "211431".to_string(),
                matched: "211341".to_string(),
                beat_of_interest: 5,
            },
        ]
    }

    #[test]
    fn test_render_and_parse_assignments() {
        let text = render_assignments(&sample());
        assert_eq!(text, "211314:214131;9\n211431:211341;5\n");
        assert_eq!(parse_assignments(&text).unwrap(), sample());
        assert!(parse_assignments("211314;214131:9\n").is_err());
    }

    #[test]
    fn test_summary_layout() {
        let text = render_summary(&summarize(&sample()));
        assert_eq!(
            text,
            "Metric Simples\n\n211314\n211431\n\nComplexsequences\n\n214131\n211341\n\nBeats of Interest\n9\n5\n"
        );
        let parsed = parse_summary(&text).unwrap();
        assert_eq!(parsed.metric, vec!["211314", "211431"]);
        assert_eq!(parsed.complex, vec!["214131", "211341"]);
        assert_eq!(parsed.beats_of_interest, vec!["9", "5"]);
        assert!(parse_summary("211314\n").is_err());
    }

    #[test]
    fn test_match_dir_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let s: Sequence = "211314".parse().unwrap();
        let path = write_match_file(dir.path(), &s, &sample()).unwrap();
        assert_eq!(path, dir.path().join("211314.txt"));

        fs::write(dir.path().join(SUMMARY_FILE), "Metric Simples\n\n").unwrap();
        fs::write(dir.path().join("notes.md"), "ignored").unwrap();

        let read = read_match_dir(dir.path()).unwrap();
        assert_eq!(read, sample());
    }

    #[test]
    fn test_load_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("analysis.yml");
        fs::write(
            &path,
            "matching:\n  beats_of_interest: [9]\n  threshold: 0.6\nbudget: 500000\nseed: 17\nexhaustive: false\n",
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.matching.beats_of_interest, vec![9]);
        assert_eq!(config.matching.threshold, 0.6);
        assert_eq!(config.budget, Some(500000));
        assert!(!config.exhaustive);
        assert_eq!(config.metric.basegroup, 4);
        assert_eq!(config.seed, 17);

        assert!(load_config(&dir.path().join("missing.yml")).is_err());
    }

    #[test]
    fn test_render_variants() {
        let metric: Vec<Sequence> = vec!["211413".parse().unwrap()];
        let complex: Vec<Sequence> = vec!["241131".parse().unwrap(), "123114".parse().unwrap()];
        assert_eq!(
            render_variants(&metric, &complex),
            "Metric wrong versions\n\n211413\n\nComplex wrong versions\n\n241131\n123114\n"
        );
    }
}
