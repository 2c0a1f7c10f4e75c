//! Console summaries over the tabular log.
//!
//! Sentinel rows (negative scores) are excluded from every mean; they count
//! as failures, not as data points.

use crate::engine::RunReport;
use crate::model::TrialRow;
use anyhow::Context;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Default)]
pub struct Summary {
    pub total_rows: usize,
    pub sentinel_rows: usize,
    /// Mean voice accuracy per persona key, scored rows only.
    pub by_persona: BTreeMap<String, f64>,
    /// Mean voice accuracy per overlay label (control included as NONE).
    pub by_overlay: BTreeMap<String, f64>,
}

pub fn summarize(csv_path: &Path) -> anyhow::Result<Summary> {
    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to read {}", csv_path.display()))?;

    let mut summary = Summary::default();
    let mut persona_acc: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    let mut overlay_acc: BTreeMap<String, (f64, usize)> = BTreeMap::new();

    for row in reader.deserialize::<TrialRow>() {
        let row = row?;
        summary.total_rows += 1;
        if row.voice_accuracy < 0 {
            summary.sentinel_rows += 1;
            continue;
        }
        let p = persona_acc.entry(row.persona_key.clone()).or_default();
        p.0 += row.voice_accuracy as f64;
        p.1 += 1;
        let o = overlay_acc.entry(row.overlay.clone()).or_default();
        o.0 += row.voice_accuracy as f64;
        o.1 += 1;
    }

    summary.by_persona = persona_acc
        .into_iter()
        .map(|(k, (sum, n))| (k, sum / n as f64))
        .collect();
    summary.by_overlay = overlay_acc
        .into_iter()
        .map(|(k, (sum, n))| (k, sum / n as f64))
        .collect();
    Ok(summary)
}

pub fn print_summary(summary: &Summary) {
    println!("\n📈 Summary ({} rows, {} degraded)", summary.total_rows, summary.sentinel_rows);
    println!("\nVoice accuracy by persona:");
    for (persona, mean) in &summary.by_persona {
        println!("  {:<12} {:.2}", persona, mean);
    }
    println!("\nVoice accuracy by overlay:");
    for (overlay, mean) in &summary.by_overlay {
        println!("  {:<8} {:.2}", overlay, mean);
    }
}

pub fn print_completion(report: &RunReport, csv: &Path, jsonl: &Path) {
    println!(
        "\n✅ {} of {} expected trials logged ({} new, {} skipped, {} degraded)",
        report.completed, report.expected, report.executed, report.skipped, report.degraded
    );
    println!("   tabular: {}", csv.display());
    println!("   records: {}", jsonl.display());
    if !report.is_complete() {
        println!("   run again to fill in the remaining trials");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_log(rows: &[(&str, &str, i64)]) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            f,
            "persona_key,persona_name,overlay,assessed_type,type_match,use_overlay,\
             prompt_id,prompt,generated_text,voice_accuracy,style_marker_coverage,\
             persona_consistency,clarity,overfitting_to_mbti,rationales,cues"
        )
        .unwrap();
        for (persona, overlay, score) in rows {
            writeln!(
                f,
                "{},{},{},UNKNOWN,N/A,true,0,p,g,{},0.5,3,3,2,\"[]\",\"[]\"",
                persona, persona, overlay, score
            )
            .unwrap();
        }
        f
    }

    #[test]
    fn means_are_grouped_by_persona_and_overlay() {
        let f = write_log(&[
            ("plato", "INTJ", 4),
            ("plato", "INTJ", 2),
            ("austen", "NONE", 5),
        ]);
        let s = summarize(f.path()).unwrap();
        assert_eq!(s.total_rows, 3);
        assert_eq!(s.sentinel_rows, 0);
        assert_eq!(s.by_persona["plato"], 3.0);
        assert_eq!(s.by_persona["austen"], 5.0);
        assert_eq!(s.by_overlay["INTJ"], 3.0);
        assert_eq!(s.by_overlay["NONE"], 5.0);
    }

    #[test]
    fn sentinel_rows_are_counted_but_not_averaged() {
        let f = write_log(&[("plato", "INTJ", 4), ("plato", "INTJ", -1)]);
        let s = summarize(f.path()).unwrap();
        assert_eq!(s.total_rows, 2);
        assert_eq!(s.sentinel_rows, 1);
        assert_eq!(s.by_persona["plato"], 4.0);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(summarize(Path::new("/nonexistent/r.csv")).is_err());
    }
}
