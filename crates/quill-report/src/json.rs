use serde::Serialize;

use quill_core::AnalysisReport;

/// Format a full analysis report as JSON.
pub fn format_report(report: &AnalysisReport, compact: bool) -> String {
    if compact {
        serde_json::to_string(report).expect("AnalysisReport should be serializable")
    } else {
        serde_json::to_string_pretty(report).expect("AnalysisReport should be serializable")
    }
}

/// Wrapper for check output that adds pass/fail metadata.
#[derive(Debug, Serialize)]
pub struct CheckOutput<'a> {
    #[serde(flatten)]
    pub report: &'a AnalysisReport,
    pub check: CheckStatus,
}

#[derive(Debug, Serialize)]
pub struct CheckStatus {
    pub passed: bool,
    pub min_score: f64,
    pub overall_score: f64,
}

/// Format a check result as JSON. Returns (json_string, passed).
pub fn format_check(report: &AnalysisReport, min_score: f64, compact: bool) -> (String, bool) {
    let passed = report.overall_score >= min_score;
    let output = CheckOutput {
        report,
        check: CheckStatus {
            passed,
            min_score,
            overall_score: report.overall_score,
        },
    };

    let json = if compact {
        serde_json::to_string(&output).expect("CheckOutput should be serializable")
    } else {
        serde_json::to_string_pretty(&output).expect("CheckOutput should be serializable")
    };

    (json, passed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::sample_report;
    use quill_core::ReportVariant;

    #[test]
    fn test_format_report_uses_stable_names() {
        let report = sample_report(ReportVariant::Standard);
        let json = format_report(&report, false);
        let parsed: serde_json::Value = serde_json::from_str(&json).expect("should be valid JSON");
        let dims = parsed["dimension_scores"].as_array().unwrap();
        assert_eq!(dims.len(), 7);
        assert_eq!(dims[0]["dimension"], "Fiction Elements");
        assert_eq!(dims[0]["presence"], "strong");
        assert_eq!(dims[3]["dimension"], "Scene/Sequel Balance");
        assert_eq!(dims[4]["presence"], "absent");
        assert_eq!(parsed["word_count"], 10);
        assert_eq!(parsed["strengths"][0], "Scene/Sequel Balance");
        assert!(parsed.get("tier").is_none());
    }

    #[test]
    fn test_format_report_round_trips() {
        let report = sample_report(ReportVariant::Tier);
        let json = format_report(&report, true);
        assert!(!json.contains('\n'), "compact JSON should be single line");
        let back: AnalysisReport = serde_json::from_str(&json).expect("should deserialize");
        assert_eq!(back.dimension_scores.len(), 7);
        assert_eq!(back.tier.map(|t| t.principles.len()), Some(2));
    }

    #[test]
    fn test_format_check_flattens_report() {
        let report = sample_report(ReportVariant::Standard);
        let (json, passed) = format_check(&report, 90.0, false);
        assert!(!passed);
        let parsed: serde_json::Value = serde_json::from_str(&json).expect("should be valid JSON");
        assert_eq!(parsed["check"]["passed"], false);
        assert_eq!(parsed["check"]["min_score"], 90.0);
        assert!(parsed.get("dimension_scores").is_some());
        assert!(parsed.get("recommendations").is_some());
    }
}
