use quill_core::AnalysisReport;

/// Format a full analysis report as Markdown.
pub fn format_report(report: &AnalysisReport) -> String {
    let mut out = String::new();

    out.push_str("# Quill - Manuscript Analysis\n\n");

    out.push_str("## Scores\n\n");
    out.push_str("| Dimension | Score | Presence |\n");
    out.push_str("|-----------|-------|----------|\n");
    out.push_str(&format!(
        "| **Overall** | **{:.1}/100** | |\n",
        report.overall_score
    ));
    out.push_str(&format!("| Balance | {:.1}/100 | |\n", report.balance_score));
    for s in &report.dimension_scores {
        out.push_str(&format!(
            "| {} | {:.1}/100 | {} |\n",
            s.dimension, s.score, s.presence
        ));
    }

    if let Some(ref tier) = report.tier {
        out.push_str(&format!("\n## {tier}\n\n"));
        out.push_str("| Principle | Score |\n");
        out.push_str("|-----------|-------|\n");
        for p in &tier.principles {
            out.push_str(&format!("| {} | {:.1}/100 |\n", p.name, p.score));
        }
    }

    out.push_str(&format!(
        "\n## Summary\n\n- **Genre:** {}\n- **Words:** {}\n- **Sentences:** {}\n- **Paragraphs:** {}\n",
        report.genre, report.word_count, report.sentence_count, report.paragraph_count,
    ));
    if !report.strengths.is_empty() {
        let names: Vec<String> = report.strengths.iter().map(|d| d.to_string()).collect();
        out.push_str(&format!("- **Strengths:** {}\n", names.join(", ")));
    }
    if !report.weaknesses.is_empty() {
        let names: Vec<String> = report.weaknesses.iter().map(|d| d.to_string()).collect();
        out.push_str(&format!("- **Weaknesses:** {}\n", names.join(", ")));
    }

    out.push_str("\n## Details\n");
    for s in &report.dimension_scores {
        out.push_str(&format!("\n### {}\n\n", s.dimension));
        for detail in &s.details {
            out.push_str(&format!("- {}\n", detail.trim()));
        }
        if !s.sub_scores.is_empty() {
            out.push_str("\n| Element | Score |\n|---------|-------|\n");
            for sub in &s.sub_scores {
                out.push_str(&format!("| {} | {:.1} |\n", sub.name, sub.score));
            }
        }
    }

    if report.recommendations.is_empty() {
        out.push_str("\n## Recommendations\n\nNo recommendations.\n");
    } else {
        out.push_str("\n## Recommendations\n\n");
        for (i, rec) in report.recommendations.iter().enumerate() {
            out.push_str(&format!("{}. {rec}\n", i + 1));
        }
    }

    out.push('\n');
    out
}

/// Format a check result as Markdown. Returns (markdown, passed).
pub fn format_check(report: &AnalysisReport, min_score: f64) -> (String, bool) {
    let passed = report.overall_score >= min_score;
    let mut out = format_report(report);

    if passed {
        out.push_str("## Result\n\n**CHECK PASSED**\n");
    } else {
        out.push_str(&format!(
            "## Result\n\n**CHECK FAILED**: overall score {:.1} is below the minimum {:.1}\n",
            report.overall_score, min_score,
        ));
    }

    (out, passed)
}
