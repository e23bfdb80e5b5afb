use colored::{ColoredString, Colorize};

use quill_core::{AnalysisReport, DimensionScore, PresenceLevel};

const BAR_WIDTH: usize = 20;

/// Format a full analysis report for terminal output.
pub fn format_report(report: &AnalysisReport) -> String {
    let mut out = String::new();

    out.push_str(&format!("\n{}\n", "Quill - Manuscript Analysis".bold()));
    out.push_str(&format!("{}\n\n", "=".repeat(40)));

    out.push_str(&format!(
        "{}: {}/100\n",
        "Overall Score".bold(),
        colored_score(report.overall_score)
    ));
    out.push_str(&format!("  Balance:  {:.1}/100\n", report.balance_score));
    out.push_str(&format!("  Genre:    {}\n", report.genre));
    if let Some(ref tier) = report.tier {
        out.push_str(&format!("  {}: {tier}\n", "Tier".bold()));
        for p in &tier.principles {
            out.push_str(&format!("    {:<20} {:.1}/100\n", p.name, p.score));
        }
    }

    out.push_str(&format!(
        "\n{}: {} words, {} sentences, {} paragraphs\n",
        "Summary".bold(),
        report.word_count,
        report.sentence_count,
        report.paragraph_count,
    ));

    out.push_str(&format!("\n{}\n{}\n", "Dimensions".bold(), "-".repeat(40)));
    for score in &report.dimension_scores {
        out.push_str(&format_dimension(score));
    }

    if !report.strengths.is_empty() {
        let names: Vec<String> = report.strengths.iter().map(|d| d.to_string()).collect();
        out.push_str(&format!("\n{}: {}\n", "Strengths".green().bold(), names.join(", ")));
    }
    if !report.weaknesses.is_empty() {
        let names: Vec<String> = report.weaknesses.iter().map(|d| d.to_string()).collect();
        out.push_str(&format!("{}: {}\n", "Weaknesses".red().bold(), names.join(", ")));
    }

    if report.recommendations.is_empty() {
        out.push_str(&format!("\n{}\n", "No recommendations.".green().bold()));
    } else {
        out.push_str(&format!(
            "\n{}\n{}\n",
            "Recommendations".cyan().bold(),
            "-".repeat(40)
        ));
        for (i, rec) in report.recommendations.iter().enumerate() {
            out.push_str(&format!("  {}. {rec}\n", i + 1));
        }
    }

    out.push('\n');
    out
}

fn format_dimension(score: &DimensionScore) -> String {
    let mut out = format!(
        "\n  {} {:>5.1}  {}  {}\n",
        format!("{:<26}", score.dimension.to_string()).bold(),
        score.score,
        bar(score.score),
        presence_label(score.presence),
    );
    for detail in &score.details {
        out.push_str(&format!("    {detail}\n"));
    }
    for sub in &score.sub_scores {
        out.push_str(&format!("    - {:<16} {:>5.1}\n", sub.name, sub.score));
    }
    for insight in &score.insights {
        out.push_str(&format!("    {}: {insight}\n", "Suggestion".cyan()));
    }
    out
}

fn bar(score: f64) -> String {
    let filled = ((score / 100.0) * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    format!("{}{}", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

fn presence_label(presence: PresenceLevel) -> ColoredString {
    let label = presence.to_string();
    match presence {
        PresenceLevel::Strong => label.green(),
        PresenceLevel::Moderate => label.yellow(),
        PresenceLevel::Weak | PresenceLevel::Absent => label.red(),
    }
}

fn colored_score(score: f64) -> ColoredString {
    let s = format!("{score:.1}");
    if score >= 70.0 {
        s.green()
    } else if score >= 40.0 {
        s.yellow()
    } else {
        s.red()
    }
}

/// Format a check result for CI use. Returns (text, passed).
pub fn format_check(report: &AnalysisReport, min_score: f64) -> (String, bool) {
    let passed = report.overall_score >= min_score;
    let mut out = format_report(report);

    if passed {
        out.push_str(&format!("{}\n", "CHECK PASSED".green().bold()));
    } else {
        out.push_str(&format!(
            "{}: overall score {:.1} is below the minimum {:.1}\n",
            "CHECK FAILED".red().bold(),
            report.overall_score,
            min_score,
        ));
    }

    (out, passed)
}
