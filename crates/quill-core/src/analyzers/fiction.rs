//! Fiction Elements: twelve craft sub-scores averaged into one dimension.
//!
//! Each sub-score is a sum of individually capped signals. Keyword signals
//! come from the stem-matched fiction element clusters.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use anyhow::Result;

use crate::analyzer::{AnalysisContext, DimensionAnalyzer};
use crate::clusters::{ClusterGroup, TENSE_PAST, TENSE_PRESENT};
use crate::document::{quoted_spans, Document};
use crate::matcher::ClusterMatches;
use crate::stats::{coefficient_of_variation, mean, std_dev};
use crate::types::{Dimension, DimensionScore, SubScore};

pub const EMOTIONAL_CORE: &str = "emotional_core";

/// Minority tense share above which narration counts as mixed.
const MIXED_TENSE_SHARE: f64 = 0.30;
/// Sentences at or under this many words count as short.
const SHORT_SENTENCE_WORDS: usize = 8;
const MAX_INSIGHTS: usize = 4;

const NAME_STOPLIST: &[&str] = &[
    "Mr", "Mrs", "Ms", "Dr", "Sir", "Miss", "Madam", "Lord", "Lady", "God", "OK",
];

/// One capped contribution to a sub-score.
struct Signal {
    label: &'static str,
    value: f64,
    cap: f64,
}

fn signal(label: &'static str, value: f64, cap: f64) -> Signal {
    Signal { label, value, cap }
}

fn sub_score(name: &str, signals: &[Signal]) -> SubScore {
    let raw: f64 = signals.iter().map(|s| s.value.max(0.0).min(s.cap)).sum();
    let details = signals
        .iter()
        .map(|s| format!("{}: {:.1} (max {:.0})", s.label, s.value.min(s.cap), s.cap))
        .collect();
    SubScore::new(name, raw.min(100.0), details)
}

/// Capitalized words that recur mid-sentence, with their counts.
///
/// Sentence-initial and quote-initial words are skipped.
pub fn proper_nouns(document: &Document) -> BTreeMap<String, usize> {
    let sentence_starts: HashSet<usize> = document.sentences().iter().map(|s| s.start).collect();
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for word in document.words() {
        if sentence_starts.contains(&word.start) {
            continue;
        }
        let Some(first) = word.text.chars().next() else {
            continue;
        };
        if !first.is_alphabetic() {
            continue;
        }
        let name: String = word.text.chars().take_while(|c| c.is_alphabetic()).collect();
        if name.chars().count() < 2
            || !first.is_uppercase()
            || name.chars().skip(1).all(char::is_uppercase)
            || NAME_STOPLIST.contains(&name.as_str())
        {
            continue;
        }
        *counts.entry(name).or_default() += 1;
    }
    counts.retain(|_, n| *n >= 2);
    counts
}

/// Tense signal and whether narration mixes past and present.
pub fn tense_consistency(past: usize, present: usize) -> (f64, bool) {
    let total = past + present;
    if total == 0 {
        return (0.0, false);
    }
    let minority = past.min(present) as f64 / total as f64;
    if minority > MIXED_TENSE_SHARE {
        (15.0, true)
    } else {
        (40.0, false)
    }
}

fn stylistic_punctuation(text: &str) -> usize {
    text.chars().filter(|c| matches!(c, '—' | '–' | ';' | '…')).count()
        + text.matches("...").count()
}

/// Hits per cluster of the genre group; the first cluster wins ties.
pub fn dominant_genre(genres: &ClusterMatches) -> Option<(&str, usize)> {
    let mut best: Option<(&str, usize)> = None;
    for hits in genres.iter() {
        let n = hits.occurrences.len();
        if n > 0 && best.map_or(true, |(_, b)| n > b) {
            best = Some((hits.cluster.as_str(), n));
        }
    }
    best
}

fn distinct_keywords(matches: &ClusterMatches, cluster: &str) -> usize {
    matches
        .get(cluster)
        .iter()
        .map(|o| o.keyword.as_str())
        .collect::<BTreeSet<_>>()
        .len()
}

fn advice(name: &str) -> &'static str {
    match name {
        "Characters" => "Characters barely register; name them and let them speak",
        "Setting" => "Setting is thin; anchor scenes in concrete places and weather",
        "Time" => "Time is vague or the tense wavers; mark when things happen and keep one tense",
        "Plot" => "Plot movement is faint; add discoveries, decisions and reversals",
        "Conflict" => "Little opposition on the page; give characters obstacles and something to lose",
        "Theme" => "Thematic language is sparse; let the central idea surface in key moments",
        "Voice" => "Voice is flat; vary sentence length and show the character's inner life",
        "Genre" => "Genre signals are weak; lean into the conventions readers expect",
        "Structure" => "Structure is hard to follow; use transitions and vary paragraph length",
        "Pacing" => "Pacing lacks contrast; mix short punchy sentences with quicker action",
        "Worldbuilding" => "The world feels generic; add customs, history and texture",
        _ => "Emotional range is narrow; let characters feel both highs and lows",
    }
}

pub struct FictionElementsAnalyzer;

impl DimensionAnalyzer for FictionElementsAnalyzer {
    fn dimension(&self) -> Dimension {
        Dimension::FictionElements
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Result<DimensionScore> {
        let doc = ctx.document;
        if doc.is_empty() || doc.sentence_count() == 0 {
            return Ok(DimensionScore::degenerate(
                Dimension::FictionElements,
                "No sentences to evaluate fiction elements",
            )
            .with_metric(EMOTIONAL_CORE, 0.0));
        }

        let fiction = ctx.index.group(ClusterGroup::FictionElement);
        let hits = |name: &str| fiction.count(name) as f64;

        let names = proper_nouns(doc);
        let quotes = quoted_spans(doc.text()).len();

        let tenses = ctx.index.group(ClusterGroup::TenseMarker);
        let (tense_signal, mixed_tense) =
            tense_consistency(tenses.count(TENSE_PAST), tenses.count(TENSE_PRESENT));

        let sentence_lengths: Vec<f64> =
            doc.sentences().iter().map(|s| s.word_count as f64).collect();
        let paragraph_lengths: Vec<f64> =
            doc.paragraphs().iter().map(|p| p.word_count as f64).collect();
        let short_share = doc
            .sentences()
            .iter()
            .filter(|s| s.word_count <= SHORT_SENTENCE_WORDS)
            .count() as f64
            / doc.sentence_count() as f64;

        let genres = ctx.index.group(ClusterGroup::Genre);
        let genre = dominant_genre(genres);
        let genre_hits = genre.map_or(0.0, |(_, n)| n as f64);
        let genre_words = genres
            .iter()
            .flat_map(|h| h.occurrences.iter().map(|o| o.keyword.as_str()))
            .collect::<BTreeSet<_>>()
            .len();

        let positive = hits("emotion-positive");
        let negative = hits("emotion-negative");
        let range = match (positive > 0.0, negative > 0.0) {
            (true, true) => 30.0,
            (false, false) => 0.0,
            _ => 15.0,
        };

        let sub_scores = vec![
            sub_score(
                "Characters",
                &[
                    signal("recurring names", names.len() as f64 * 10.0, 50.0),
                    signal("character references", hits("characters") * 2.0, 30.0),
                    signal("quoted passages", quotes as f64 * 2.0, 20.0),
                ],
            ),
            sub_score(
                "Setting",
                &[
                    signal("place references", hits("setting") * 3.0, 60.0),
                    signal("atmosphere", hits("atmosphere") * 4.0, 40.0),
                ],
            ),
            sub_score(
                "Time",
                &[
                    signal("time markers", hits("time") * 4.0, 60.0),
                    signal("tense consistency", tense_signal, 40.0),
                ],
            ),
            sub_score(
                "Plot",
                &[
                    signal("plot movement", hits("plot") * 2.0, 60.0),
                    signal("turning points", hits("turning-points") * 4.0, 40.0),
                ],
            ),
            sub_score(
                "Conflict",
                &[
                    signal("opposition", hits("conflict") * 4.0, 70.0),
                    signal("stakes", hits("stakes") * 3.0, 30.0),
                ],
            ),
            sub_score(
                "Theme",
                &[
                    signal("thematic language", hits("theme") * 3.0, 70.0),
                    signal(
                        "distinct thematic words",
                        distinct_keywords(fiction, "theme") as f64 * 10.0,
                        30.0,
                    ),
                ],
            ),
            sub_score(
                "Voice",
                &[
                    signal("sentence-length variety", std_dev(&sentence_lengths) * 5.0, 50.0),
                    signal("interiority", hits("interiority") * 3.0, 30.0),
                    signal(
                        "stylistic punctuation",
                        stylistic_punctuation(doc.text()) as f64 * 2.0,
                        20.0,
                    ),
                ],
            ),
            sub_score(
                "Genre",
                &[
                    signal("genre markers", genre_hits * 5.0, 70.0),
                    signal("genre vocabulary", genre_words as f64 * 6.0, 30.0),
                ],
            ),
            sub_score(
                "Structure",
                &[
                    signal("transitions", hits("structure") * 3.0, 60.0),
                    signal(
                        "paragraph variety",
                        coefficient_of_variation(&paragraph_lengths) * 100.0,
                        40.0,
                    ),
                ],
            ),
            sub_score(
                "Pacing",
                &[
                    signal("action beats", hits("action") * 2.0, 50.0),
                    signal("tempo words", hits("pacing") * 3.0, 30.0),
                    signal("short sentences", short_share * 40.0, 20.0),
                ],
            ),
            sub_score(
                "Worldbuilding",
                &[
                    signal("world references", hits("worldbuilding") * 3.0, 70.0),
                    signal(
                        "distinct world words",
                        distinct_keywords(fiction, "worldbuilding") as f64 * 3.0,
                        30.0,
                    ),
                ],
            ),
            sub_score(
                "Emotional Core",
                &[
                    signal("emotional language", (positive + negative) * 3.0, 70.0),
                    signal("emotional range", range, 30.0),
                ],
            ),
        ];

        let values: Vec<f64> = sub_scores.iter().map(|s| s.score).collect();
        let mut score = DimensionScore::new(Dimension::FictionElements, mean(&values));
        for sub in &sub_scores {
            let key = sub.name.to_lowercase().replace(' ', "_");
            score = score
                .with_detail(format!("{}: {:.0} ({})", sub.name, sub.score, sub.presence))
                .with_metric(&key, sub.score);
        }
        score = match genre {
            Some((name, n)) => score.with_detail(format!("Detected genre: {name} ({n} markers)")),
            None => score.with_detail("Detected genre: none"),
        };
        if !names.is_empty() {
            let listed: Vec<&str> = names.keys().map(String::as_str).take(8).collect();
            score = score.with_detail(format!("Recurring names: {}", listed.join(", ")));
        }
        if mixed_tense {
            score = score.with_detail("Narration mixes past and present tense");
        }

        let mut weakest: Vec<&SubScore> = sub_scores.iter().filter(|s| s.score < 40.0).collect();
        weakest.sort_by(|a, b| a.score.total_cmp(&b.score));
        for sub in weakest.into_iter().take(MAX_INSIGHTS) {
            score = score.with_insight(advice(&sub.name));
        }

        score.sub_scores = sub_scores;
        Ok(score)
    }
}
