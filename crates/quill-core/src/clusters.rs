//! Keyword cluster tables.
//!
//! A `ClusterTable` is built once (built-in defaults plus any clusters from
//! `.quill.toml`) and shared read-only by every analysis.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::CustomClusterConfig;
use crate::matcher::MatchMode;

/// Family a cluster belongs to. Each analyzer reads one or more groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClusterGroup {
    Theme,
    Symbol,
    Conflict,
    Resolution,
    Sensory,
    Genre,
    FictionElement,
    TenseMarker,
    SceneIndicator,
    ActionVerb,
}

impl ClusterGroup {
    pub const ALL: [ClusterGroup; 10] = [
        ClusterGroup::Theme,
        ClusterGroup::Symbol,
        ClusterGroup::Conflict,
        ClusterGroup::Resolution,
        ClusterGroup::Sensory,
        ClusterGroup::Genre,
        ClusterGroup::FictionElement,
        ClusterGroup::TenseMarker,
        ClusterGroup::SceneIndicator,
        ClusterGroup::ActionVerb,
    ];

    /// Fiction element keywords are stems ("transform" also counts
    /// "transformed"); every other group needs exact words.
    pub fn match_mode(&self) -> MatchMode {
        match self {
            ClusterGroup::FictionElement => MatchMode::Stem,
            _ => MatchMode::WholeWord,
        }
    }
}

impl fmt::Display for ClusterGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ClusterGroup::Theme => "theme",
            ClusterGroup::Symbol => "symbol",
            ClusterGroup::Conflict => "conflict",
            ClusterGroup::Resolution => "resolution",
            ClusterGroup::Sensory => "sensory",
            ClusterGroup::Genre => "genre",
            ClusterGroup::FictionElement => "fiction-element",
            ClusterGroup::TenseMarker => "tense-marker",
            ClusterGroup::SceneIndicator => "scene-indicator",
            ClusterGroup::ActionVerb => "action-verb",
        };
        write!(f, "{name}")
    }
}

/// A named set of keywords or phrases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordCluster {
    pub name: String,
    pub keywords: Vec<String>,
}

impl KeywordCluster {
    pub fn new(name: &str, keywords: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// Immutable keyword configuration, grouped by `ClusterGroup`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterTable {
    groups: BTreeMap<ClusterGroup, Vec<KeywordCluster>>,
}

impl ClusterTable {
    /// A table with no clusters at all. Useful for tests.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in keyword tables.
    pub fn builtin() -> Self {
        let mut table = Self::empty();
        for (group, clusters) in BUILTIN {
            for (name, keywords) in clusters.iter() {
                table.push(*group, KeywordCluster::new(name, keywords));
            }
        }
        table
    }

    /// Builder-style insert.
    pub fn with_cluster(mut self, group: ClusterGroup, name: &str, keywords: &[&str]) -> Self {
        self.push(group, KeywordCluster::new(name, keywords));
        self
    }

    /// Add a cluster, merging keywords into an existing cluster of the same name.
    pub fn push(&mut self, group: ClusterGroup, cluster: KeywordCluster) {
        let clusters = self.groups.entry(group).or_default();
        match clusters.iter_mut().find(|c| c.name == cluster.name) {
            Some(existing) => {
                for kw in cluster.keywords {
                    if !existing.keywords.contains(&kw) {
                        existing.keywords.push(kw);
                    }
                }
            }
            None => clusters.push(cluster),
        }
    }

    /// Merge clusters declared in configuration. Empty clusters are skipped.
    pub fn extend_from_config(&mut self, custom: &[CustomClusterConfig]) {
        for cfg in custom {
            let keywords: Vec<String> = cfg
                .keywords
                .iter()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
                .collect();
            if keywords.is_empty() {
                tracing::warn!(
                    group = %cfg.group,
                    cluster = %cfg.name,
                    "ignoring keyword cluster with no keywords"
                );
                continue;
            }
            self.push(
                cfg.group,
                KeywordCluster {
                    name: cfg.name.clone(),
                    keywords,
                },
            );
        }
    }

    pub fn clusters(&self, group: ClusterGroup) -> &[KeywordCluster] {
        self.groups.get(&group).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn cluster(&self, group: ClusterGroup, name: &str) -> Option<&KeywordCluster> {
        self.clusters(group).iter().find(|c| c.name == name)
    }

    pub fn groups(&self) -> impl Iterator<Item = (ClusterGroup, &[KeywordCluster])> {
        self.groups.iter().map(|(g, c)| (*g, c.as_slice()))
    }
}

// Cluster names the analyzers look up.
pub const SCENE_ACTION: &str = "action";
pub const SEQUEL_REFLECTION: &str = "reflection";
pub const ACTION_VERBS: &str = "action-verbs";
pub const RESOLUTION: &str = "resolution";
pub const CONFLICT_INTERNAL: &str = "internal";
pub const CONFLICT_EXTERNAL: &str = "external";
pub const CONFLICT_INTERPERSONAL: &str = "interpersonal";
pub const SENSE_SIGHT: &str = "sight";
pub const SENSE_SOUND: &str = "sound";
pub const SENSE_TOUCH: &str = "touch";
pub const SENSE_SMELL: &str = "smell";
pub const SENSE_TASTE: &str = "taste";
pub const TENSE_PAST: &str = "past";
pub const TENSE_PRESENT: &str = "present";

type GroupTable = &'static [(ClusterGroup, &'static [(&'static str, &'static [&'static str])])];

const BUILTIN: GroupTable = &[
    (ClusterGroup::Theme, THEMES),
    (ClusterGroup::Symbol, SYMBOLS),
    (ClusterGroup::Conflict, CONFLICTS),
    (ClusterGroup::Resolution, RESOLUTIONS),
    (ClusterGroup::Sensory, SENSES),
    (ClusterGroup::Genre, GENRES),
    (ClusterGroup::FictionElement, FICTION_ELEMENTS),
    (ClusterGroup::TenseMarker, TENSES),
    (ClusterGroup::SceneIndicator, SCENE_INDICATORS),
    (ClusterGroup::ActionVerb, ACTION_VERB_TABLE),
];

type Table = &'static [(&'static str, &'static [&'static str])];

const THEMES: Table = &[
    (
        "Love & Connection",
        &[
            "love", "loved", "heart", "passion", "romance", "affection", "embrace", "kiss",
            "devotion", "tender", "beloved", "together",
        ],
    ),
    (
        "Death & Mortality",
        &[
            "death", "die", "died", "dying", "dead", "grave", "funeral", "mortal", "mourning",
            "corpse", "buried", "tomb",
        ],
    ),
    (
        "Power & Control",
        &[
            "power", "control", "command", "rule", "dominate", "authority", "throne", "obey",
            "crown", "tyrant", "submit", "empire",
        ],
    ),
    (
        "Identity & Self",
        &[
            "identity", "self", "who am i", "belong", "become", "true self", "stranger",
            "pretend", "mask", "myself", "disguise", "name",
        ],
    ),
    (
        "Freedom & Confinement",
        &[
            "freedom", "free", "cage", "prison", "escape", "trapped", "chains", "liberty",
            "locked", "release", "captive", "cell",
        ],
    ),
    (
        "Good & Evil",
        &[
            "good", "evil", "sin", "virtue", "wicked", "righteous", "demon", "angel", "devil",
            "holy", "cursed", "innocent",
        ],
    ),
    (
        "Hope & Despair",
        &[
            "hope", "despair", "fear", "dream", "wish", "doubt", "faith", "hopeless", "longing",
            "dread", "darkest", "promise",
        ],
    ),
    (
        "Coming of Age",
        &[
            "grow up", "grew up", "child", "young", "youth", "innocence", "school", "first time",
            "adult", "childhood", "teenager", "growing",
        ],
    ),
    (
        "Family & Legacy",
        &[
            "family", "mother", "father", "brother", "sister", "son", "daughter", "inheritance",
            "legacy", "ancestor", "heir", "bloodline",
        ],
    ),
    (
        "Nature & Environment",
        &[
            "nature", "forest", "river", "ocean", "storm", "earth", "wild", "tree", "mountain",
            "season", "wilderness", "meadow",
        ],
    ),
    (
        "Justice & Revenge",
        &[
            "justice", "revenge", "vengeance", "law", "guilt", "punishment", "fair", "crime",
            "judge", "avenge", "verdict", "trial",
        ],
    ),
    (
        "Truth & Deception",
        &[
            "truth", "lie", "lies", "lied", "secret", "secrets", "deceive", "betray", "honest",
            "hidden", "trust", "illusion",
        ],
    ),
];

const SYMBOLS: Table = &[
    (
        "Light & Darkness",
        &["light", "dark", "darkness", "shadow", "sun", "moon", "candle", "flame", "dawn"],
    ),
    (
        "Water",
        &["water", "rain", "sea", "tide", "flood", "tears", "well", "drown", "waves"],
    ),
    (
        "Journey & Threshold",
        &["road", "path", "journey", "door", "bridge", "gate", "map", "threshold", "crossroads"],
    ),
    (
        "Growth & Decay",
        &["seed", "flower", "rose", "bloom", "wither", "rot", "roots", "harvest", "winter"],
    ),
    (
        "Animals",
        &["bird", "wolf", "raven", "crow", "snake", "lion", "dove", "fox", "owl"],
    ),
    (
        "Objects & Keepsakes",
        &["mirror", "key", "ring", "clock", "letter", "photograph", "locket", "compass", "book"],
    ),
    (
        "Color",
        &["red", "white", "black", "gold", "golden", "silver", "crimson", "scarlet", "blue"],
    ),
];

const CONFLICTS: Table = &[
    (
        CONFLICT_INTERNAL,
        &[
            "doubt", "doubted", "guilt", "guilty", "torn", "conflicted", "hesitate", "hesitated",
            "regret", "shame", "anxiety", "uncertain", "afraid", "worried", "ashamed", "dilemma",
        ],
    ),
    (
        CONFLICT_EXTERNAL,
        &[
            "storm", "war", "battle", "attack", "attacked", "enemy", "enemies", "danger",
            "monster", "fire", "flood", "chase", "chased", "trap", "threat", "invaded",
        ],
    ),
    (
        CONFLICT_INTERPERSONAL,
        &[
            "argue", "argued", "argument", "fight", "fought", "betray", "betrayed", "rival",
            "jealous", "accused", "insult", "yelled", "refused", "blamed", "quarrel", "confront",
        ],
    ),
];

const RESOLUTIONS: Table = &[(
    RESOLUTION,
    &[
        "resolved", "forgave", "forgive", "forgiven", "peace", "agreed", "reconciled",
        "accepted", "apologized", "healed", "solved", "settled", "understood", "truce",
    ],
)];

const SENSES: Table = &[
    (
        SENSE_SIGHT,
        &[
            "saw", "see", "seen", "look", "looked", "watched", "glimpse", "glimpsed", "bright",
            "color", "colour", "gleam", "glow", "glowed", "stared", "glance", "shimmer",
        ],
    ),
    (
        SENSE_SOUND,
        &[
            "heard", "hear", "whisper", "whispered", "echo", "echoed", "loud", "quiet",
            "silence", "roar", "roared", "rang", "creak", "creaked", "hum", "hummed", "murmur",
        ],
    ),
    (
        SENSE_TOUCH,
        &[
            "touch", "touched", "rough", "smooth", "cold", "warm", "grip", "gripped", "gripping",
            "soft", "pressed", "texture", "brushed", "sting", "damp", "icy",
        ],
    ),
    (
        SENSE_SMELL,
        &[
            "smell", "smelled", "smelt", "scent", "odor", "odour", "aroma", "stench", "fragrance",
            "perfume", "reek", "musty", "sniffed",
        ],
    ),
    (
        SENSE_TASTE,
        &[
            "taste", "tasted", "sweet", "bitter", "sour", "salty", "flavor", "flavour", "savory",
            "tongue", "spicy", "tang",
        ],
    ),
];

const GENRES: Table = &[
    (
        "fantasy",
        &[
            "magic", "dragon", "sword", "spell", "kingdom", "wizard", "elf", "enchanted",
            "quest", "sorcerer",
        ],
    ),
    (
        "science-fiction",
        &[
            "ship", "planet", "robot", "laser", "galaxy", "android", "starship", "orbit",
            "alien", "colony",
        ],
    ),
    (
        "mystery",
        &[
            "detective", "clue", "murder", "suspect", "alibi", "evidence", "witness",
            "investigation", "culprit", "motive",
        ],
    ),
    (
        "romance",
        &[
            "kiss", "kissed", "lover", "wedding", "romance", "desire", "darling", "flirt",
            "date", "sweetheart",
        ],
    ),
    (
        "horror",
        &[
            "blood", "scream", "screamed", "ghost", "corpse", "haunted", "terror", "creature",
            "nightmare", "monster",
        ],
    ),
    (
        "thriller",
        &[
            "gun", "agent", "bomb", "hostage", "conspiracy", "assassin", "target", "mission",
            "escape", "countdown",
        ],
    ),
    (
        "literary",
        &[
            "memory", "silence", "grief", "longing", "solitude", "childhood", "regret",
            "loneliness", "ordinary", "marriage",
        ],
    ),
];

// Stems: every keyword also matches its suffixed forms, so each entry must
// not be a prefix of unrelated common words.
const FICTION_ELEMENTS: Table = &[
    (
        "characters",
        &[
            "friend", "mother", "father", "brother", "sister", "woman", "women", "girl", "boy",
            "captain", "stranger", "neighbor", "husband", "wife", "child",
        ],
    ),
    (
        "setting",
        &[
            "room", "house", "street", "forest", "city", "village", "mountain", "river", "kitchen",
            "castle", "road", "field", "window", "hallway", "cottage",
        ],
    ),
    (
        "atmosphere",
        &["rain", "snow", "breeze", "fog", "haze", "sunlight", "moonlight", "thunder", "dusk"],
    ),
    (
        "time",
        &[
            "morning", "night", "yesterday", "tomorrow", "hour", "minute", "midnight", "dawn",
            "evening", "afternoon", "week", "month", "year", "season", "decade",
        ],
    ),
    (
        "plot",
        &[
            "discover", "decide", "reveal", "scheme", "journey", "adventure", "search", "return",
            "secret", "mission", "promise", "choice",
        ],
    ),
    (
        "turning-points",
        &["suddenly", "however", "until", "realiz", "unexpected", "twist", "betray", "finally"],
    ),
    (
        "conflict",
        &[
            "fight", "struggl", "against", "enemy", "threat", "danger", "warfare", "argu", "battle",
            "oppos", "rival", "attack",
        ],
    ),
    (
        "stakes",
        &["lose", "risk", "surviv", "sacrific", "rescue", "doom", "deadline", "consequence"],
    ),
    (
        "theme",
        &[
            "love", "death", "truth", "freedom", "power", "hope", "identity", "justice", "family",
            "faith", "loss", "redemption",
        ],
    ),
    (
        "interiority",
        &["thought", "wonder", "rememb", "realis", "imagin", "believ", "felt", "knew"],
    ),
    (
        "structure",
        &[
            "chapter", "begin", "meanwhile", "later", "afterward", "earlier",
            "prologue", "epilogue", "first", "next",
        ],
    ),
    (
        "pacing",
        &[
            "quick", "immediate", "rush", "hurr", "slow", "paus", "linger", "instant", "sprint",
            "abrupt",
        ],
    ),
    (
        "action",
        &[
            "leap", "jump", "grabb", "slamm", "chase", "chasing", "punch", "kick", "climb",
            "swung", "threw", "dodg",
        ],
    ),
    (
        "worldbuilding",
        &[
            "kingdom", "empire", "culture", "tradition", "legend", "magic", "technolog", "ancient",
            "council", "religio", "custom", "realm",
        ],
    ),
    (
        "emotion-positive",
        &["joy", "happy", "happi", "delight", "laugh", "smil", "grateful", "proud", "reliev", "cheer"],
    ),
    (
        "emotion-negative",
        &[
            "fear", "anger", "angr", "grief", "sadly", "sadness", "tears", "crying", "cried",
            "despair", "lonel", "terrif",
        ],
    ),
];

const TENSES: Table = &[
    (
        TENSE_PAST,
        &["was", "were", "had", "did", "went", "said", "came", "saw", "thought", "felt"],
    ),
    (
        TENSE_PRESENT,
        &["is", "are", "am", "has", "does", "goes", "says", "comes", "sees", "thinks", "feels"],
    ),
];

const SCENE_INDICATORS: Table = &[
    (
        SCENE_ACTION,
        &[
            "ran", "run", "running", "jumped", "grabbed", "fought", "shouted", "storm", "chased",
            "struck", "slammed", "rushed", "fled", "attacked", "exploded", "crashed", "fired",
            "raced", "burst", "kicked", "punched", "screamed", "thundered", "charged",
        ],
    ),
    (
        SEQUEL_REFLECTION,
        &[
            "thought", "wondered", "remembered", "realized", "felt", "considered", "decided",
            "reflected", "pondered", "wished", "knew", "believed", "regretted", "hoped",
            "imagined", "sighed", "understood", "recalled",
        ],
    ),
];

const ACTION_VERB_TABLE: Table = &[(
    ACTION_VERBS,
    &[
        "ran", "jumped", "grabbed", "fought", "struck", "slammed", "rushed", "fled", "attacked",
        "climbed", "threw", "kicked", "punched", "dodged", "chased", "pushed", "pulled", "raced",
        "swung", "charged", "dashed", "sprinted", "leaped", "tackled",
    ],
)];
