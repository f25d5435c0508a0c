use serde::{Deserialize, Serialize};

/// Spiritual-domain categories assigned to mined videos
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SpiritCategory {
    MeditationMindfulness,
    EasternPhilosophy,
    ChristianSpirituality,
    IslamicSpirituality,
    JewishSpirituality,
    HinduSpirituality,
    ConsciousnessExploration,
    PsychedelicSpirituality,
    AfterlifeExploration,
    ScienceAndSpirituality,
    General,
}

impl SpiritCategory {
    /// Human-readable label used in digests and display
    pub fn label(&self) -> &'static str {
        match self {
            SpiritCategory::MeditationMindfulness => "Meditation/Mindfulness practice",
            SpiritCategory::EasternPhilosophy => "Eastern philosophy",
            SpiritCategory::ChristianSpirituality => "Christian spirituality",
            SpiritCategory::IslamicSpirituality => "Islamic spirituality",
            SpiritCategory::JewishSpirituality => "Jewish spirituality",
            SpiritCategory::HinduSpirituality => "Hindu spirituality",
            SpiritCategory::ConsciousnessExploration => "Consciousness exploration",
            SpiritCategory::PsychedelicSpirituality => "Psychedelic spirituality",
            SpiritCategory::AfterlifeExploration => "Afterlife exploration",
            SpiritCategory::ScienceAndSpirituality => "Science and spirituality",
            SpiritCategory::General => "General spiritual content",
        }
    }
}

/// Per-category term lists, in match priority order.
///
/// The first category whose term list matches wins, so overlapping matches
/// resolve the same way on every run. `buddhis` is a deliberate stem that
/// catches both "Buddhism" and "Buddhist".
const CATEGORY_TERMS: &[(SpiritCategory, &[&str])] = &[
    (SpiritCategory::MeditationMindfulness, &["meditation", "mindfulness"]),
    (SpiritCategory::EasternPhilosophy, &["buddhis", "zen", "tao"]),
    (SpiritCategory::ChristianSpirituality, &["christian", "jesus", "bible", "faith"]),
    (SpiritCategory::IslamicSpirituality, &["islam", "muslim", "quran"]),
    (SpiritCategory::JewishSpirituality, &["judaism", "jewish", "torah"]),
    (SpiritCategory::HinduSpirituality, &["hindu", "vedanta", "yoga"]),
    (SpiritCategory::ConsciousnessExploration, &["consciousness", "awareness"]),
    (
        SpiritCategory::PsychedelicSpirituality,
        &["psychedelic", "plant medicine", "ayahuasca", "dmt"],
    ),
    (SpiritCategory::AfterlifeExploration, &["near death", "afterlife", "heaven"]),
    (SpiritCategory::ScienceAndSpirituality, &["science", "physics", "quantum"]),
];

/// Classify a video into a spiritual-domain category from its text fields.
///
/// Pure and total: every input maps to exactly one category, unknown or
/// empty text falls through to `General`. Matching is case-insensitive
/// substring search over the concatenated title and description.
pub fn categorize(title: &str, description: &str) -> SpiritCategory {
    let haystack = format!("{} {}", title, description).to_lowercase();

    for (category, terms) in CATEGORY_TERMS {
        if terms.iter().any(|term| haystack.contains(term)) {
            return *category;
        }
    }

    SpiritCategory::General
}
