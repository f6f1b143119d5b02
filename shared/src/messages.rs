//! Message pools for the live nudge path
//!
//! The live path chooses a single message category from drift level and
//! trend, then picks one message uniformly at random from that category's
//! pool. Randomness goes through [`RandomSource`] so tests can pin the pick.

use crate::errors::ConfigError;
use crate::language::Language;
use crate::live::LiveDriftAnalysis;
use crate::models::{DriftLevel, TrendDirection};
use crate::nudges::NudgeTone;
use rand::{Rng, SeedableRng};
use rand_pcg::Mcg128Xsl64;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Source of uniform indices
pub trait RandomSource {
    /// Index in `0..len`; `len` is never zero
    fn next_index(&mut self, len: usize) -> usize;
}

/// PCG-backed random source; seed it for reproducible picks
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: Mcg128Xsl64,
}

impl SeededRandom {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: Mcg128Xsl64::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: Mcg128Xsl64::from_entropy(),
        }
    }

    /// Seeded when `seed` is set, otherwise from entropy
    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::from_seed(seed),
            None => Self::from_entropy(),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }
}

/// Message category for the live path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageCategory {
    Encouragement,
    GentleReminder,
    Supportive,
    Celebration,
}

impl MessageCategory {
    pub const ALL: [MessageCategory; 4] = [
        MessageCategory::Encouragement,
        MessageCategory::GentleReminder,
        MessageCategory::Supportive,
        MessageCategory::Celebration,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MessageCategory::Encouragement => "encouragement",
            MessageCategory::GentleReminder => "gentle_reminder",
            MessageCategory::Supportive => "supportive",
            MessageCategory::Celebration => "celebration",
        }
    }

    pub fn tone(&self) -> NudgeTone {
        match self {
            MessageCategory::Celebration => NudgeTone::Celebratory,
            MessageCategory::Encouragement => NudgeTone::Warm,
            MessageCategory::GentleReminder => NudgeTone::Gentle,
            MessageCategory::Supportive => NudgeTone::Understanding,
        }
    }

    /// Category for a drift level and trend
    pub fn select(level: DriftLevel, trend: TrendDirection) -> Self {
        match (level, trend) {
            (DriftLevel::None, TrendDirection::Improving) => MessageCategory::Celebration,
            (DriftLevel::None | DriftLevel::Mild, _) => MessageCategory::Encouragement,
            (DriftLevel::Moderate, _) => MessageCategory::GentleReminder,
            (DriftLevel::Significant, _) => MessageCategory::Supportive,
        }
    }
}

impl fmt::Display for MessageCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single nudge produced by the live path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedMessage {
    pub message: String,
    #[serde(rename = "type")]
    pub category: MessageCategory,
    pub tone: NudgeTone,
    pub language: Language,
}

/// Per-category, per-language message pools
#[derive(Debug, Clone)]
pub struct MessagePools {
    pools: HashMap<(MessageCategory, Language), Vec<String>>,
}

impl MessagePools {
    /// Build pools, requiring a non-empty English pool for every category
    pub fn new(pools: HashMap<(MessageCategory, Language), Vec<String>>) -> Result<Self, ConfigError> {
        for category in MessageCategory::ALL {
            let has_english = pools
                .get(&(category, Language::En))
                .map(|p| !p.is_empty())
                .unwrap_or(false);
            if !has_english {
                return Err(ConfigError::EmptyMessagePool(category.to_string()));
            }
        }
        Ok(Self { pools })
    }

    /// Pool for a category, falling back to English when the language is missing
    pub fn pool(&self, category: MessageCategory, language: Language) -> &[String] {
        match self.pools.get(&(category, language)) {
            Some(pool) if !pool.is_empty() => pool,
            _ => self
                .pools
                .get(&(category, Language::En))
                .map(Vec::as_slice)
                .unwrap_or(&[]),
        }
    }

    /// Choose the category for `analysis` and draw one message from its pool
    pub fn select(
        &self,
        analysis: &LiveDriftAnalysis,
        language: Language,
        random: &mut impl RandomSource,
    ) -> SelectedMessage {
        let category = MessageCategory::select(analysis.drift_level, analysis.trend);
        let pool = self.pool(category, language);
        let message = if pool.is_empty() {
            String::new()
        } else {
            pool[random.next_index(pool.len()).min(pool.len() - 1)].clone()
        };

        SelectedMessage {
            message,
            category,
            tone: category.tone(),
            language,
        }
    }

    /// Built-in English, Spanish and Hindi pools
    pub fn builtin() -> Self {
        let entries: [(MessageCategory, Language, [&str; 3]); 12] = [
            (MessageCategory::Encouragement, Language::En, [
                "You're doing a wonderful job staying consistent. Every small step matters!",
                "Your dedication to self-care is truly inspiring. Keep it up!",
                "We noticed you've been on track lately. That's amazing progress!",
            ]),
            (MessageCategory::Encouragement, Language::Es, [
                "¡Estás haciendo un trabajo maravilloso manteniéndote constante!",
                "Tu dedicación al autocuidado es verdaderamente inspiradora.",
                "Hemos notado que has estado en el buen camino. ¡Es un progreso increíble!",
            ]),
            (MessageCategory::Encouragement, Language::Hi, [
                "आप निरंतर रहने में अद्भुत काम कर रहे हैं। हर छोटा कदम मायने रखता है!",
                "आत्म-देखभाल के प्रति आपका समर्पण वास्तव में प्रेरणादायक है।",
                "हमने देखा कि आप हाल ही में सही रास्ते पर हैं। यह अद्भुत प्रगति है!",
            ]),
            (MessageCategory::GentleReminder, Language::En, [
                "Life gets busy sometimes. Would you like to log a quick update when you have a moment?",
                "We're here whenever you're ready. No pressure, just support.",
                "It's been a little quiet. Everything okay? We're here for you.",
            ]),
            (MessageCategory::GentleReminder, Language::Es, [
                "La vida se pone ocupada a veces. ¿Te gustaría registrar una actualización rápida?",
                "Estamos aquí cuando estés listo. Sin presión, solo apoyo.",
                "Ha estado un poco tranquilo. ¿Todo bien? Estamos aquí para ti.",
            ]),
            (MessageCategory::GentleReminder, Language::Hi, [
                "जीवन कभी-कभी व्यस्त हो जाता है। क्या आप एक त्वरित अपडेट लॉग करना चाहेंगे?",
                "जब भी आप तैयार हों, हम यहां हैं। कोई दबाव नहीं, बस समर्थन।",
                "थोड़ी शांति रही है। सब ठीक है? हम आपके लिए यहां हैं।",
            ]),
            (MessageCategory::Supportive, Language::En, [
                "Looks like your routine's been busy lately. Would a lighter plan for the next few days help?",
                "We understand routines can be challenging. How about we simplify things for now?",
                "Taking a step back is okay. Would you like us to adjust your daily goals?",
            ]),
            (MessageCategory::Supportive, Language::Es, [
                "Parece que tu rutina ha estado ocupada últimamente. ¿Te ayudaría un plan más ligero?",
                "Entendemos que las rutinas pueden ser desafiantes. ¿Qué tal si simplificamos las cosas?",
                "Está bien dar un paso atrás. ¿Te gustaría que ajustemos tus metas diarias?",
            ]),
            (MessageCategory::Supportive, Language::Hi, [
                "लगता है आपकी दिनचर्या व्यस्त रही है। क्या कुछ दिनों के लिए हल्की योजना मदद करेगी?",
                "हम समझते हैं कि दिनचर्या चुनौतीपूर्ण हो सकती है। चीजों को सरल बनाएं?",
                "एक कदम पीछे लेना ठीक है। क्या आप चाहेंगे कि हम आपके दैनिक लक्ष्यों को समायोजित करें?",
            ]),
            (MessageCategory::Celebration, Language::En, [
                "🎉 You're back on track! Your consistency is really shining through.",
                "Welcome back! We're so glad to see you engaging again.",
                "Your comeback is inspiring! Every effort counts.",
            ]),
            (MessageCategory::Celebration, Language::Es, [
                "🎉 ¡Estás de vuelta en el camino! Tu consistencia realmente brilla.",
                "¡Bienvenido de vuelta! Nos alegra mucho verte comprometido de nuevo.",
                "¡Tu regreso es inspirador! Cada esfuerzo cuenta.",
            ]),
            (MessageCategory::Celebration, Language::Hi, [
                "🎉 आप वापस रास्ते पर हैं! आपकी निरंतरता वास्तव में चमक रही है।",
                "वापसी पर स्वागत है! आपको फिर से जुड़े हुए देखकर खुशी हुई।",
                "आपकी वापसी प्रेरणादायक है! हर प्रयास मायने रखता है।",
            ]),
        ];

        let pools = entries
            .into_iter()
            .map(|(category, language, messages)| {
                (
                    (category, language),
                    messages.iter().map(|m| m.to_string()).collect(),
                )
            })
            .collect();

        Self { pools }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    /// Always returns the same index
    struct FixedIndex(usize);

    impl RandomSource for FixedIndex {
        fn next_index(&mut self, _len: usize) -> usize {
            self.0
        }
    }

    fn live(level: DriftLevel, trend: TrendDirection) -> LiveDriftAnalysis {
        let mut analysis = LiveDriftAnalysis::no_logs();
        analysis.drift_level = level;
        analysis.trend = trend;
        analysis
    }

    #[rstest]
    #[case(DriftLevel::None, TrendDirection::Improving, MessageCategory::Celebration, NudgeTone::Celebratory)]
    #[case(DriftLevel::None, TrendDirection::Stable, MessageCategory::Encouragement, NudgeTone::Warm)]
    #[case(DriftLevel::Mild, TrendDirection::Improving, MessageCategory::Encouragement, NudgeTone::Warm)]
    #[case(DriftLevel::Moderate, TrendDirection::Declining, MessageCategory::GentleReminder, NudgeTone::Gentle)]
    #[case(DriftLevel::Significant, TrendDirection::Improving, MessageCategory::Supportive, NudgeTone::Understanding)]
    fn test_category_selection(
        #[case] level: DriftLevel,
        #[case] trend: TrendDirection,
        #[case] category: MessageCategory,
        #[case] tone: NudgeTone,
    ) {
        let selected = MessagePools::builtin().select(&live(level, trend), Language::En, &mut FixedIndex(0));
        assert_eq!(selected.category, category);
        assert_eq!(selected.tone, tone);
    }

    #[test]
    fn test_fixed_index_picks_deterministically() {
        let pools = MessagePools::builtin();
        let analysis = live(DriftLevel::Significant, TrendDirection::Declining);
        let selected = pools.select(&analysis, Language::Es, &mut FixedIndex(2));
        assert_eq!(
            selected.message,
            "Está bien dar un paso atrás. ¿Te gustaría que ajustemos tus metas diarias?"
        );
        assert_eq!(selected.language, Language::Es);
    }

    #[test]
    fn test_same_seed_same_message() {
        let pools = MessagePools::builtin();
        let analysis = live(DriftLevel::Moderate, TrendDirection::Stable);
        let first: Vec<_> = {
            let mut random = SeededRandom::from_seed(42);
            (0..10).map(|_| pools.select(&analysis, Language::En, &mut random).message).collect()
        };
        let second: Vec<_> = {
            let mut random = SeededRandom::from_seed(42);
            (0..10).map(|_| pools.select(&analysis, Language::En, &mut random).message).collect()
        };
        assert_eq!(first, second);
        assert!(first
            .iter()
            .all(|m| pools.pool(MessageCategory::GentleReminder, Language::En).contains(m)));
    }

    #[test]
    fn test_missing_language_pool_falls_back_to_english() {
        let mut map = HashMap::new();
        for category in MessageCategory::ALL {
            map.insert((category, Language::En), vec![format!("{} en", category)]);
        }
        let pools = MessagePools::new(map).unwrap();
        let selected = pools.select(&live(DriftLevel::Mild, TrendDirection::Stable), Language::Hi, &mut FixedIndex(0));
        assert_eq!(selected.message, "encouragement en");
    }

    #[test]
    fn test_missing_english_pool_is_rejected() {
        let mut map = HashMap::new();
        map.insert((MessageCategory::Encouragement, Language::En), vec!["hi".to_string()]);
        let err = MessagePools::new(map).unwrap_err();
        assert_eq!(err, ConfigError::EmptyMessagePool("gentle_reminder".to_string()));
    }
}
