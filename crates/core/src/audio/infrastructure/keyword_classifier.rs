use crate::audio::domain::toxicity::{
    Classification, ClassifierError, ToxicityClassifier, DEFAULT_TOXIC_LABEL,
};

/// Offline classifier that flags words from a fixed list.
///
/// Matching is case-insensitive but otherwise exact, so `"damn"` does not
/// match `"damn!"`. Scores are binary: a listed word is fully toxic, any
/// other word fully clean.
pub struct KeywordClassifier {
    keywords: Vec<String>,
}

impl KeywordClassifier {
    pub fn new(keywords: &[String]) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }
}

impl ToxicityClassifier for KeywordClassifier {
    fn classify(&self, word: &str) -> Result<Classification, ClassifierError> {
        let hit = self.keywords.contains(&word.to_lowercase());
        Ok(Classification {
            label: if hit {
                DEFAULT_TOXIC_LABEL.to_string()
            } else {
                "NotToxic".to_string()
            },
            score: if hit { 1.0 } else { 0.0 },
        })
    }
}
