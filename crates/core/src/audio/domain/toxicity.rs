use thiserror::Error;

pub const DEFAULT_TOXIC_LABEL: &str = "Toxic";
pub const DEFAULT_TOXICITY_THRESHOLD: f64 = 0.7;

#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("classifier request failed: {0}")]
    Request(String),
    #[error("classifier returned a malformed response: {0}")]
    MalformedResponse(String),
}

/// A single label prediction with its confidence score.
#[derive(Clone, Debug, PartialEq)]
pub struct Classification {
    pub label: String,
    pub score: f64,
}

/// Scores a word for toxicity.
pub trait ToxicityClassifier: Send + Sync {
    fn classify(&self, word: &str) -> Result<Classification, ClassifierError>;
}

/// Outcome of judging one word. `Unavailable` means the classifier could not
/// be consulted, which callers must treat as leaving the word uncensored
/// while still being able to count it separately from a clean verdict.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToxicityVerdict {
    Toxic,
    Clean,
    Unavailable,
}

impl ToxicityVerdict {
    pub fn is_toxic(self) -> bool {
        self == ToxicityVerdict::Toxic
    }
}

/// Applies the censorship policy on top of a classifier: a word is censored
/// only when the predicted label matches the configured toxic label and the
/// score is strictly above the threshold. Classifier failures never block
/// processing; the word passes through uncensored.
pub struct ToxicityJudge {
    classifier: Option<Box<dyn ToxicityClassifier>>,
    toxic_label: String,
    threshold: f64,
}

impl ToxicityJudge {
    pub fn new(classifier: Option<Box<dyn ToxicityClassifier>>) -> Self {
        Self {
            classifier,
            toxic_label: DEFAULT_TOXIC_LABEL.to_string(),
            threshold: DEFAULT_TOXICITY_THRESHOLD,
        }
    }

    pub fn with_policy(
        classifier: Option<Box<dyn ToxicityClassifier>>,
        toxic_label: impl Into<String>,
        threshold: f64,
    ) -> Self {
        Self {
            classifier,
            toxic_label: toxic_label.into(),
            threshold,
        }
    }

    pub fn has_classifier(&self) -> bool {
        self.classifier.is_some()
    }

    pub fn assess(&self, word: &str) -> ToxicityVerdict {
        if word.trim().is_empty() {
            return ToxicityVerdict::Clean;
        }
        let Some(classifier) = &self.classifier else {
            return ToxicityVerdict::Unavailable;
        };
        match classifier.classify(word) {
            Ok(classification) => {
                if classification.label == self.toxic_label && classification.score > self.threshold
                {
                    ToxicityVerdict::Toxic
                } else {
                    ToxicityVerdict::Clean
                }
            }
            Err(e) => {
                log::warn!("Toxicity check failed for a word, leaving it uncensored: {e}");
                ToxicityVerdict::Unavailable
            }
        }
    }

    pub fn is_toxic(&self, word: &str) -> bool {
        self.assess(word).is_toxic()
    }
}
