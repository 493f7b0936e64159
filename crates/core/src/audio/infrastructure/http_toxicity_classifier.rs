use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::audio::domain::toxicity::{Classification, ClassifierError, ToxicityClassifier};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Serialize)]
struct ClassifyRequest<'a> {
    inputs: &'a str,
}

#[derive(Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

/// Text-classification endpoints answer either a flat list of label scores
/// or one list per input.
#[derive(Deserialize)]
#[serde(untagged)]
enum ClassifyResponse {
    Nested(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
}

/// Toxicity classifier backed by a hosted text-classification endpoint.
///
/// Posts one word per request and keeps the highest-scoring label. Requests
/// carry a hard timeout so a stalled endpoint degrades into the fail-open
/// path instead of hanging the caller.
pub struct HttpToxicityClassifier {
    client: reqwest::blocking::Client,
    endpoint: String,
    api_token: Option<String>,
}

impl HttpToxicityClassifier {
    pub fn new(endpoint: impl Into<String>, api_token: Option<String>) -> Self {
        Self {
            client: reqwest::blocking::Client::builder()
                .timeout(DEFAULT_REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            endpoint: endpoint.into(),
            api_token,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl ToxicityClassifier for HttpToxicityClassifier {
    fn classify(&self, word: &str) -> Result<Classification, ClassifierError> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&ClassifyRequest { inputs: word });
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .map_err(|e| ClassifierError::Request(e.to_string()))?;
        if !response.status().is_success() {
            return Err(ClassifierError::Request(format!(
                "server returned {}",
                response.status()
            )));
        }

        let parsed: ClassifyResponse = response
            .json()
            .map_err(|e| ClassifierError::MalformedResponse(e.to_string()))?;
        top_classification(parsed)
    }
}

fn top_classification(response: ClassifyResponse) -> Result<Classification, ClassifierError> {
    let scores = match response {
        ClassifyResponse::Nested(mut nested) => {
            if nested.is_empty() {
                Vec::new()
            } else {
                nested.remove(0)
            }
        }
        ClassifyResponse::Flat(flat) => flat,
    };

    scores
        .into_iter()
        .max_by(|a, b| a.score.total_cmp(&b.score))
        .map(|top| Classification {
            label: top.label,
            score: top.score,
        })
        .ok_or_else(|| ClassifierError::MalformedResponse("no classifications returned".to_string()))
}
