// gemini integration - turns source code into an audit report

use crate::Error;
use serde::{Deserialize, Serialize};

const MODEL: &str = "gemini-2.5-flash";
const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct Gemini {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

// what we send to gemini
#[derive(Serialize)]
struct Request {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

// what gemini sends back
#[derive(Deserialize)]
struct Response {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default, rename = "promptFeedback")]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
struct PromptFeedback {
    #[serde(default, rename = "blockReason")]
    block_reason: Option<String>,
}

#[derive(Deserialize)]
struct Candidate {
    content: ReplyContent,
}

#[derive(Deserialize)]
struct ReplyContent {
    #[serde(default)]
    parts: Vec<ReplyPart>,
}

#[derive(Deserialize)]
struct ReplyPart {
    #[serde(default)]
    text: String,
}

impl Gemini {
    pub fn new(api_key: Option<String>) -> Result<Self, Error> {
        // explicit key wins, otherwise check the env
        let api_key = match api_key {
            Some(k) => k,
            None => std::env::var("GEMINI_API_KEY").map_err(|_| Error::MissingApiKey)?,
        };

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: API_BASE.to_string(),
        })
    }

    /// Point the client at a different API host. Used by tests.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub async fn audit(&self, code: &str) -> Result<String, Error> {
        let request = Request {
            contents: vec![Content {
                parts: vec![Part {
                    text: audit_prompt(code),
                }],
            }],
        };

        let url = format!("{}/models/{}:generateContent", self.base_url, MODEL);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let error = response.text().await?;
            return Err(Error::Gemini(error));
        }

        let Response {
            candidates,
            prompt_feedback,
        } = response.json().await?;

        // a 200 with no candidates means the prompt was blocked, not audited
        let Some(candidate) = candidates.first() else {
            let reason = prompt_feedback
                .and_then(|f| f.block_reason)
                .unwrap_or_else(|| "response contained no candidates".to_string());
            return Err(Error::Gemini(reason));
        };

        // a candidate can split its reply across parts, stitch them back together
        let report = candidate
            .content
            .parts
            .iter()
            .map(|p| p.text.as_str())
            .collect::<String>();

        Ok(report)
    }
}

// the submitted code goes in verbatim, untouched
pub fn audit_prompt(code: &str) -> String {
    format!(
        "Act as a Senior Security Research Engineer. Perform a deep security audit on the following source code. \
         Identify vulnerabilities, rate their severity (Low/Medium/High/Critical), and provide fix recommendations. \
         Format the entire response in clean Markdown:\n\n{code}"
    )
}
