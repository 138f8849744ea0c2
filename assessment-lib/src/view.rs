use crate::config::AppConfig;
use crate::decoder::decode_payload;
use crate::query::{query_param, PROFILE_PARAM};
use crate::types::*;
use serde::Serialize;
use tracing::warn;

/// A page state shown instead of results, with exactly one way out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fallback {
    pub title: String,
    pub message: String,
    pub action_label: String,
    pub action_href: String,
}

impl Fallback {
    pub fn not_found(start_path: &str) -> Self {
        Fallback {
            title: "Assessment Results Not Found".to_string(),
            message: "We couldn't find your assessment results. Please start a new assessment."
                .to_string(),
            action_label: "Start Assessment".to_string(),
            action_href: start_path.to_string(),
        }
    }

    pub fn error_loading(start_path: &str) -> Self {
        Fallback {
            title: "Error Loading Results".to_string(),
            message: "There was a problem loading your assessment results. Please try again."
                .to_string(),
            action_label: "Start Over".to_string(),
            action_href: start_path.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum ResultsView {
    Results { profile: ProfileRecord },
    NotFound(Fallback),
    ErrorLoading(Fallback),
}

impl ResultsView {
    pub fn is_fallback(&self) -> bool {
        !matches!(self, ResultsView::Results { .. })
    }

    pub fn fallback(&self) -> Option<&Fallback> {
        match self {
            ResultsView::Results { .. } => None,
            ResultsView::NotFound(fallback) | ResultsView::ErrorLoading(fallback) => Some(fallback),
        }
    }

    pub fn to_json(&self) -> Result<String, PayloadError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Resolve the results page for a query string carrying `profile`.
pub fn results_view(config: &AppConfig, query: &str) -> ResultsView {
    view_for_outcome(config, decode_payload(query_param(query, PROFILE_PARAM)))
}

pub fn view_for_outcome(config: &AppConfig, outcome: DecodeOutcome) -> ResultsView {
    match outcome {
        DecodeOutcome::Success(profile) => ResultsView::Results { profile },
        DecodeOutcome::Failure(DecodeFailure::Missing) => {
            ResultsView::NotFound(Fallback::not_found(&config.start_path))
        }
        DecodeOutcome::Failure(DecodeFailure::ParseError(kind)) => {
            warn!(error = %kind, "failed to parse profile payload");
            ResultsView::ErrorLoading(Fallback::error_loading(&config.start_path))
        }
    }
}
