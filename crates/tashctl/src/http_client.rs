//! HTTP client for communicating with the tashd daemon.

use anyhow::{anyhow, Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tash_common::schema::{
    ChecklistMutation, ConsultRequest, ConsultResponse, ConsultationCase, CreateCaseRequest,
    HealthResponse, ProgressResponse, RequestTemplate, Soldier, SoldierProfile, StatusChange,
    Track,
};

const DEFAULT_URL: &str = "http://127.0.0.1:7895";

/// Client for the daemon's HTTP API
pub struct DaemonClient {
    base_url: String,
    http: reqwest::Client,
}

impl DaemonClient {
    /// Discover the daemon URL: $TASHD_URL, then the default localhost port.
    pub fn new() -> Result<Self> {
        let base_url = std::env::var("TASHD_URL").unwrap_or_else(|_| DEFAULT_URL.to_string());
        let http = reqwest::Client::builder()
            // Consult calls wait on the model; everything else is local.
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self { base_url, http })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Daemon unavailable at {}", self.base_url))?;
        Self::decode(response).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .with_context(|| format!("Daemon unavailable at {}", self.base_url))?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if status == reqwest::StatusCode::CONFLICT {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!(
                "The case changed under you: {}. Re-run the command to retry on the fresh revision.",
                body
            ));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Daemon returned {}: {}", status, body));
        }
        Ok(response.json().await?)
    }

    pub async fn health(&self) -> Result<HealthResponse> {
        self.get_json("/v1/health").await
    }

    pub async fn consult(
        &self,
        text: &str,
        profile: Option<SoldierProfile>,
    ) -> Result<ConsultResponse> {
        let request = ConsultRequest {
            text: text.to_string(),
            soldier_profile: profile,
        };
        self.post_json("/v1/consult", &request).await
    }

    pub async fn list_templates(&self) -> Result<Vec<RequestTemplate>> {
        self.get_json("/v1/templates").await
    }

    pub async fn search_templates(&self, query: &str) -> Result<Vec<RequestTemplate>> {
        self.get_json(&format!("/v1/templates/search?q={}", urlencode(query)))
            .await
    }

    pub async fn get_template(&self, id: &str) -> Result<RequestTemplate> {
        self.get_json(&format!("/v1/templates/{}", id)).await
    }

    pub async fn create_case(&self, request: &CreateCaseRequest) -> Result<ConsultationCase> {
        self.post_json("/v1/cases", request).await
    }

    pub async fn get_case(&self, id: &str) -> Result<ConsultationCase> {
        self.get_json(&format!("/v1/cases/{}", id)).await
    }

    pub async fn list_cases(
        &self,
        soldier_id: Option<&str>,
        active_only: bool,
    ) -> Result<Vec<ConsultationCase>> {
        let mut path = format!("/v1/cases?activeOnly={}", active_only);
        if let Some(soldier) = soldier_id {
            path.push_str(&format!("&soldierId={}", urlencode(soldier)));
        }
        self.get_json(&path).await
    }

    pub async fn toggle_item(
        &self,
        case_id: &str,
        track: Track,
        item_id: &str,
        rev: u64,
    ) -> Result<ConsultationCase> {
        let body = ChecklistMutation {
            track,
            item_id: Some(item_id.to_string()),
            text: None,
            rev,
        };
        self.post_json(&format!("/v1/cases/{}/checklist/toggle", case_id), &body)
            .await
    }

    pub async fn add_item(
        &self,
        case_id: &str,
        track: Track,
        text: &str,
        rev: u64,
    ) -> Result<ConsultationCase> {
        let body = ChecklistMutation {
            track,
            item_id: None,
            text: Some(text.to_string()),
            rev,
        };
        self.post_json(&format!("/v1/cases/{}/checklist/add", case_id), &body)
            .await
    }

    pub async fn delete_item(
        &self,
        case_id: &str,
        track: Track,
        item_id: &str,
        rev: u64,
    ) -> Result<ConsultationCase> {
        let body = ChecklistMutation {
            track,
            item_id: Some(item_id.to_string()),
            text: None,
            rev,
        };
        self.post_json(&format!("/v1/cases/{}/checklist/delete", case_id), &body)
            .await
    }

    pub async fn set_status(&self, case_id: &str, change: &StatusChange) -> Result<ConsultationCase> {
        self.post_json(&format!("/v1/cases/{}/status", case_id), change)
            .await
    }

    pub async fn progress(&self, case_id: &str) -> Result<ProgressResponse> {
        self.get_json(&format!("/v1/cases/{}/progress", case_id)).await
    }

    pub async fn get_soldier(&self, id: &str) -> Result<Soldier> {
        self.get_json(&format!("/v1/soldiers/{}", id)).await
    }
}

/// Minimal percent-encoding for query values.
fn urlencode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for b in value.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urlencode() {
        assert_eq!(urlencode("rent help"), "rent%20help");
        assert_eq!(urlencode("s-1"), "s-1");
        assert_eq!(urlencode("a/b"), "a%2Fb");
    }
}
