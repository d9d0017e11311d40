use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("store rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
}

impl StoreError {
    /// Turns a non-2xx store response into `Rejected`, pulling the human
    /// message out of the JSON error body when there is one.
    pub(crate) async fn from_response(response: reqwest::Response) -> StoreError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let message = extract_message(&body).unwrap_or(body);

        StoreError::Rejected { status, message }
    }
}

fn extract_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;

    // PostgREST says "message", GoTrue says "msg" or "error_description".
    ["message", "msg", "error_description"]
        .iter()
        .find_map(|key| value.get(key).and_then(|m| m.as_str()))
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::extract_message;

    #[test]
    fn reads_postgrest_message() {
        let body = r#"{"code":"42501","message":"permission denied"}"#;
        assert_eq!(extract_message(body), Some("permission denied".to_string()));
    }

    #[test]
    fn reads_gotrue_message() {
        let body = r#"{"msg":"email rate limit exceeded"}"#;
        assert_eq!(extract_message(body), Some("email rate limit exceeded".to_string()));
    }

    #[test]
    fn falls_through_on_plain_text() {
        assert_eq!(extract_message("Bad Gateway"), None);
        assert_eq!(extract_message(r#"{"code":"42501"}"#), None);
    }
}
