use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::api::AppState;
use crate::error::{LontarError, Result};

/// `POST /chat` request body. Both fields are required; they are optional
/// here so a missing field yields the contract's 400 payload instead of a
/// deserialization rejection.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub conv_id: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub status: &'static str,
    pub conv_id: String,
    pub response: String,
}

pub async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>> {
    let conv_id = required_field(req.conv_id.as_deref())?;
    let message = required_field(req.message.as_deref())?;

    let response = state.chat.answer(message, conv_id).await?;

    Ok(Json(ChatResponse {
        status: "success",
        conv_id: conv_id.to_string(),
        response,
    }))
}

fn required_field(value: Option<&str>) -> Result<&str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| LontarError::Validation("conv_id dan message wajib diisi".to_string()))
}

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "chunks": state.index.len(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_request_deserializes_with_both_fields() {
        let req: ChatRequest =
            serde_json::from_str(r#"{"conv_id": "c1", "message": "halo"}"#).expect("deserialize");
        assert_eq!(req.conv_id.as_deref(), Some("c1"));
        assert_eq!(req.message.as_deref(), Some("halo"));
    }

    #[test]
    fn missing_fields_deserialize_to_none() {
        let req: ChatRequest = serde_json::from_str(r#"{"message": "halo"}"#).expect("deserialize");
        assert!(req.conv_id.is_none());
    }

    #[test]
    fn required_field_rejects_missing_and_blank_values() {
        assert!(required_field(None).is_err());
        assert!(required_field(Some("   ")).is_err());
        assert_eq!(required_field(Some(" c1 ")).unwrap(), "c1");
    }
}
