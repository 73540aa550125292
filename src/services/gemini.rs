// src/services/gemini.rs
use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use async_stream::stream;
use async_trait::async_trait;
use futures_util::{Stream, StreamExt};
use serde::{Deserialize, Serialize};

use super::conversation::{ChatError, ChunkStream, Conversation, ConversationalProvider};

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Part {
    #[serde(default)]
    pub text: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    fn turn(role: &str, text: impl Into<String>) -> Self {
        Self { role: Some(role.to_string()), parts: vec![Part { text: text.into() }] }
    }

    fn text(&self) -> String {
        self.parts.iter().map(|p| p.text.as_str()).collect()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: &'a [Content],
    system_instruction: &'a Content,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

impl GenerateResponse {
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(Content::text)
            .unwrap_or_default()
    }
}

/// Pull the text out of one `data:` line of the SSE body. Other lines yield `None`.
pub fn parse_sse_line(line: &str) -> Option<Result<String, ChatError>> {
    let data = line.trim().strip_prefix("data:")?.trim();
    if data.is_empty() {
        return None;
    }
    Some(
        serde_json::from_str::<GenerateResponse>(data)
            .map(|r| r.text())
            .map_err(ChatError::from),
    )
}

/// Reassemble `data:` lines across arbitrary byte boundaries and yield their
/// non-empty text. A final line without a trailing newline still counts. Ends
/// after the first error.
pub fn sse_text_chunks<S, B, E>(bytes: S) -> impl Stream<Item = Result<String, ChatError>> + Send
where
    S: Stream<Item = Result<B, E>> + Send,
    B: AsRef<[u8]> + Send,
    E: Into<ChatError> + Send,
{
    stream! {
        let mut bytes = Box::pin(bytes);
        let mut buffer: Vec<u8> = Vec::new();
        while let Some(chunk) = bytes.next().await {
            match chunk {
                Ok(chunk) => buffer.extend_from_slice(chunk.as_ref()),
                Err(e) => {
                    yield Err::<String, ChatError>(e.into());
                    return;
                }
            }
            while let Some(i) = buffer.iter().position(|&b| b == b'\n') {
                let line: Vec<u8> = buffer.drain(..=i).collect();
                match parse_sse_line(&String::from_utf8_lossy(&line)) {
                    Some(Ok(text)) if !text.is_empty() => {
                        yield Ok(text);
                    }
                    Some(Err(e)) => {
                        yield Err(e);
                        return;
                    }
                    _ => {}
                }
            }
        }
        if !buffer.is_empty() {
            match parse_sse_line(&String::from_utf8_lossy(&buffer)) {
                Some(Ok(text)) if !text.is_empty() => {
                    yield Ok(text);
                }
                Some(Err(e)) => {
                    yield Err(e);
                }
                _ => {}
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl GeminiProvider {
    /// `timeout` bounds connecting and each read, not the whole streamed reply.
    pub fn new(
        api_key: Option<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ChatError> {
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .read_timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

impl ConversationalProvider for GeminiProvider {
    fn create_session(
        &self,
        system_prompt: &str,
        model: &str,
    ) -> Result<Box<dyn Conversation>, ChatError> {
        let api_key = self.api_key.clone().ok_or(ChatError::MissingCredential)?;
        Ok(Box::new(GeminiConversation {
            client: self.client.clone(),
            url: format!("{}/models/{}:streamGenerateContent", self.base_url, model),
            api_key,
            system_instruction: Content { role: None, parts: vec![Part { text: system_prompt.to_string() }] },
            history: Arc::new(Mutex::new(Vec::new())),
        }))
    }
}

pub struct GeminiConversation {
    client: reqwest::Client,
    url: String,
    api_key: String,
    system_instruction: Content,
    history: Arc<Mutex<Vec<Content>>>,
}

#[async_trait]
impl Conversation for GeminiConversation {
    async fn send_streamed(&self, message: &str) -> Result<ChunkStream, ChatError> {
        let user_turn = Content::turn("user", message);
        let mut contents = self.history.lock().unwrap_or_else(|e| e.into_inner()).clone();
        contents.push(user_turn.clone());

        let res = self
            .client
            .post(&self.url)
            .query(&[("alt", "sse"), ("key", self.api_key.as_str())])
            .json(&GenerateRequest { contents: &contents, system_instruction: &self.system_instruction })
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            return Err(ChatError::Api { status, body });
        }

        let history = self.history.clone();
        let mut texts = Box::pin(sse_text_chunks(res.bytes_stream()));
        let chunks = stream! {
            let mut reply = String::new();
            while let Some(item) = texts.next().await {
                match item {
                    Ok(text) => {
                        reply.push_str(&text);
                        yield Ok(text);
                    }
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                }
            }
            // Only a completed exchange joins the history.
            let mut guard = history.lock().unwrap_or_else(|e| e.into_inner());
            guard.push(user_turn);
            guard.push(Content::turn("model", reply));
        };
        Ok(Box::pin(chunks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_text_from_data_lines() {
        let line = r#"data: {"candidates":[{"content":{"role":"model","parts":[{"text":"مرح"},{"text":"با"}]}}]}"#;
        assert_eq!(parse_sse_line(line).unwrap().unwrap(), "مرحبا");
    }

    #[test]
    fn ignores_non_data_lines() {
        assert!(parse_sse_line("").is_none());
        assert!(parse_sse_line(": keepalive").is_none());
        assert!(parse_sse_line("event: message").is_none());
    }

    #[test]
    fn bad_json_is_a_decode_error() {
        assert!(matches!(parse_sse_line("data: {oops"), Some(Err(ChatError::Decode(_)))));
    }

    #[test]
    fn session_needs_api_key() {
        let provider = GeminiProvider::new(None, DEFAULT_GEMINI_BASE_URL, Duration::from_secs(5)).unwrap();
        let err = provider.create_session("prompt", "gemini-2.5-flash").err().unwrap();
        assert!(matches!(err, ChatError::MissingCredential));
    }

    fn data_line(text: &str) -> String {
        format!(r#"data: {{"candidates":[{{"content":{{"role":"model","parts":[{{"text":"{}"}}]}}}}]}}"#, text)
    }

    async fn collect_texts(pieces: Vec<Result<Vec<u8>, ChatError>>) -> Vec<Result<String, ChatError>> {
        sse_text_chunks(futures_util::stream::iter(pieces)).collect().await
    }

    #[tokio::test]
    async fn reassembles_lines_split_across_chunks() {
        let body = format!("{}\r\n\r\n{}\n\n{}", data_line("Hel"), data_line("lo"), data_line(" يا صديقي"));
        // Small pieces split lines and multi-byte characters alike.
        let pieces = body.as_bytes().chunks(7).map(|c| Ok(c.to_vec())).collect();

        let texts: Vec<String> = collect_texts(pieces).await.into_iter().map(Result::unwrap).collect();
        assert_eq!(texts, vec!["Hel", "lo", " يا صديقي"]);
    }

    #[tokio::test]
    async fn final_line_without_newline_is_kept() {
        let pieces = vec![
            Ok(format!("{}\n\nda", data_line("Hel")).into_bytes()),
            Ok(format!("ta: {}", &data_line("lo")["data: ".len()..]).into_bytes()),
        ];
        let texts: Vec<String> = collect_texts(pieces).await.into_iter().map(Result::unwrap).collect();
        assert_eq!(texts.concat(), "Hello");
    }

    #[tokio::test]
    async fn transport_error_ends_the_stream() {
        let pieces = vec![
            Ok(format!("{}\n", data_line("Hel")).into_bytes()),
            Err(ChatError::Stream("connection reset".into())),
            Ok(format!("{}\n", data_line("lo")).into_bytes()),
        ];
        let items = collect_texts(pieces).await;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_deref().unwrap(), "Hel");
        assert!(matches!(items[1], Err(ChatError::Stream(_))));
    }
}
