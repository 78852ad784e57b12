//! Shared test utilities

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use parley::{
    ApiServerBuilder, ChatMessage, ChatModel, Error, Result, SpeechRecognizer, SpeechSynthesizer,
    TurnHandler,
};

/// Bytes every stub synthesis returns
pub const STUB_AUDIO: &[u8] = b"RIFF\x24\x00\x00\x00WAVEfmt stub";

/// Speech recognizer returning a canned transcript
pub struct StubRecognizer {
    result: Option<String>,
    pub calls: Mutex<Vec<(Vec<u8>, String)>>,
}

impl StubRecognizer {
    pub fn returning(text: &str) -> Arc<Self> {
        Arc::new(Self {
            result: Some(text.to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            result: None,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl SpeechRecognizer for StubRecognizer {
    async fn transcribe(&self, audio: &[u8], content_type: &str) -> Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push((audio.to_vec(), content_type.to_string()));
        self.result
            .clone()
            .ok_or_else(|| Error::Stt("stub transcription failure".to_string()))
    }

    fn name(&self) -> &'static str {
        "stub-stt"
    }
}

/// Chat model returning a canned reply and recording prompts
pub struct StubModel {
    reply: Option<String>,
    pub prompts: Mutex<Vec<Vec<ChatMessage>>>,
}

impl StubModel {
    pub fn returning(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Some(reply.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: None,
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn last_prompt(&self) -> Vec<ChatMessage> {
        self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl ChatModel for StubModel {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        self.prompts.lock().unwrap().push(messages.to_vec());
        self.reply
            .clone()
            .ok_or_else(|| Error::Llm("stub completion failure".to_string()))
    }

    fn model(&self) -> &str {
        "stub-model"
    }
}

/// Speech synthesizer returning `STUB_AUDIO` and recording its input
pub struct StubSynthesizer {
    fail: bool,
    pub texts: Mutex<Vec<String>>,
}

impl StubSynthesizer {
    pub fn ok() -> Arc<Self> {
        Arc::new(Self {
            fail: false,
            texts: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            texts: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.texts.lock().unwrap().len()
    }
}

#[async_trait]
impl SpeechSynthesizer for StubSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        self.texts.lock().unwrap().push(text.to_string());
        if self.fail {
            return Err(Error::Tts("stub synthesis failure".to_string()));
        }
        Ok(STUB_AUDIO.to_vec())
    }

    fn name(&self) -> &'static str {
        "stub-tts"
    }
}

/// Stub collaborators plus the router wired to them
pub struct TestGateway {
    pub recognizer: Arc<StubRecognizer>,
    pub model: Arc<StubModel>,
    pub synthesizer: Arc<StubSynthesizer>,
    pub app: axum::Router,
}

impl TestGateway {
    pub fn new(
        recognizer: Arc<StubRecognizer>,
        model: Arc<StubModel>,
        synthesizer: Arc<StubSynthesizer>,
    ) -> Self {
        Self::with_builder(recognizer, model, synthesizer, |b| b)
    }

    pub fn with_builder(
        recognizer: Arc<StubRecognizer>,
        model: Arc<StubModel>,
        synthesizer: Arc<StubSynthesizer>,
        configure: impl FnOnce(ApiServerBuilder) -> ApiServerBuilder,
    ) -> Self {
        let handler = TurnHandler::new(recognizer.clone(), model.clone(), synthesizer.clone());
        let app = configure(ApiServerBuilder::new(Arc::new(handler)))
            .build()
            .router();

        Self {
            recognizer,
            model,
            synthesizer,
            app,
        }
    }

    /// Gateway whose collaborators all succeed
    pub fn happy(transcript: &str, reply: &str) -> Self {
        Self::new(
            StubRecognizer::returning(transcript),
            StubModel::returning(reply),
            StubSynthesizer::ok(),
        )
    }

    /// Total collaborator calls across all three stubs
    pub fn collaborator_calls(&self) -> usize {
        self.recognizer.call_count() + self.model.call_count() + self.synthesizer.call_count()
    }
}

const BOUNDARY: &str = "parley-test-boundary";

/// Hand-built `multipart/form-data` request body
#[derive(Default)]
pub struct Form {
    body: Vec<u8>,
    extra_headers: Vec<(&'static str, String)>,
}

impl Form {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a plain text field
    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    /// Add a file field
    pub fn file(self, name: &str, filename: &str, content_type: &str, data: &[u8]) -> Self {
        self.part(name, Some(filename), Some(content_type), data)
    }

    /// Add a raw part with an optional filename and content type
    pub fn part(
        mut self,
        name: &str,
        filename: Option<&str>,
        content_type: Option<&str>,
        data: &[u8],
    ) -> Self {
        let mut head = format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"");
        if let Some(filename) = filename {
            head.push_str(&format!("; filename=\"{filename}\""));
        }
        head.push_str("\r\n");
        if let Some(content_type) = content_type {
            head.push_str(&format!("Content-Type: {content_type}\r\n"));
        }
        head.push_str("\r\n");

        self.body.extend_from_slice(head.as_bytes());
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    /// Add a `message` history entry
    pub fn message(self, role: &str, content: &str) -> Self {
        let json = serde_json::json!({ "role": role, "content": content }).to_string();
        self.text("message", &json)
    }

    /// Attach a request header
    pub fn header(mut self, name: &'static str, value: &str) -> Self {
        self.extra_headers.push((name, value.to_string()));
        self
    }

    /// Finish the body and build a `POST /api` request
    pub fn into_request(mut self) -> Request<Body> {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        let mut builder = Request::builder()
            .method("POST")
            .uri("/api")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            );
        for (name, value) in self.extra_headers {
            builder = builder.header(name, value);
        }
        builder.body(Body::from(self.body)).unwrap()
    }
}

/// Collect a response body into bytes
pub async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

/// Percent-decode a response header
pub fn decoded_header(response: &axum::response::Response, name: &str) -> String {
    let raw = response.headers()[name].to_str().unwrap();
    urlencoding::decode(raw).unwrap().into_owned()
}
