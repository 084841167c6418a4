//! Mock story and image drivers.

use async_trait::async_trait;
use fabula_core::{GenerateRequest, GenerateResponse, ImageRequest, Output};
use fabula_error::{FabulaError, FabulaResult, GeminiError, GeminiErrorKind};
use fabula_interface::{ImageDriver, StoryDriver};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A single scripted story reply.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Reply with this text
    Success(String),
    /// Fail with this error
    Error(GeminiErrorKind),
    /// Never answer within any reasonable deadline
    Hang,
}

/// Story driver replaying a script, repeating the last entry once exhausted.
pub struct MockStoryDriver {
    script: Vec<MockResponse>,
    requests: Arc<Mutex<Vec<GenerateRequest>>>,
}

impl MockStoryDriver {
    /// Always reply with the given text.
    pub fn new_success(text: impl Into<String>) -> Self {
        Self::new_sequence(vec![MockResponse::Success(text.into())])
    }

    /// Always fail with the given error.
    pub fn new_error(error: GeminiErrorKind) -> Self {
        Self::new_sequence(vec![MockResponse::Error(error)])
    }

    /// Replay the responses in order.
    pub fn new_sequence(script: Vec<MockResponse>) -> Self {
        Self {
            script,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Number of times generate() was called.
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Every request received, oldest first.
    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl StoryDriver for MockStoryDriver {
    async fn generate(&self, req: &GenerateRequest) -> FabulaResult<GenerateResponse> {
        let response = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(req.clone());
            let index = (requests.len() - 1).min(self.script.len() - 1);
            self.script[index].clone()
        };

        match response {
            MockResponse::Success(text) => Ok(GenerateResponse {
                outputs: vec![Output::Text(text)],
            }),
            MockResponse::Error(kind) => Err(FabulaError::from(GeminiError::new(kind))),
            MockResponse::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(GenerateResponse::default())
            }
        }
    }

    fn provider_name(&self) -> &'static str {
        "mock-story"
    }

    fn model_name(&self) -> &str {
        "mock-story-model"
    }
}

/// How the mock image driver answers.
#[derive(Debug, Clone)]
pub enum ImageBehavior {
    /// One image with the given MIME type and bytes
    Image(Option<String>, Vec<u8>),
    /// A successful response with no images
    Empty,
    /// Fail with this error
    Error(GeminiErrorKind),
    /// Answer with one image after a delay
    Delayed(Duration, Vec<u8>),
}

/// Image driver with a fixed behavior.
pub struct MockImageDriver {
    behavior: ImageBehavior,
    requests: Arc<Mutex<Vec<ImageRequest>>>,
}

impl MockImageDriver {
    pub fn new(behavior: ImageBehavior) -> Self {
        Self {
            behavior,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Number of times generate_images() was called.
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Every request received, oldest first.
    pub fn requests(&self) -> Vec<ImageRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageDriver for MockImageDriver {
    async fn generate_images(&self, req: &ImageRequest) -> FabulaResult<GenerateResponse> {
        self.requests.lock().unwrap().push(req.clone());

        match &self.behavior {
            ImageBehavior::Image(mime, data) => Ok(GenerateResponse {
                outputs: vec![Output::Image {
                    mime: mime.clone(),
                    data: data.clone(),
                }],
            }),
            ImageBehavior::Empty => Ok(GenerateResponse::default()),
            ImageBehavior::Error(kind) => Err(FabulaError::from(GeminiError::new(kind.clone()))),
            ImageBehavior::Delayed(delay, data) => {
                tokio::time::sleep(*delay).await;
                Ok(GenerateResponse {
                    outputs: vec![Output::Image {
                        mime: None,
                        data: data.clone(),
                    }],
                })
            }
        }
    }

    fn model_name(&self) -> &str {
        "mock-image-model"
    }
}
