use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OcrOutput {
    pub text: String,
    /// 0.0-1.0.
    pub confidence: f64,
}

#[async_trait]
pub trait OcrProvider: Send + Sync {
    async fn extract_text(&self, document: &[u8]) -> Result<OcrOutput>;
}

pub const MOCK_TEXT: &str = "\
This agreement is entered into between the parties named below. \
The first party agrees to deliver the services described in Schedule A, \
and the second party agrees to pay the fees set out in Schedule B within \
thirty days of each invoice.";

pub const MOCK_CONFIDENCE: f64 = 0.95;

/// Stand-in provider: waits `delay` and returns fixed text.
pub struct MockOcr {
    delay: Duration,
}

impl MockOcr {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl OcrProvider for MockOcr {
    async fn extract_text(&self, document: &[u8]) -> Result<OcrOutput> {
        if document.is_empty() {
            bail!("No document content provided");
        }
        tracing::debug!(bytes = document.len(), "mock OCR processing");
        tokio::time::sleep(self.delay).await;
        Ok(OcrOutput {
            text: MOCK_TEXT.to_string(),
            confidence: MOCK_CONFIDENCE,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn mock_returns_fixed_text_after_delay() {
        let ocr = MockOcr::new(Duration::from_millis(1500));
        let started = tokio::time::Instant::now();
        let out = ocr.extract_text(b"%PDF-1.7").await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(1500));
        assert_eq!(out.text, MOCK_TEXT);
        assert_eq!(out.confidence, MOCK_CONFIDENCE);
    }

    #[tokio::test]
    async fn empty_document_is_rejected() {
        let ocr = MockOcr::new(Duration::ZERO);
        let err = ocr.extract_text(&[]).await.unwrap_err();
        assert_eq!(err.to_string(), "No document content provided");
    }
}
