//! Provider chain: try each corrector in order, first success wins.

use crate::domain::CorrectionError;
use crate::ports::GrammarCorrector;
use std::sync::Arc;
use tracing::warn;

pub struct FallbackCorrector {
    chain: Vec<Arc<dyn GrammarCorrector>>,
    provider: String,
}

impl FallbackCorrector {
    pub fn new(chain: Vec<Arc<dyn GrammarCorrector>>) -> Self {
        let provider = chain
            .iter()
            .map(|c| c.provider())
            .collect::<Vec<_>>()
            .join(" -> ");
        Self { chain, provider }
    }
}

#[async_trait::async_trait]
impl GrammarCorrector for FallbackCorrector {
    async fn correct(&self, text: &str) -> Result<String, CorrectionError> {
        let mut last_err =
            CorrectionError::ServiceUnavailable("no grammar provider configured".into());
        for corrector in &self.chain {
            match corrector.correct(text).await {
                Ok(corrected) => return Ok(corrected),
                Err(e) => {
                    warn!(provider = corrector.provider(), error = %e, "provider failed, trying next");
                    last_err = e;
                }
            }
        }
        Err(last_err)
    }

    fn provider(&self) -> &str {
        &self.provider
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Scripted {
        name: &'static str,
        result: Result<String, CorrectionError>,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn new(name: &'static str, result: Result<String, CorrectionError>) -> Arc<Self> {
            Arc::new(Self {
                name,
                result,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait::async_trait]
    impl GrammarCorrector for Scripted {
        async fn correct(&self, _text: &str) -> Result<String, CorrectionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }

        fn provider(&self) -> &str {
            self.name
        }
    }

    #[tokio::test]
    async fn test_falls_through_to_next_provider() {
        let first = Scripted::new(
            "groq",
            Err(CorrectionError::RateLimited {
                retry_after_secs: Some(5),
            }),
        );
        let second = Scripted::new("gemini", Ok("Fixed.".into()));
        let providers: Vec<Arc<dyn GrammarCorrector>> = vec![first.clone(), second.clone()];
        let chain = FallbackCorrector::new(providers);

        assert_eq!(chain.correct("fixed").await.unwrap(), "Fixed.");
        assert_eq!(first.calls.load(Ordering::SeqCst), 1);
        assert_eq!(second.calls.load(Ordering::SeqCst), 1);
        assert_eq!(chain.provider(), "groq -> gemini");
    }

    #[tokio::test]
    async fn test_stops_at_first_success() {
        let first = Scripted::new("groq", Ok("A.".into()));
        let second = Scripted::new("gemini", Ok("B.".into()));
        let providers: Vec<Arc<dyn GrammarCorrector>> = vec![first, second.clone()];
        let chain = FallbackCorrector::new(providers);
        assert_eq!(chain.correct("a").await.unwrap(), "A.");
        assert_eq!(second.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_all_fail_returns_last_error() {
        let providers: Vec<Arc<dyn GrammarCorrector>> = vec![
            Scripted::new("groq", Err(CorrectionError::ServiceUnavailable("down".into()))),
            Scripted::new(
                "gemini",
                Err(CorrectionError::RateLimited {
                    retry_after_secs: None,
                }),
            ),
        ];
        let chain = FallbackCorrector::new(providers);
        assert_eq!(
            chain.correct("x").await.unwrap_err(),
            CorrectionError::RateLimited {
                retry_after_secs: None
            }
        );
        let empty = FallbackCorrector::new(vec![]);
        assert!(empty.correct("x").await.is_err());
    }
}
