//! The seam between the engine and a generation service.

use async_trait::async_trait;
use rowsmith_error::GenerationError;
use std::future::Future;
use std::sync::Arc;

/// Renders a prompt to text.
///
/// Implementations report failures as [`GenerationError`]; the row executor
/// classifies them as transient or permanent.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate text for a fully rendered prompt.
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

#[async_trait]
impl<G> Generator for Arc<G>
where
    G: Generator + ?Sized,
{
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        (**self).generate(prompt).await
    }
}

/// A [`Generator`] backed by an async closure.
#[derive(Clone)]
pub struct FnGenerator<F> {
    f: F,
}

impl<F> std::fmt::Debug for FnGenerator<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnGenerator").finish_non_exhaustive()
    }
}

/// Wrap an async closure as a [`Generator`].
///
/// # Examples
///
/// ```
/// use rowsmith_batch::{Generator, generator_fn};
/// use rowsmith_error::GenerationError;
///
/// # async fn demo() -> Result<(), GenerationError> {
/// let upper = generator_fn(|prompt: String| async move {
///     Ok::<_, GenerationError>(prompt.to_uppercase())
/// });
/// assert_eq!(upper.generate("hi").await?, "HI");
/// # Ok(())
/// # }
/// ```
pub fn generator_fn<F, Fut>(f: F) -> FnGenerator<F>
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<String, GenerationError>> + Send + 'static,
{
    FnGenerator { f }
}

#[async_trait]
impl<F, Fut> Generator for FnGenerator<F>
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<String, GenerationError>> + Send + 'static,
{
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        (self.f)(prompt.to_string()).await
    }
}
