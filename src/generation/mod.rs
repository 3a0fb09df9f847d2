// Text generation
// A language model that turns a rendered prompt into free text

use anyhow::Result;

/// Synchronous text-in, text-out language model
pub trait Generator {
    /// Name of the model answering prompts
    fn model_name(&self) -> &str;

    /// Produce the model's raw output for a prompt
    fn generate(&self, prompt: &str) -> Result<String>;
}
