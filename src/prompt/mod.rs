// Prompt rendering
// The fixed grounding template filled with retrieved context and the question

#[cfg(test)]
mod tests;

use tracing::debug;

/// Instructions given to the model ahead of every question
pub const DEFAULT_TEMPLATE: &str = "You are a helpful assistant. You must answer questions based *only* on the following context.
If the answer is not found in the context, simply say 'I don't know, the answer is not in the provided text.'
Do not use any external knowledge.

Context: {context}

Question: {question}

Answer:";

const CONTEXT_PLACEHOLDER: &str = "{context}";
const QUESTION_PLACEHOLDER: &str = "{question}";

/// A template with `{context}` and `{question}` placeholders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    template: String,
}

impl Default for PromptTemplate {
    #[inline]
    fn default() -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
        }
    }
}

impl PromptTemplate {
    /// Build a template, rejecting text that lacks either placeholder
    #[inline]
    pub fn new(template: impl Into<String>) -> anyhow::Result<Self> {
        let template = template.into();
        for placeholder in [CONTEXT_PLACEHOLDER, QUESTION_PLACEHOLDER] {
            if !template.contains(placeholder) {
                anyhow::bail!("Prompt template is missing the {} placeholder", placeholder);
            }
        }
        Ok(Self { template })
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// Substitute both placeholders in a single left-to-right pass, so
    /// placeholder text inside the context or question is left untouched.
    #[inline]
    pub fn render(&self, context: &str, question: &str) -> String {
        let mut rendered =
            String::with_capacity(self.template.len() + context.len() + question.len());
        let mut rest = self.template.as_str();

        while let Some(open) = rest.find('{') {
            let (before, tail) = rest.split_at(open);
            rendered.push_str(before);

            if let Some(after) = tail.strip_prefix(CONTEXT_PLACEHOLDER) {
                rendered.push_str(context);
                rest = after;
            } else if let Some(after) = tail.strip_prefix(QUESTION_PLACEHOLDER) {
                rendered.push_str(question);
                rest = after;
            } else {
                rendered.push('{');
                rest = tail.strip_prefix('{').unwrap_or_default();
            }
        }
        rendered.push_str(rest);

        debug!("Rendered prompt ({} bytes)", rendered.len());
        rendered
    }
}
