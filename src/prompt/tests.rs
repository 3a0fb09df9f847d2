use super::*;

const EXPECTED_SENTENCE_PROMPT: &str = "You are a helpful assistant. You must answer questions based *only* on the following context.
If the answer is not found in the context, simply say 'I don't know, the answer is not in the provided text.'
Do not use any external knowledge.

Context: Ambedkar drafted the Indian constitution.

Question: Who drafted the Indian constitution?

Answer:";

#[test]
fn renders_default_template_byte_for_byte() {
    let template = PromptTemplate::default();

    let rendered = template.render(
        "Ambedkar drafted the Indian constitution.",
        "Who drafted the Indian constitution?",
    );

    assert_eq!(rendered, EXPECTED_SENTENCE_PROMPT);
}

#[test]
fn multi_block_context_is_inserted_verbatim() {
    let template = PromptTemplate::default();
    let context = "First block.\n\nSecond block.";

    let rendered = template.render(context, "What?");

    assert!(rendered.contains("Context: First block.\n\nSecond block.\n\nQuestion: What?\n\nAnswer:"));
    assert!(rendered.ends_with("Answer:"));
}

#[test]
fn placeholders_inside_values_are_not_expanded() {
    let template = PromptTemplate::default();

    let rendered = template.render("literal {question} text", "why {context}?");

    assert!(rendered.contains("Context: literal {question} text"));
    assert!(rendered.contains("Question: why {context}?"));
}

#[test]
fn stray_braces_are_preserved() {
    let template = PromptTemplate::new("{ {context} } -> {question} {").expect("valid template");

    assert_eq!(template.render("c", "q"), "{ c } -> q {");
}

#[test]
fn empty_context_still_renders() {
    let template = PromptTemplate::default();

    let rendered = template.render("", "Anything?");

    assert!(rendered.contains("Context: \n\nQuestion: Anything?"));
}

#[test]
fn template_requires_both_placeholders() {
    assert!(PromptTemplate::new("Context: {context}").is_err());
    assert!(PromptTemplate::new("Question: {question}").is_err());
    assert!(PromptTemplate::new("{context} {question}").is_ok());
    assert_eq!(PromptTemplate::default().as_str(), DEFAULT_TEMPLATE);
}
