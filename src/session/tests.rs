use super::*;
use crate::QaError;
use async_trait::async_trait;
use std::io::Cursor;
use std::sync::Mutex;

/// Answers by echoing, failing for questions that mention a trigger word
#[derive(Default)]
struct ScriptedAnswerer {
    questions: Mutex<Vec<String>>,
}

impl ScriptedAnswerer {
    fn questions(&self) -> Vec<String> {
        self.questions
            .lock()
            .expect("lock should not be poisoned")
            .clone()
    }
}

#[async_trait]
impl Answerer for ScriptedAnswerer {
    async fn answer(&self, question: &str) -> crate::Result<String> {
        self.questions
            .lock()
            .expect("lock should not be poisoned")
            .push(question.to_string());

        if question.contains("offline") {
            return Err(QaError::Generation("model service unreachable".to_string()));
        }
        if question.contains("fatal") {
            return Err(QaError::IndexBuild("index vanished".to_string()));
        }
        Ok(format!("echo: {}", question))
    }
}

async fn run_with_input(answerer: &ScriptedAnswerer, input: &str) -> (crate::Result<SessionSummary>, String) {
    let mut output = Vec::new();
    let result = run_session(answerer, Cursor::new(input.as_bytes()), &mut output).await;
    let output = String::from_utf8(output).expect("output should be utf-8");
    (result, output)
}

#[test]
fn exit_is_trimmed_and_case_insensitive() {
    assert_eq!(classify_input("exit"), UserInput::Exit);
    assert_eq!(classify_input("EXIT\n"), UserInput::Exit);
    assert_eq!(classify_input("  ExIt \r\n"), UserInput::Exit);
    assert_eq!(
        classify_input("exit now"),
        UserInput::Question("exit now")
    );
}

#[test]
fn whitespace_only_is_empty() {
    assert_eq!(classify_input("\n"), UserInput::Empty);
    assert_eq!(classify_input("   \t \n"), UserInput::Empty);
    assert_eq!(classify_input(""), UserInput::Empty);
}

#[test]
fn questions_keep_inner_whitespace() {
    assert_eq!(
        classify_input("  Who drafted the constitution? \n"),
        UserInput::Question("  Who drafted the constitution? ")
    );
}

#[tokio::test]
async fn banner_answers_and_farewell() {
    let answerer = ScriptedAnswerer::default();

    let (result, output) = run_with_input(&answerer, "Who drafted it?\nexit\n").await;

    let summary = result.expect("session should succeed");
    assert_eq!(summary, SessionSummary { answered: 1, failed: 0 });
    assert_eq!(
        output,
        "\nAmbedkarGPT is ready.\n\
         Ask questions based on the speech. Type 'exit' to quit.\n\
         \nQuestion: Answer: echo: Who drafted it?\n\
         \nQuestion: Exiting...\n"
    );
}

#[tokio::test]
async fn blank_lines_do_not_invoke_pipeline() {
    let answerer = ScriptedAnswerer::default();

    let (result, output) = run_with_input(&answerer, "\n   \nfirst\n\t\nsecond\nEXIT\n").await;

    let summary = result.expect("session should succeed");
    assert_eq!(summary.answered, 2);
    assert_eq!(answerer.questions(), vec!["first", "second"]);
    assert_eq!(output.matches("\nQuestion: ").count(), 6);
}

#[tokio::test]
async fn each_question_is_answered_exactly_once() {
    let answerer = ScriptedAnswerer::default();

    let (result, _) = run_with_input(&answerer, "same\nsame\nsame\nexit\n").await;

    assert_eq!(result.expect("session should succeed").answered, 3);
    assert_eq!(answerer.questions().len(), 3);
}

#[tokio::test]
async fn input_after_exit_is_ignored() {
    let answerer = ScriptedAnswerer::default();

    let (result, output) = run_with_input(&answerer, "  exit  \nnever asked\n").await;

    assert_eq!(
        result.expect("session should succeed"),
        SessionSummary::default()
    );
    assert!(answerer.questions().is_empty());
    assert!(output.ends_with("Exiting...\n"));
}

#[tokio::test]
async fn end_of_input_ends_session() {
    let answerer = ScriptedAnswerer::default();

    let (result, output) = run_with_input(&answerer, "only question").await;

    assert_eq!(result.expect("session should succeed").answered, 1);
    assert_eq!(answerer.questions(), vec!["only question"]);
    assert!(output.ends_with("\nQuestion: \nExiting...\n"));
}

#[tokio::test]
async fn per_query_failures_keep_the_loop_running() {
    let answerer = ScriptedAnswerer::default();

    let (result, output) = run_with_input(&answerer, "model offline?\nstill there?\nexit\n").await;

    let summary = result.expect("session should succeed");
    assert_eq!(summary, SessionSummary { answered: 1, failed: 1 });
    assert!(output.contains("Error: Generation error: model service unreachable\n"));
    assert!(output.contains("Answer: echo: still there?\n"));
}

#[tokio::test]
async fn other_failures_end_the_session() {
    let answerer = ScriptedAnswerer::default();

    let (result, _) = run_with_input(&answerer, "fatal question\nnext\nexit\n").await;

    assert!(matches!(result, Err(QaError::IndexBuild(_))));
    assert_eq!(answerer.questions(), vec!["fatal question"]);
}
