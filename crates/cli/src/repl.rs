//! The read-answer loop.

use anyhow::Result;
use medquery::PromptClient;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::info;

pub const BANNER: &str = "Text-to-SQL medical agent connected! Type 'exit' to quit.";

fn is_exit(line: &str) -> bool {
    matches!(line.to_ascii_lowercase().as_str(), "exit" | "quit")
}

/// Answers one question per input line until `exit`, `quit` or end of input.
///
/// Failures are printed as the answer and the loop keeps going.
pub async fn run<R, W>(client: &PromptClient, reader: R, mut out: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    writeln!(out, "{BANNER}\n")?;
    let mut lines = reader.lines();

    loop {
        write!(out, "You: ")?;
        out.flush()?;

        let Some(line) = lines.next_line().await? else {
            writeln!(out)?;
            break;
        };
        let question = line.trim();
        if is_exit(question) {
            break;
        }

        let response = client.ask(question).await;
        info!(outcome = ?response.outcome, "Answered question.");
        writeln!(out, "Bot: {}\n", response.answer_text())?;
    }

    writeln!(out, "Goodbye!")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use medquery::PromptClientBuilder;
    use medquery_test_utils::{MockAiProvider, TestSetup};

    async fn run_session(ai: MockAiProvider, input: &str) -> String {
        let setup = TestSetup::new().await.unwrap();
        let client = PromptClientBuilder::new()
            .ai_provider(Box::new(ai))
            .storage_provider(Box::new(setup.provider.clone()))
            .build()
            .unwrap();

        let mut out = Vec::new();
        run(&client, input.as_bytes(), &mut out).await.unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_exit_words() {
        assert!(is_exit("exit"));
        assert!(is_exit("QUIT"));
        assert!(!is_exit("exit now"));
    }

    #[tokio::test]
    async fn test_session_answers_until_exit() {
        let ai = MockAiProvider::new();
        ai.add_response(
            "How many doctors",
            "SELECT COUNT(*) FROM doctors;",
        );

        let output = run_session(ai.clone(), "How many doctors are there?\n\nquit\nignored\n").await;

        assert!(output.starts_with(BANNER));
        assert!(output.contains("Bot: The answer is 3.\n"));
        assert!(output.contains("Bot: Please enter a question.\n"));
        assert!(output.ends_with("Goodbye!\n"));
        assert_eq!(ai.get_calls().len(), 1);
    }

    #[tokio::test]
    async fn test_failures_do_not_end_the_session() {
        let output = run_session(MockAiProvider::new(), "List all nurses\n").await;

        assert!(output.contains("Bot: Could not generate SQL: "));
        assert!(output.ends_with("You: \nGoodbye!\n"));
    }
}
