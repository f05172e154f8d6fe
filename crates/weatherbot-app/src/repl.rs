//! Line-oriented terminal chat.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use uuid::Uuid;
use weatherbot_chat::{ChatError, SessionRegistry};
use weatherbot_core::WeatherbotError;

const GREETING: &str = "Hi! I am your WeatherBot. Ask me anything about the weather!";
const HELP: &str = "Commands: /history, /reset, /quit";

/// Read one message per line from `input` until EOF or `/quit`.
///
/// Validation and classifier failures are reported inline and the loop keeps
/// going; only I/O errors end it early.
pub async fn run<R, W>(
    registry: &SessionRegistry,
    input: R,
    mut output: W,
) -> Result<(), WeatherbotError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut session_id: Uuid = registry.create_session()?;
    let mut lines = input.lines();

    write_line(&mut output, GREETING).await?;
    write_line(&mut output, HELP).await?;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        match line {
            "" => continue,
            "/quit" | "/exit" => break,
            "/reset" => {
                registry.delete_session(session_id).ok();
                session_id = registry.create_session()?;
                write_line(&mut output, "(new conversation)").await?;
            }
            "/history" => {
                for entry in registry.transcript(session_id).await? {
                    write_line(&mut output, &format!("{}: {}", entry.role, entry.content)).await?;
                }
            }
            text => match registry.submit(Some(session_id), text).await {
                Ok(outcome) => {
                    session_id = outcome.session_id;
                    write_line(&mut output, &format!("assistant: {}", outcome.response)).await?;
                }
                Err(e @ (ChatError::EmptyMessage | ChatError::MessageTooLong(_))) => {
                    write_line(&mut output, &format!("error: {e}")).await?;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Turn failed");
                    write_line(&mut output, &format!("error: {e}")).await?;
                }
            },
        }
    }

    output.flush().await?;
    Ok(())
}

async fn write_line<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> std::io::Result<()> {
    output.write_all(text.as_bytes()).await?;
    output.write_all(b"\n").await?;
    output.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use weatherbot_agent::{AgentReply, ConversationAgent};
    use weatherbot_chat::SessionController;
    use weatherbot_core::config::ChatConfig;
    use weatherbot_core::Message;
    use weatherbot_ner::{GazetteerClassifier, LocationDetector};

    /// Echoes the agent-facing history so tests can see what it was given.
    struct HistoryEcho;

    #[async_trait]
    impl ConversationAgent for HistoryEcho {
        async fn reply(&self, messages: &[Message]) -> AgentReply {
            let joined: Vec<&str> = messages.iter().map(|m| m.content()).collect();
            AgentReply::Answer(joined.join(" | "))
        }
    }

    fn registry() -> SessionRegistry {
        let detector =
            LocationDetector::new(Arc::new(GazetteerClassifier::new::<&str>(&[]).unwrap()));
        SessionRegistry::new(
            SessionController::new(detector, Arc::new(HistoryEcho)),
            ChatConfig::default(),
        )
    }

    async fn run_script(script: &str) -> (String, SessionRegistry) {
        let reg = registry();
        let mut out = Vec::new();
        run(&reg, script.as_bytes(), &mut out).await.unwrap();
        (String::from_utf8(out).unwrap(), reg)
    }

    #[tokio::test]
    async fn test_greets_and_answers() {
        let (out, _) = run_script("Weather in Paris\n").await;
        assert!(out.starts_with(GREETING));
        assert!(out.contains("assistant: Weather in Paris\n"));
    }

    #[tokio::test]
    async fn test_follow_up_uses_recalled_location() {
        let (out, _) = run_script("Weather in Paris\nand tomorrow?\n").await;
        assert!(out.contains("assistant: Paris | and tomorrow?\n"));
    }

    #[tokio::test]
    async fn test_history_prints_transcript() {
        let (out, _) = run_script("Weather in Oslo\n/history\n").await;
        assert!(out.contains("user: Weather in Oslo\n"));
        assert!(out.contains("assistant: Weather in Oslo\n"));
    }

    #[tokio::test]
    async fn test_reset_starts_new_session() {
        let (out, reg) = run_script("Weather in Paris\n/reset\nand tomorrow?\n").await;
        assert!(out.contains("(new conversation)"));
        assert!(out.contains("assistant: and tomorrow?\n"));
        assert_eq!(reg.session_count(), 1);
    }

    #[tokio::test]
    async fn test_quit_stops_reading() {
        let (out, _) = run_script("/quit\nWeather in Paris\n").await;
        assert!(!out.contains("assistant:"));
    }

    #[tokio::test]
    async fn test_blank_lines_are_skipped() {
        let (out, reg) = run_script("\n   \n").await;
        assert!(!out.contains("error:"));
        assert_eq!(reg.list_sessions().await.unwrap()[0].turn_count, 0);
    }
}
