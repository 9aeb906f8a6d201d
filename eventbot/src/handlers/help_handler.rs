//! Help handler: lists the commands the bot answers to.

use async_trait::async_trait;
use eventbot_core::{Action, Event, Handler, HandlerError, HandlerOutcome, SessionState};

#[derive(Clone)]
pub struct HelpHandler {
    commands: Vec<String>,
}

impl HelpHandler {
    /// `commands` are listed in the given order, each prefixed with `/`.
    pub fn new<I, S>(commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            commands: commands.into_iter().map(Into::into).collect(),
        }
    }

    fn render(&self) -> String {
        if self.commands.is_empty() {
            return "No commands available.".to_string();
        }
        let lines: Vec<String> = self.commands.iter().map(|c| format!("/{}", c)).collect();
        format!("Available commands:\n{}", lines.join("\n"))
    }
}

#[async_trait]
impl Handler for HelpHandler {
    async fn handle(
        &self,
        event: &Event,
        state: SessionState,
    ) -> Result<HandlerOutcome, HandlerError> {
        Ok(HandlerOutcome::new(state).with_action(Action::reply(event, self.render())))
    }
}
