use crate::console::Console;
use crate::error::{Error, Result};
use crate::llm::{ChatMessage, ChatModel, Role};
use crate::prompt::system_prompt;
use crate::step::Step;
use libsiteclone::ToolRegistry;
use owo_colors::OwoColorize;
use serde_json::json;

/// Consecutive unparseable replies tolerated before giving up.
const MAX_INVALID_REPLIES: usize = 3;

/// Drives the model one step at a time, running the tools it asks for.
pub struct Agent<M: ChatModel, C: Console> {
    model: M,
    console: C,
    tools: ToolRegistry,
    messages: Vec<ChatMessage>,
}

impl<M: ChatModel, C: Console> Agent<M, C> {
    pub fn new(model: M, console: C, tools: ToolRegistry) -> Self {
        let messages = vec![ChatMessage::new(Role::System, system_prompt(&tools.names()))];
        Self {
            model,
            console,
            tools,
            messages,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Runs the conversation until the user declines to continue after an
    /// OUTPUT step. `first_query` skips the opening prompt.
    pub async fn run(&mut self, first_query: Option<String>) -> Result<()> {
        let query = match first_query.or_else(|| self.console.ask("How can I help you?")) {
            Some(q) => q,
            None => return Ok(()),
        };
        self.messages.push(ChatMessage::new(Role::User, query));

        let mut invalid_replies = 0;
        loop {
            let raw = self.model.complete(&self.messages).await?;
            let step = match Step::parse(&raw) {
                Ok(step) => {
                    invalid_replies = 0;
                    step
                }
                Err(e) => {
                    invalid_replies += 1;
                    tracing::warn!("{}", e);
                    if invalid_replies >= MAX_INVALID_REPLIES {
                        return Err(e);
                    }
                    self.messages.push(ChatMessage::new(
                        Role::Developer,
                        "Your last reply was not a valid step. Reply with exactly one JSON object.",
                    ));
                    continue;
                }
            };
            let echoed = serde_json::to_string(&step).map_err(|e| Error::InvalidStep(e.to_string()))?;
            self.messages.push(ChatMessage::new(Role::Assistant, echoed));

            match step {
                Step::Start { content } => println!("{} {}", "start".bright_yellow(), content),
                Step::Think { content } => println!("\t{} {}", "think".bright_black(), content),
                Step::Tool {
                    tool_name, input, ..
                } => self.run_tool(&tool_name, input).await,
                Step::Output { content } => {
                    println!("{} {}", "output".bright_green(), content);
                    if !self.console.confirm("Do you want to continue the chat?") {
                        break;
                    }
                    match self.console.ask("How can I help you?") {
                        Some(q) => self.messages.push(ChatMessage::new(Role::User, q)),
                        None => break,
                    }
                }
            }
        }
        Ok(())
    }

    async fn run_tool(&mut self, tool_name: &str, input: serde_json::Value) {
        let tool = match self.tools.get(tool_name) {
            Some(t) => t,
            None => {
                tracing::warn!("Model asked for unknown tool {}", tool_name);
                self.messages.push(ChatMessage::new(
                    Role::Developer,
                    format!("There is no such tool as {tool_name}"),
                ));
                return;
            }
        };
        let shown_input = input.to_string();
        let observation = match tool.invoke(input).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!("Tool {} failed\nError : {}", tool_name, e);
                format!("Tool {tool_name} failed: {e}")
            }
        };
        println!(
            "{} {}({}) = {}",
            "tool".bright_cyan(),
            tool_name,
            shown_input,
            observation
        );
        self.messages.push(ChatMessage::new(
            Role::Developer,
            json!({ "step": "OBSERVE", "content": observation }).to_string(),
        ));
    }
}
