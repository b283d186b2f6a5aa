//! Routes inbound messages to the requester and posts the replies.
//!
//! Two paths run for every message, in order:
//! - the passive path answers direct messages and mentions of the bot;
//! - the command path answers `{prefix}{name} <text>`.
//!
//! A message that qualifies for both (e.g. `embm hi` in a direct message)
//! gets two replies.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::ChatError;
use crate::persona::{COMMAND_APOLOGY, DEFAULT_PROMPT, NO_RESPONSE};
use crate::ports::chat::{BotIdentity, ChatPlatform, IncomingMessage};
use crate::requester::Requester;

/// Discord shows a typing indicator for about ten seconds per trigger.
const TYPING_REFRESH: Duration = Duration::from_secs(8);

/// The explicit chat command, e.g. `emb` + `m` for `embm <text>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTrigger {
    invocation: String,
}

/// How a message relates to the chat command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandMatch<'a> {
    /// The message does not invoke the command.
    NotACommand,
    /// The command was invoked without its text argument.
    MissingArgument,
    /// The command was invoked with this argument.
    Invoked(&'a str),
}

impl CommandTrigger {
    /// Creates a trigger for `{prefix}{name}`.
    #[must_use]
    pub fn new(prefix: &str, name: &str) -> Self {
        Self { invocation: format!("{prefix}{name}") }
    }

    /// Classifies `content`. The invocation must be followed by whitespace or
    /// end the message.
    #[must_use]
    pub fn parse<'a>(&self, content: &'a str) -> CommandMatch<'a> {
        let Some(rest) = content.strip_prefix(self.invocation.as_str()) else {
            return CommandMatch::NotACommand;
        };
        if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
            return CommandMatch::NotACommand;
        }
        match rest.trim() {
            "" => CommandMatch::MissingArgument,
            argument => CommandMatch::Invoked(argument),
        }
    }
}

/// Removes every `<@ID>` and `<@!ID>` token for `user_id` and trims the rest.
#[must_use]
pub fn strip_mentions(content: &str, user_id: &str) -> String {
    content
        .replace(&format!("<@{user_id}>"), "")
        .replace(&format!("<@!{user_id}>"), "")
        .trim()
        .to_owned()
}

/// The prompt the passive path would send for `message`, or `None` when the
/// passive path does not apply.
#[must_use]
pub fn passive_prompt(bot: &BotIdentity, message: &IncomingMessage) -> Option<String> {
    if message.author.id == bot.id {
        return None;
    }
    if !message.is_direct() && !message.mentions_user(&bot.id) {
        return None;
    }
    let content = strip_mentions(&message.content, &bot.id);
    if content.is_empty() {
        Some(DEFAULT_PROMPT.to_owned())
    } else {
        Some(content)
    }
}

/// Keeps the typing indicator alive until dropped.
struct TypingIndicator {
    refresher: JoinHandle<()>,
}

impl TypingIndicator {
    async fn start(chat: Arc<dyn ChatPlatform>, channel_id: &str) -> Self {
        if let Err(e) = chat.send_typing(channel_id).await {
            debug!(channel_id, error = %e, "typing indicator failed");
        }
        let channel_id = channel_id.to_owned();
        let refresher = tokio::spawn(async move {
            loop {
                tokio::time::sleep(TYPING_REFRESH).await;
                if let Err(e) = chat.send_typing(&channel_id).await {
                    debug!(channel_id = %channel_id, error = %e, "typing indicator failed");
                }
            }
        });
        Self { refresher }
    }
}

impl Drop for TypingIndicator {
    fn drop(&mut self) {
        self.refresher.abort();
    }
}

/// Decides which messages get answered and sends the answers.
pub struct Router {
    requester: Arc<Requester>,
    chat: Arc<dyn ChatPlatform>,
    command: CommandTrigger,
}

impl Router {
    /// Creates a router.
    #[must_use]
    pub fn new(
        requester: Arc<Requester>,
        chat: Arc<dyn ChatPlatform>,
        command: CommandTrigger,
    ) -> Self {
        Self { requester, chat, command }
    }

    /// Handles one inbound message: the passive path, then the command path.
    pub async fn handle(&self, bot: &BotIdentity, message: &IncomingMessage) {
        if let Some(prompt) = passive_prompt(bot, message) {
            info!(author = %message.author.username, prompt = %prompt, "answering message");
            if let Err(e) = self.respond(message, &prompt).await {
                warn!(error = %e, "error in message handling");
                let apology = self.requester.persona().passive_apology();
                self.send_apology(message, &apology).await;
            }
        }

        self.dispatch_command(bot, message).await;
    }

    async fn dispatch_command(&self, bot: &BotIdentity, message: &IncomingMessage) {
        if message.author.bot || message.author.id == bot.id {
            return;
        }
        match self.command.parse(&message.content) {
            CommandMatch::NotACommand => {}
            CommandMatch::MissingArgument => {
                warn!(
                    author = %message.author.username,
                    "command invoked without its required text argument"
                );
            }
            CommandMatch::Invoked(argument) => {
                info!(author = %message.author.username, argument, "command invoked");
                if let Err(e) = self.respond(message, argument).await {
                    warn!(error = %e, "error in command");
                    self.send_apology(message, COMMAND_APOLOGY).await;
                }
            }
        }
    }

    async fn respond(&self, message: &IncomingMessage, prompt: &str) -> Result<(), ChatError> {
        let reply = {
            let _typing = TypingIndicator::start(Arc::clone(&self.chat), &message.channel_id).await;
            self.requester.get_response(prompt).await
        };
        let reply = if reply.is_empty() { NO_RESPONSE.to_owned() } else { reply };
        self.chat.reply(message, &reply).await
    }

    async fn send_apology(&self, message: &IncomingMessage, apology: &str) {
        if let Err(e) = self.chat.reply(message, apology).await {
            warn!(error = %e, "failed to send apology");
        }
    }
}
