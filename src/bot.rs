//! The event loop: one handler task per inbound message.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::gateway::GatewayEvent;
use crate::ports::chat::BotIdentity;
use crate::router::Router;

/// Consumes gateway events and dispatches messages to the router.
pub struct Bot {
    router: Arc<Router>,
}

impl Bot {
    /// Creates a bot around a router.
    #[must_use]
    pub fn new(router: Arc<Router>) -> Self {
        Self { router }
    }

    /// Runs until `events` closes, then waits for in-flight handlers.
    ///
    /// Handlers run concurrently and finish in any order. A panicking handler
    /// is logged and does not stop the loop.
    pub async fn run(self, mut events: mpsc::Receiver<GatewayEvent>) {
        let mut identity: Option<Arc<BotIdentity>> = None;
        let mut handlers = JoinSet::new();

        loop {
            tokio::select! {
                event = events.recv() => match event {
                    None => break,
                    Some(GatewayEvent::Ready { bot, guild_count }) => {
                        info!(bot = %bot.username, id = %bot.id, "connected to Discord");
                        info!(guild_count, "bot is ready");
                        identity = Some(Arc::new(bot));
                    }
                    Some(GatewayEvent::Message(message)) => {
                        let Some(bot) = identity.as_ref().map(Arc::clone) else {
                            debug!(message_id = %message.id, "message before ready, ignored");
                            continue;
                        };
                        let router = Arc::clone(&self.router);
                        handlers.spawn(async move { router.handle(&bot, &message).await });
                    }
                },
                Some(joined) = handlers.join_next(), if !handlers.is_empty() => {
                    log_join(joined);
                }
            }
        }

        while let Some(joined) = handlers.join_next().await {
            log_join(joined);
        }
    }
}

fn log_join(joined: Result<(), tokio::task::JoinError>) {
    if let Err(e) = joined {
        error!(error = %e, "message handler crashed");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::error::CompletionError;
    use crate::persona::Persona;
    use crate::ports::chat::{Author, ChatFuture, ChatPlatform, IncomingMessage};
    use crate::ports::completion::{CompletionApi, CompletionRequest};
    use crate::requester::Requester;
    use crate::router::CommandTrigger;

    struct Echo;

    impl CompletionApi for Echo {
        fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
            Ok(request.messages.last().map(|m| format!("echo: {}", m.content)).unwrap_or_default())
        }
    }

    /// Records replies; panics when asked to reply to `"boom"`.
    #[derive(Default)]
    struct Chat(Mutex<Vec<String>>);

    impl ChatPlatform for Chat {
        fn send_typing(&self, _channel_id: &str) -> ChatFuture<'_> {
            Box::pin(async { Ok(()) })
        }

        fn reply(&self, message: &IncomingMessage, content: &str) -> ChatFuture<'_> {
            assert!(message.content != "boom", "chat backend crashed");
            self.0.lock().unwrap().push(content.to_owned());
            Box::pin(async { Ok(()) })
        }
    }

    fn dm(id: &str, author: &str, content: &str) -> GatewayEvent {
        GatewayEvent::Message(IncomingMessage {
            id: id.into(),
            channel_id: "dm".into(),
            guild_id: None,
            author: Author { id: author.into(), username: author.into(), bot: false },
            content: content.into(),
            mentions: vec![],
        })
    }

    fn ready() -> GatewayEvent {
        GatewayEvent::Ready {
            bot: BotIdentity { id: "100".into(), username: "relay".into() },
            guild_count: 3,
        }
    }

    async fn run_with(events: Vec<GatewayEvent>) -> Vec<String> {
        let chat = Arc::new(Chat::default());
        let requester =
            Arc::new(Requester::new(Arc::new(Echo), Arc::new(Persona::default()), 2));
        let router = Arc::new(Router::new(
            requester,
            Arc::clone(&chat) as Arc<dyn ChatPlatform>,
            CommandTrigger::new("emb", "m"),
        ));

        let (tx, rx) = mpsc::channel(16);
        for event in events {
            tx.send(event).await.unwrap();
        }
        drop(tx);
        Bot::new(router).run(rx).await;

        let mut replies = chat.0.lock().unwrap().clone();
        replies.sort();
        replies
    }

    #[tokio::test]
    async fn answers_messages_after_ready() {
        let replies = run_with(vec![ready(), dm("1", "7", "first"), dm("2", "8", "second")]).await;
        assert_eq!(replies, vec!["echo: first".to_owned(), "echo: second".to_owned()]);
    }

    #[tokio::test]
    async fn ignores_messages_before_ready() {
        let replies = run_with(vec![dm("1", "7", "early"), ready(), dm("2", "7", "late")]).await;
        assert_eq!(replies, vec!["echo: late".to_owned()]);
    }

    #[tokio::test]
    async fn own_messages_are_not_answered() {
        let replies = run_with(vec![ready(), dm("1", "100", "echo: hi")]).await;
        assert!(replies.is_empty());
    }

    #[tokio::test]
    async fn crashed_handler_does_not_stop_the_loop() {
        let replies = run_with(vec![ready(), dm("1", "7", "boom"), dm("2", "7", "after")]).await;
        assert_eq!(replies, vec!["echo: after".to_owned()]);
    }
}
