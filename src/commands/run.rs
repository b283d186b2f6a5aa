//! `chatrelay run` command.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::info;

use crate::bot::Bot;
use crate::config::Config;
use crate::context::ServiceContext;
use crate::gateway;
use crate::requester::Requester;
use crate::router::{CommandTrigger, Router};

const EVENT_QUEUE: usize = 64;

/// Execute the `run` command: serve Discord until Ctrl-C.
///
/// # Errors
///
/// Returns an error string if the context or runtime cannot be built, or if
/// the gateway rejects the bot token.
pub fn run(config: &Config) -> Result<(), String> {
    let ctx = ServiceContext::live(config)?;
    let runtime = super::runtime()?;
    let result = runtime.block_on(serve(&ctx, config));
    // Blocking HTTP clients must outlive the runtime.
    super::shutdown(runtime, super::SHUTDOWN_GRACE);
    drop(ctx);
    result
}

async fn serve(ctx: &ServiceContext, config: &Config) -> Result<(), String> {
    let requester = Arc::new(Requester::new(
        Arc::clone(&ctx.completion),
        Arc::new(config.persona.clone()),
        config.workers,
    ));
    let router = Arc::new(Router::new(
        requester,
        Arc::clone(&ctx.chat),
        CommandTrigger::new(&config.command_prefix, &config.command_name),
    ));

    let (tx, rx) = mpsc::channel(EVENT_QUEUE);
    let gateway =
        tokio::spawn(gateway::run(config.gateway_url.clone(), config.discord_token.clone(), tx));

    info!(
        persona = %config.persona.name,
        model = %config.persona.model,
        command = %format!("{}{}", config.command_prefix, config.command_name),
        "starting bot"
    );

    tokio::select! {
        // The bot loop ends once the gateway task has dropped its sender.
        () = Bot::new(router).run(rx) => match gateway.await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(e.to_string()),
            Err(e) => Err(format!("gateway task failed: {e}")),
        },
        signal = tokio::signal::ctrl_c() => {
            info!("shutting down");
            gateway.abort();
            signal.map_err(|e| format!("failed to listen for Ctrl-C: {e}"))
        }
    }
}
