//! `chatrelay ask` command.

use std::path::Path;
use std::sync::Arc;

use crate::config::Config;
use crate::context::ServiceContext;
use crate::persona::DEFAULT_PROMPT;
use crate::requester::Requester;

/// Execute the `ask` command: print the bounded reply for one prompt.
///
/// # Errors
///
/// Returns an error string if the context or runtime cannot be built. API
/// failures are printed as the fallback reply, like in chat.
pub fn run(config: &Config, prompt: &str, replay: Option<&Path>) -> Result<(), String> {
    let ctx = match replay {
        Some(path) => ServiceContext::replaying(config, path)?,
        None => ServiceContext::live(config)?,
    };

    let prompt = match prompt.trim() {
        "" => DEFAULT_PROMPT,
        trimmed => trimmed,
    };

    let runtime = super::runtime()?;
    let reply = runtime.block_on(async {
        let requester =
            Requester::new(Arc::clone(&ctx.completion), Arc::new(config.persona.clone()), 1);
        requester.get_response(prompt).await
    });
    drop(runtime);
    drop(ctx);

    println!("{reply}");
    Ok(())
}
