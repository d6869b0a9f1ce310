use std::sync::Arc;

use serenity::{all::{Context, EventHandler, Message, Ready}, async_trait};
use tracing::{info, warn};

use crate::bot::{dispatcher::dispatcher::dispatch_message, functions::functions::FunctionOutcome, platforms::discord::discord::SerenityRegistrar, replies::Replies, state::def::AppState};

pub struct Handler {
    pub state: Arc<AppState>,
}

#[async_trait]
impl EventHandler for Handler {
    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot || !self.state.config.is_owner(msg.author.id.get()) {
            return;
        }

        let outcome = dispatch_message(&self.state.functions, self.state.function_context(), &self.state.config.prefix, &msg.content).await;

        let reply = match outcome {
            Some(FunctionOutcome::Continue(result)) => result.reply,
            Some(FunctionOutcome::Reported(e)) => Some(Replies::function_error(&e)),
            None => None,
        };

        if let Some(reply) = reply {
            if let Err(why) = msg.channel_id.say(&ctx.http, reply).await {
                tracing::error!("Error sending message: {why:?}");
            }
        }
    }

    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("{} is connected!", ready.user.name);

        let registrar = SerenityRegistrar::new(ctx.http.clone(), ctx.cache.clone());
        self.state.manager.attach_registrar(Arc::new(registrar)).await;

        if !self.state.config.sync_on_ready {
            return;
        }
        if self.state.manager.command_size().await == 0 {
            warn!("No commands cached, skipping sync on ready");
            return;
        }

        match self.state.manager.sync(self.state.config.sync_targets()).await {
            Ok(report) => {
                for (scope, e) in report.failures() {
                    warn!("Sync on ready failed for {}: {}", scope, e);
                }
                info!("Sync on ready registered {} scope(s)", report.registered());
            }
            Err(e) => tracing::error!("Sync on ready failed: {e:?}"),
        }
    }
}
