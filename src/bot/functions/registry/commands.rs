use std::sync::Arc;

use futures::future::BoxFuture;
use once_cell::sync::Lazy;
use tracing::{info, warn};

use crate::{bot::{functions::{functions::{FnFunction, FunctionContext, FunctionError, FunctionOutcome, FunctionResult, ScriptFunction}, FunctionGroup, FunctionRegistration}, replies::Replies}, func};

pub static REGISTRY_FUNCTIONS: Lazy<Arc<FunctionGroup>> = Lazy::new(|| {
    Arc::new(FunctionGroup {
        name: "registry".into(),
        functions: vec![
            func!(sync_function(), "sync"),
            func!(reload_function(), "reload"),
        ]
    })
});

pub fn sync_function() -> Arc<dyn ScriptFunction> {
    Arc::new(FnFunction::new(
        |ctx: FunctionContext, args: Vec<String>| -> BoxFuture<'static, FunctionOutcome> {
            Box::pin(async move {
                let Some(manager) = ctx.manager else {
                    return FunctionOutcome::Reported(FunctionError::ManagerNotFound);
                };
                if manager.command_size().await == 0 {
                    return FunctionOutcome::Reported(FunctionError::EmptyCommandSet);
                }

                // No ids means the global scope
                let targets = (!args.is_empty()).then_some(args.as_slice());
                match manager.sync(targets).await {
                    Ok(report) => {
                        info!("Sync finished, {} scope(s) registered", report.registered());
                        FunctionOutcome::Continue(FunctionResult {
                            reply: Some(Replies::sync_report(&report)),
                            success: Some(report.is_success()),
                        })
                    }
                    Err(e) => {
                        tracing::error!("Global sync failed: {e:?}");
                        FunctionOutcome::Reported(FunctionError::Custom(e.to_string()))
                    }
                }
            })
        },
        "Push every cached application command to Discord",
        "!sync [guild_id ...]",
        "sync",
    ))
}

pub fn reload_function() -> Arc<dyn ScriptFunction> {
    Arc::new(FnFunction::new(
        |ctx: FunctionContext, _args: Vec<String>| -> BoxFuture<'static, FunctionOutcome> {
            Box::pin(async move {
                let Some(manager) = ctx.manager else {
                    return FunctionOutcome::Reported(FunctionError::ManagerNotFound);
                };
                if manager.load_state().await.is_none() {
                    return FunctionOutcome::Reported(FunctionError::NoSpecificationDirectory);
                }

                let (reply, success) = match manager.reload().await {
                    Ok(_) => (Replies::reload_done(manager.command_size().await), true),
                    Err(e) => {
                        warn!("Reload failed: {e}");
                        (Replies::reload_failed(), false)
                    }
                };

                FunctionOutcome::Continue(FunctionResult { reply: Some(reply), success: Some(success) })
            })
        },
        "Reload application commands from the last loaded directory",
        "!reload",
        "reload",
    ))
}
