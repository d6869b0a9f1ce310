use crate::bot::{functions::functions::FunctionError, registry::sync::{SyncOutcome, SyncReport}};

pub struct Replies;

impl Replies {
    pub fn sync_report(report: &SyncReport) -> String {
        let lines: Vec<String> = report.scopes.iter().map(|scope| match &scope.outcome {
            SyncOutcome::Registered(count) => format!("✅ {}: {} command(s) registered", scope.scope, count),
            SyncOutcome::Skipped => format!("⏳ {}: application not ready, nothing sent", scope.scope),
            SyncOutcome::Failed(e) => format!("❌ {}: {}", scope.scope, e),
        }).collect();

        lines.join("\n")
    }

    pub fn reload_done(count: usize) -> String {
        format!("🔄 Reloaded {count} application command(s)!")
    }

    pub fn reload_failed() -> String {
        "❌ Reload failed, the previous commands are still cached".to_string()
    }

    pub fn function_error(error: &FunctionError) -> String {
        format!("❌ {error}")
    }
}
