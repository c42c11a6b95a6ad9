use anyhow::Result;
use shopfront_core::config::{AppConfig, ConfigOverrides, LoadOptions};

/// Run one message through the workflow and render intent plus payload.
/// `--dummy` forces in-process tools with mock commerce responses so the
/// whole run works offline.
pub async fn run(message: &str, dummy: bool) -> Result<String> {
    let config = AppConfig::load(LoadOptions {
        overrides: ConfigOverrides {
            dummy_responses: dummy.then_some(true),
            local_tools: dummy.then_some(true),
            ..ConfigOverrides::default()
        },
        ..LoadOptions::default()
    })?;

    let workflow = shopfront_agent::build_workflow(&config)?;
    let state = workflow.run(message).await;

    let intent = state.intent.map(|intent| intent.as_str()).unwrap_or("unknown");
    Ok(format!("intent: {intent}\n{}", state.final_response))
}
