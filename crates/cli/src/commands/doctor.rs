use anyhow::Result;
use serde_json::json;
use shopfront_core::config::{AppConfig, LoadOptions};

/// Report which credentials are present and which degraded modes are
/// active. Values are presence flags only; secrets never reach the output.
pub fn run(json_output: bool) -> Result<String> {
    let config = AppConfig::load(LoadOptions::default())?;

    let llm_key = config.llm_key_present();
    let commerce_token = config.commerce.access_token.is_some();
    let tool_mode = if config.commerce.local_tools { "local" } else { "remote" };
    let rag_ready = config.rag_ready();

    if json_output {
        let report = json!({
            "llm": { "api_key_present": llm_key, "model": config.llm.model },
            "commerce": {
                "access_token_present": commerce_token,
                "dummy_responses": config.commerce.dummy_responses,
                "catalog_bypass": config.commerce.catalog_bypass,
                "tool_mode": tool_mode,
                "tools_url": config.commerce.tools_url,
            },
            "rag": {
                "ready": rag_ready,
                "api_key_present": config.rag.api_key.is_some(),
                "index_host_present": config.rag.index_host.is_some(),
                "index_name_present": config.rag.index_name.is_some(),
            },
            "server": {
                "bind_address": config.server.bind_address,
                "port": config.server.port,
            },
        });
        return Ok(serde_json::to_string_pretty(&report)?);
    }

    let mut lines = Vec::new();
    lines.push(format!("llm api key: {}", presence(llm_key)));
    lines.push(format!("llm model: {}", config.llm.model));
    lines.push(format!("commerce access token: {}", presence(commerce_token)));
    lines.push(format!("commerce dummy responses: {}", config.commerce.dummy_responses));
    lines.push(format!("catalog bypass: {}", config.commerce.catalog_bypass));
    lines.push(format!("tool mode: {tool_mode}"));
    lines.push(format!(
        "rag: {}",
        if rag_ready { "ready".to_string() } else { "degraded (canned answers)".to_string() }
    ));
    lines.push(format!("server: {}:{}", config.server.bind_address, config.server.port));
    Ok(lines.join("\n"))
}

fn presence(present: bool) -> &'static str {
    if present {
        "present"
    } else {
        "MISSING"
    }
}
