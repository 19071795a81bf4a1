use clap::Args;

use ipss_daemon::state::AppState;

#[derive(Args, Debug, Clone)]
pub struct Health;

#[async_trait::async_trait]
impl crate::cli::op::Op for Health {
    type Error = std::convert::Infallible;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut lines = Vec::new();

        lines.push("Config:".to_string());
        match AppState::load(ctx.config_path.clone()) {
            Ok(state) => {
                lines.push(format!("  directory:   {}", state.ipss_dir.display()));
                lines.push("  config.toml: OK".to_string());
                lines.push(format!(
                    "  datastore:   {}",
                    state.config.datastore_path.display()
                ));
                lines.push(format!(
                    "  blockstore:  {}",
                    state.config.blockstore_path.display()
                ));
                lines.push(format!("  api_port:    {}", state.config.api_port));
            }
            Err(e) => {
                lines.push(format!("  error: {}", e));
            }
        }

        let base = ctx.client.base_url();
        let client = ctx.client.http_client();

        lines.push(String::new());
        lines.push(format!("Daemon ({}):", base));

        let healthz_url = format!("{}/healthz", base.as_str().trim_end_matches('/'));
        match client.get(&healthz_url).send().await {
            Ok(resp) if resp.status().is_success() => {
                lines.push("  healthz: OK".to_string());
            }
            Ok(resp) => {
                lines.push(format!("  healthz: UNHEALTHY ({})", resp.status()));
            }
            Err(_) => {
                lines.push("  healthz: NOT REACHABLE".to_string());
            }
        }

        Ok(lines.join("\n"))
    }
}
