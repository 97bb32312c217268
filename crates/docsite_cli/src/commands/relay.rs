//! `docsite relay` subcommands.

use anyhow::Result;
use docsite_relay::RelayConfig;
use tracing::info;

use crate::cli::RelayAction;
use crate::output;

pub async fn handle(action: RelayAction) -> Result<()> {
    match action {
        RelayAction::Serve {
            addr,
            allowed_origin,
        } => {
            let mut config = RelayConfig::from_env()?;
            if let Some(addr) = addr {
                config = config.with_addr(addr);
            }
            if let Some(origin) = allowed_origin {
                config = config.with_allowed_origin(origin);
            }

            output::success(&format!(
                "Relay listening on http://{} (store {}/{})",
                config.addr, config.store.location.owner, config.store.location.repo
            ));
            docsite_relay::run(config, async {
                let _ = tokio::signal::ctrl_c().await;
                info!("interrupt received, stopping relay");
            })
            .await?;
            output::dim("Relay stopped");
            Ok(())
        }
    }
}
