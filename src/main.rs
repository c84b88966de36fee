//! Anchor Remit gateway
//!
//! ```text
//! anchor_remit --env dev              # config/dev.yaml, PostgreSQL if configured
//! anchor_remit --env dev --port 9090
//! anchor_remit --offline              # in-process anchor + memory store
//! ```

use anyhow::Context;
use clap::Parser;
use std::sync::Arc;

use anchor_remit::anchor::{AnchorClient, HttpAnchorClient};
use anchor_remit::config::AppConfig;
use anchor_remit::db::Database;
use anchor_remit::gateway::{run_server, state::AppState};
use anchor_remit::horizon::{HorizonSubmitter, LedgerSubmitter};
use anchor_remit::logging;
use anchor_remit::store::{MemoryStore, Store};

#[derive(Parser, Debug)]
#[command(name = "anchor_remit", version = env!("GIT_HASH"), about = "Anchor settlement gateway")]
struct Args {
    /// Config environment, loads config/{env}.yaml
    #[arg(long, default_value = "dev")]
    env: String,

    /// Override gateway.port
    #[arg(long)]
    port: Option<u16>,

    /// Use the in-process anchor, memory store and ledger
    #[arg(long)]
    offline: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = AppConfig::load(&args.env).context("loading config")?;
    if let Some(port) = args.port {
        config.gateway.port = port;
    }

    let _guard = logging::init_logging(&config);
    tracing::info!(
        env = %args.env,
        version = env!("GIT_HASH"),
        home_domain = %config.anchor.home_domain,
        "Starting anchor_remit"
    );

    let state = if args.offline {
        offline_state(&config)?
    } else {
        online_state(&config).await?
    };

    run_server(&config.gateway, Arc::new(state))
        .await
        .context("gateway server")?;
    Ok(())
}

async fn online_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let (store, store_kind): (Arc<dyn Store>, &'static str) = match &config.postgres_url {
        Some(url) => {
            let db = Database::connect(url)
                .await
                .context("connecting to PostgreSQL")?;
            db.migrate().await.context("initializing schema")?;
            (Arc::new(db.into_store()), "postgres")
        }
        None => {
            tracing::warn!("postgres_url not set, records are kept in memory only");
            (Arc::new(MemoryStore::new()), "memory")
        }
    };

    let anchor: Arc<dyn AnchorClient> =
        Arc::new(HttpAnchorClient::new(&config.anchor).context("building anchor client")?);
    let ledger: Arc<dyn LedgerSubmitter> =
        Arc::new(HorizonSubmitter::new(&config.ledger).context("building Horizon client")?);

    Ok(AppState::new(
        store,
        store_kind,
        anchor,
        ledger,
        config.settlement.clone(),
    ))
}

#[cfg(feature = "offline-anchor")]
fn offline_state(config: &AppConfig) -> anyhow::Result<AppState> {
    use anchor_remit::anchor::FakeAnchor;
    use anchor_remit::horizon::MemoryLedger;

    tracing::warn!("Offline mode: anchor, store and ledger are in-process fakes");
    Ok(AppState::new(
        Arc::new(MemoryStore::new()),
        "memory",
        Arc::new(FakeAnchor::new(config.anchor.home_domain.clone())),
        Arc::new(MemoryLedger::new()),
        config.settlement.clone(),
    ))
}

#[cfg(not(feature = "offline-anchor"))]
fn offline_state(_config: &AppConfig) -> anyhow::Result<AppState> {
    anyhow::bail!("--offline requires the `offline-anchor` feature")
}
