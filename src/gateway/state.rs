use std::sync::Arc;

use crate::anchor::AnchorClient;
use crate::auth_session::AuthSessionManager;
use crate::config::SettlementConfig;
use crate::horizon::LedgerSubmitter;
use crate::kyc::KycCoordinator;
use crate::settlement::SettlementOrchestrator;
use crate::store::Store;
use crate::transfer::TransferService;

/// Shared gateway state
///
/// Every service holds the same store and anchor client.
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub transfers: TransferService,
    pub sessions: AuthSessionManager,
    pub kyc: KycCoordinator,
    pub settlement: SettlementOrchestrator,
    pub ledger: Arc<dyn LedgerSubmitter>,
    /// Label reported by the health check (`postgres` / `memory`)
    pub store_kind: &'static str,
    /// Home domain of the configured anchor, reported by the health check
    pub anchor_domain: String,
}

impl AppState {
    pub fn new(
        store: Arc<dyn Store>,
        store_kind: &'static str,
        anchor: Arc<dyn AnchorClient>,
        ledger: Arc<dyn LedgerSubmitter>,
        settlement: SettlementConfig,
    ) -> Self {
        Self {
            anchor_domain: anchor.home_domain().to_string(),
            transfers: TransferService::new(store.clone()),
            sessions: AuthSessionManager::new(store.clone(), anchor.clone()),
            kyc: KycCoordinator::new(store.clone(), anchor.clone()),
            settlement: SettlementOrchestrator::new(store.clone(), anchor, settlement),
            ledger,
            store,
            store_kind,
        }
    }
}
