use crate::config::ProxyEndpoint;
use crate::traits::{ContextProvider, RunStats, WalletCredential};
use crate::utils::delay;
use crate::utils::proxy_manager::ProxyManager;
use crate::utils::retry::TransactionExecutor;
use crate::utils::sequencer::{OperationSequencer, OperationSpec, SequenceSettings};
use anyhow::Result;
use std::time::{Duration, Instant};
use tracing::{info, Instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSettings {
    pub delay_between_wallets_ms: u64,
    pub use_jitter: bool,
    pub rotate_proxies: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct RunReport {
    pub stats: RunStats,
    pub wallets_total: usize,
    pub elapsed: Duration,
}

impl RunReport {
    /// `Xm Ys`
    pub fn runtime(&self) -> String {
        let secs = self.elapsed.as_secs();
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

/// Drives every wallet through the operation sequence, strictly one after another.
pub struct WorkerRunner<'a> {
    executor: &'a TransactionExecutor,
    sequence: SequenceSettings,
    settings: RunSettings,
}

impl<'a> WorkerRunner<'a> {
    pub fn new(
        executor: &'a TransactionExecutor,
        sequence: SequenceSettings,
        settings: RunSettings,
    ) -> Self {
        Self {
            executor,
            sequence,
            settings,
        }
    }

    /// Errors from `provider.connect` abort the whole run.
    pub async fn run_all<W, P>(
        &self,
        wallets: &[W],
        proxies: &[ProxyEndpoint],
        provider: &P,
        specs: &[OperationSpec<P::Context>],
    ) -> Result<RunReport>
    where
        W: WalletCredential,
        P: ContextProvider<W>,
    {
        let start_time = Instant::now();
        let sequencer = OperationSequencer::new(self.executor, self.sequence);
        let mut stats = RunStats::default();
        let total = wallets.len();

        for (i, wallet) in wallets.iter().enumerate() {
            info!(
                "Processing wallet {}/{} ({}% complete)",
                i + 1,
                total,
                progress_percent(i, total)
            );

            let proxy = ProxyManager::select_proxy(proxies, i, self.settings.rotate_proxies);
            let address = wallet.address();
            let span = tracing::info_span!("wallet", wallet_id = %format!("{:03}", i + 1));

            let processed: Result<()> = async {
                info!("WALLET Processing {} ({})", short_address(&address), i + 1);

                let ctx = provider.connect(wallet, proxy).await?;
                if !provider.preflight(&ctx).await? {
                    stats.wallets_skipped += 1;
                    return Ok(());
                }

                let report = sequencer.run_sequence(&ctx, &address, specs).await;
                let ws = report.stats;
                info!(
                    "SUMMARY Wallet {}: {} successful, {} failed, {} skipped, {} total",
                    short_address(&address),
                    ws.successful,
                    ws.failed,
                    ws.skipped,
                    ws.total
                );
                stats.merge(&ws);
                Ok(())
            }
            .instrument(span)
            .await;
            processed?;

            if i + 1 < total {
                let base_ms = self.settings.delay_between_wallets_ms;
                info!(
                    "Waiting {:.1}s before processing next wallet...",
                    base_ms as f64 / 1000.0
                );
                delay::pause(base_ms, self.settings.use_jitter).await;
            }
        }

        let report = RunReport {
            stats,
            wallets_total: total,
            elapsed: start_time.elapsed(),
        };

        info!(
            "COMPLETE Processed {}/{} wallets with {} successful and {} failed transactions",
            report.stats.wallets_completed(),
            total,
            report.stats.successful,
            report.stats.failed
        );
        info!(
            "Runtime: {} | Success Rate: {:.2}%",
            report.runtime(),
            report.stats.success_rate()
        );

        Ok(report)
    }
}

/// Share of wallets already done when wallet `done + 1` starts, rounded to
/// the nearest percent.
pub fn progress_percent(done: usize, total: usize) -> usize {
    if total == 0 {
        return 0;
    }
    (done * 200 + total) / (total * 2)
}

/// `0x1234...abcd`
pub fn short_address(address: &str) -> String {
    if address.len() < 10 || !address.is_ascii() {
        return address.to_string();
    }
    format!("{}...{}", &address[..6], &address[address.len() - 4..])
}
