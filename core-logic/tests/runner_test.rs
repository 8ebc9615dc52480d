mod common;

use anyhow::{bail, Result};
use async_trait::async_trait;
use common::{ScriptedTask, Step};
use core_logic::{
    progress_percent, ContextProvider, NoopObserver, OperationCategory, OperationSpec,
    ProxyEndpoint, RetryConfig, RunSettings, SequenceSettings, TransactionExecutor,
    WalletCredential, WorkerRunner,
};
use std::sync::{Arc, Mutex};

struct FakeWallet {
    address: String,
    funded: bool,
}

impl WalletCredential for FakeWallet {
    fn address(&self) -> String {
        self.address.clone()
    }
}

struct FakeContext {
    funded: bool,
}

#[derive(Default)]
struct FakeProvider {
    connections: Mutex<Vec<(String, Option<String>)>>,
    refuse: Option<String>,
}

#[async_trait]
impl ContextProvider<FakeWallet> for FakeProvider {
    type Context = FakeContext;

    async fn connect(
        &self,
        wallet: &FakeWallet,
        proxy: Option<&ProxyEndpoint>,
    ) -> Result<FakeContext> {
        if self.refuse.as_deref() == Some(wallet.address.as_str()) {
            bail!("node unreachable");
        }
        self.connections
            .lock()
            .unwrap()
            .push((wallet.address.clone(), proxy.map(|p| p.url.clone())));
        Ok(FakeContext {
            funded: wallet.funded,
        })
    }

    async fn preflight(&self, ctx: &FakeContext) -> Result<bool> {
        Ok(ctx.funded)
    }
}

fn wallet(address: &str, funded: bool) -> FakeWallet {
    FakeWallet {
        address: address.to_string(),
        funded,
    }
}

fn specs() -> Vec<OperationSpec<FakeContext>> {
    vec![
        OperationSpec {
            name: "wrap".into(),
            label: "SUI Wrapping".into(),
            category: OperationCategory::Wrap,
            enabled: true,
            critical: true,
            task: Arc::new(ScriptedTask::always_ok("wrap")),
        },
        OperationSpec {
            name: "swap".into(),
            label: "Swap".into(),
            category: OperationCategory::Swap,
            enabled: true,
            critical: false,
            task: Arc::new(ScriptedTask::new("swap", vec![Step::Succeed, Step::Error])),
        },
        OperationSpec {
            name: "lp".into(),
            label: "LP Deposit".into(),
            category: OperationCategory::Liquidity,
            enabled: false,
            critical: false,
            task: Arc::new(ScriptedTask::always_ok("lp")),
        },
    ]
}

fn settings() -> RunSettings {
    RunSettings {
        delay_between_wallets_ms: 10,
        use_jitter: true,
        rotate_proxies: true,
    }
}

#[tokio::test]
async fn test_run_all_aggregates_stats() {
    let exec = TransactionExecutor::new(RetryConfig::new(1, 1), Arc::new(NoopObserver));
    let runner = WorkerRunner::new(&exec, SequenceSettings::default(), settings());
    let provider = FakeProvider::default();
    let wallets = vec![
        wallet("0x1111111111", true),
        wallet("0x2222222222", true),
        wallet("0x3333333333", true),
    ];

    let report = runner
        .run_all(&wallets, &[], &provider, &specs())
        .await
        .unwrap();

    // The swap task succeeds once, then errors for every later wallet.
    assert_eq!(report.wallets_total, 3);
    assert_eq!(report.stats.wallets_processed, 3);
    assert_eq!(report.stats.total, 9);
    assert_eq!(report.stats.successful, 4);
    assert_eq!(report.stats.failed, 2);
    assert_eq!(report.stats.skipped, 3);
    assert!(report.stats.is_consistent());
    assert!((report.stats.success_rate() - 66.666).abs() < 0.01);
}

#[tokio::test]
async fn test_unfunded_wallet_is_skipped() {
    let exec = TransactionExecutor::new(RetryConfig::new(1, 1), Arc::new(NoopObserver));
    let runner = WorkerRunner::new(&exec, SequenceSettings::default(), settings());
    let provider = FakeProvider::default();
    let wallets = vec![wallet("0x1111111111", false), wallet("0x2222222222", true)];

    let report = runner
        .run_all(&wallets, &[], &provider, &specs())
        .await
        .unwrap();

    assert_eq!(report.stats.wallets_skipped, 1);
    assert_eq!(report.stats.wallets_processed, 1);
    assert_eq!(report.stats.total, 3);
}

#[tokio::test]
async fn test_proxies_rotate_per_wallet() {
    let exec = TransactionExecutor::new(RetryConfig::new(1, 1), Arc::new(NoopObserver));
    let runner = WorkerRunner::new(&exec, SequenceSettings::default(), settings());
    let provider = FakeProvider::default();
    let proxies = vec![
        ProxyEndpoint::parse("10.0.0.1:80").unwrap(),
        ProxyEndpoint::parse("10.0.0.2:80").unwrap(),
    ];
    let wallets = vec![
        wallet("0xaaaaaaaaaa", true),
        wallet("0xbbbbbbbbbb", true),
        wallet("0xcccccccccc", true),
    ];

    runner
        .run_all(&wallets, &proxies, &provider, &specs())
        .await
        .unwrap();

    let used: Vec<_> = provider
        .connections
        .lock()
        .unwrap()
        .iter()
        .map(|(_, p)| p.clone().unwrap())
        .collect();
    assert_eq!(
        used,
        vec!["http://10.0.0.1:80", "http://10.0.0.2:80", "http://10.0.0.1:80"]
    );
}

#[tokio::test]
async fn test_connect_failure_aborts_run() {
    let exec = TransactionExecutor::new(RetryConfig::new(1, 1), Arc::new(NoopObserver));
    let runner = WorkerRunner::new(&exec, SequenceSettings::default(), settings());
    let provider = FakeProvider {
        refuse: Some("0x2222222222".to_string()),
        ..Default::default()
    };
    let wallets = vec![wallet("0x1111111111", true), wallet("0x2222222222", true)];

    let err = runner
        .run_all(&wallets, &[], &provider, &specs())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("node unreachable"));
}

#[tokio::test]
async fn test_waits_only_between_wallets() {
    let exec = TransactionExecutor::new(RetryConfig::new(1, 1), Arc::new(NoopObserver));
    let settings = RunSettings {
        delay_between_wallets_ms: 100,
        use_jitter: false,
        rotate_proxies: false,
    };
    let runner = WorkerRunner::new(&exec, SequenceSettings::default(), settings);
    let provider = FakeProvider::default();
    let wallets = vec![
        wallet("0x1111111111", true),
        wallet("0x2222222222", true),
        wallet("0x3333333333", true),
    ];

    let start = tokio::time::Instant::now();
    runner
        .run_all(&wallets, &[], &provider, &specs())
        .await
        .unwrap();

    // Two waits for three wallets, none after the last one.
    let elapsed = start.elapsed().as_millis();
    assert!(elapsed >= 200, "elapsed {}ms", elapsed);
    assert!(elapsed < 290, "elapsed {}ms", elapsed);
}

#[tokio::test]
async fn test_single_wallet_does_not_wait() {
    let exec = TransactionExecutor::new(RetryConfig::new(1, 1), Arc::new(NoopObserver));
    let settings = RunSettings {
        delay_between_wallets_ms: 200,
        use_jitter: false,
        rotate_proxies: false,
    };
    let runner = WorkerRunner::new(&exec, SequenceSettings::default(), settings);
    let provider = FakeProvider::default();

    let start = tokio::time::Instant::now();
    runner
        .run_all(&[wallet("0x1111111111", true)], &[], &provider, &specs())
        .await
        .unwrap();

    assert!(start.elapsed().as_millis() < 200);
}

#[tokio::test]
async fn test_skipped_wallets_count_as_completed() {
    let exec = TransactionExecutor::new(RetryConfig::new(1, 1), Arc::new(NoopObserver));
    let runner = WorkerRunner::new(&exec, SequenceSettings::default(), settings());
    let provider = FakeProvider::default();
    let wallets = vec![
        wallet("0x1111111111", false),
        wallet("0x2222222222", true),
        wallet("0x3333333333", false),
    ];

    let report = runner
        .run_all(&wallets, &[], &provider, &specs())
        .await
        .unwrap();

    assert_eq!(report.stats.wallets_processed, 1);
    assert_eq!(report.stats.wallets_skipped, 2);
    assert_eq!(report.stats.wallets_completed(), 3);
}

#[test]
fn test_progress_percent_rounds() {
    assert_eq!(progress_percent(0, 3), 0);
    assert_eq!(progress_percent(1, 3), 33);
    assert_eq!(progress_percent(2, 3), 67);
    assert_eq!(progress_percent(1, 2), 50);
    assert_eq!(progress_percent(1, 8), 13);
    assert_eq!(progress_percent(0, 0), 0);
}

#[test]
fn test_short_address() {
    assert_eq!(
        core_logic::short_address("0x1234567890abcdef"),
        "0x1234...cdef"
    );
    assert_eq!(core_logic::short_address("0x12"), "0x12");
}
