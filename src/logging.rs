//! ログ初期化（tracing-subscriber）

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "scan_dashboard=warn,scan_dashboard_common=warn";
const VERBOSE_FILTER: &str = "scan_dashboard=debug,scan_dashboard_common=debug";

/// `RUST_LOG` が未設定なら既定のフィルタを使う
pub fn default_filter(verbose: bool) -> String {
    std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER }.to_string()
    })
}

/// 標準エラーへの出力を初期化（2回目以降は無視）
pub fn init(verbose: bool) {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::new(default_filter(verbose)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
