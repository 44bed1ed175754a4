//! Scan Dashboard Common Library
//!
//! CLIとWeb(WASM)で共有されるスキャンクライアントのコア:
//! ダイジェスト計算、アップロードのオーケストレーション、結果ストア

pub mod api;
pub mod digest;
pub mod error;
pub mod file;
pub mod notify;
pub mod orchestrator;
pub mod progress;
pub mod session;
pub mod store;
pub mod types;

pub use api::{parse_history, ScanApi, DEFAULT_API_URL};
pub use digest::{compute_digest, digest_file, DIGEST_HEX_LEN};
pub use error::{ApiError, DigestError, OrchestratorError, Result};
pub use file::{format_file_size, SelectedFile, MAX_FILE_SIZE};
pub use notify::{Level, Notification, NotificationCenter, NOTIFICATION_TTL_SECS};
pub use orchestrator::{DigestTicket, Orchestrator, Phase, ScanOutcome, ScanTicket, Transition, EICAR_TEST_NAME};
pub use progress::ProgressIndicator;
pub use session::SessionState;
pub use store::{classify, AggregateCounts, ResultStore, Verdict, VISIBLE_LIMIT};
pub use types::{ApiHealth, BackendStats, BackendStatus, PrimaryEngine, ScanResult, ScanStatus, SecondaryEngine};
