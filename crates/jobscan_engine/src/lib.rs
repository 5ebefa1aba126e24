//! Jobscan engine: backend IO, scheduling and effect execution.
mod backend;
mod decode;
mod opener;
mod poller;
mod session;
mod timer;
mod types;

pub use backend::{Backend, BackendSettings, ReqwestBackend};
pub use decode::{decode_start_reply, decode_status};
pub use opener::{OpenError, SystemUrlOpener, UrlOpener};
pub use poller::Poller;
pub use session::{Session, SessionConfig, Timing};
pub use timer::OneShotTimer;
pub use types::{BackendError, FailureKind};
