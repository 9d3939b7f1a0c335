//! 食事する哲学者
//!
//! N 人の Actor が輪になって座り、隣同士で 1 本ずつ Resource を共有する。
//! 各 Actor は 2 つの Resource を通し番号の小さい順に取るので、循環待ちが起きずデッドロックしない。

pub mod actor;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod guard;
pub mod observer;
pub mod ordering;
pub mod report;
pub mod resource;

pub use actor::{Actor, ActorId, ActorState, ActorSummary};
pub use config::{Config, MUSICIANS};
pub use coordinator::{dine, Coordinator};
pub use error::{ConfigError, ReleaseError, RunError};
pub use guard::{Held, PairGuard};
pub use observer::{Event, LogObserver, Observer, Phase, Record, Recorder, Role, Silent};
pub use ordering::{order_pair, AcquisitionPlan};
pub use report::{ResourceReport, RunReport};
pub use resource::{Resource, ResourceId};
