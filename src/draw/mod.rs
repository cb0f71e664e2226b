//! 抽奖引擎
//!
//! 按奖品表快照加权抽取, 每个预订号只能抽一次。
//! 归一化与选取是纯函数, 账本是唯一的共享状态。

mod coordinator;
mod error;
mod ledger;
mod normalizer;
mod random;
mod selector;
mod types;

pub use coordinator::DrawCoordinator;
pub use error::DrawError;
pub use ledger::{BookingLedger, MemoryLedger};
pub use normalizer::{CumulativeBound, CumulativeTable, effective_weight, normalize};
pub use random::{FixedSequence, RandomSource, SeededRandom, ThreadRandom};
pub use selector::{locate, select};
pub use types::{BookingId, DrawRecord, Prize};
