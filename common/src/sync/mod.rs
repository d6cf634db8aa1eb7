pub mod cancel;
pub mod spinlock;

pub use cancel::CancelToken;
pub use spinlock::{SpinLock, SpinLockGuard};
