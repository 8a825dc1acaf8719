mod pacer;
mod timer;

pub use pacer::{FALLBACK_REFRESH_HZ, FramePacer};
pub use timer::{FrameStats, HighPrecisionTimer, ManualTimer, Timer};
