/// Default path of the daemon's `KEY="VALUE"` config file.
pub(super) const DEFAULT_CONFIG_PATH: &str = "/etc/fabric-durability/fabric-durability.cfg";

/// Default port the daemon listens on (localhost only).
pub(super) const DEFAULT_PORT: u16 = 7092;

/// 0 sizes the trial pool from the hardware (all threads but one).
pub(super) const DEFAULT_WORKER_THREADS: usize = 0;

/// 0 runs one trial per worker in each batch.
pub(super) const DEFAULT_BATCH_SIZE: usize = 0;

/// Upper bound on trials per batch, keeps restarts responsive.
pub(super) const MAX_BATCH_SIZE: usize = 100_000;

/// Capacity of the event broadcast channel.
pub(super) const DEFAULT_EVENT_CAPACITY: usize = 256;
