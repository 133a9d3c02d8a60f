use simplelog::{Config, LevelFilter, TestLogger};

/// Routes `log` output through the test harness. Safe to call from every test.
pub(crate) fn init_logging() {
    let _ = TestLogger::init(LevelFilter::Debug, Config::default());
}
