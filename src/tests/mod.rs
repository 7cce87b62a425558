//! Crate-level test suites
//!
//! 集成到 crate 内部的测试集

mod properties;

/// Route `log` output to the test harness
///
/// 将 `log` 输出重定向到测试框架
pub(crate) fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
