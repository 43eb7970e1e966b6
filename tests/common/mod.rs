#![allow(dead_code)]

/// Routes `log` output of the crate through the test harness. Run with
/// `RUST_LOG=merkle_audit=trace` to see builds and proofs.
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Deterministic blocks of varying length.
pub fn blocks(n: usize) -> Vec<Vec<u8>> {
    (0..n)
        .map(|i| format!("block-{}-{}", i, "x".repeat(i % 7)).into_bytes())
        .collect()
}
