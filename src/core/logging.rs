//! Logging initialization

/// Initialize the logging system
///
/// Uses env_logger with default filter level of `info`.
/// Override with RUST_LOG environment variable.
///
/// Library code only emits through the `log` facade; call this once from a binary.
///
/// # Example
/// ```no_run
/// voxmesh::core::logging::init();
/// log::info!("Mesher started");
/// ```
pub fn init() {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    )
    .format_timestamp_millis()
    .init();
}
