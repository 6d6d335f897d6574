//! Tracing setup for wasm hosts.

/// Install a console subscriber and the panic hook.
///
/// `directives` is an `EnvFilter` string such as `"info,heddle_core=debug"`.
/// Calling this again, or after another global subscriber was set, is a
/// no-op. Off wasm nothing is installed; native hosts bring their own
/// subscriber.
#[cfg(all(target_family = "wasm", target_os = "unknown"))]
pub fn init_tracing(directives: &str) {
    use tracing::Level;
    use tracing::subscriber::set_global_default;
    use tracing_subscriber::Registry;
    use tracing_subscriber::filter::EnvFilter;
    use tracing_subscriber::layer::SubscriberExt;

    console_error_panic_hook::set_once();

    let console_level = if cfg!(debug_assertions) {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let wasm_layer = tracing_wasm::WASMLayer::new(
        tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(console_level)
            .build(),
    );

    let filter = EnvFilter::new(directives);
    let reg = Registry::default().with(filter).with(wasm_layer);

    let _ = set_global_default(reg);
}

#[cfg(not(all(target_family = "wasm", target_os = "unknown")))]
pub fn init_tracing(_directives: &str) {}
