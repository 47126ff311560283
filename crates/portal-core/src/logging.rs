//! Log output for hosts embedding the library.

use tracing_subscriber::filter::Directive;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install a global fmt subscriber filtered by `RUST_LOG`.
///
/// `default_directive` (e.g. `"portal_core=info"`) is added on top of
/// `RUST_LOG`. Returns `false` when the directive is invalid or a global
/// subscriber is already set.
pub fn init_logging(default_directive: &str) -> bool {
    let directive = match default_directive.parse::<Directive>() {
        Ok(d) => d,
        Err(_) => return false,
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(directive))
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok()
}
