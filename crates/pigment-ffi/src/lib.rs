//! Pigment C ABI
//!
//! One `extern "C"` entry point per renderer operation, for hosts that
//! drive the engine from another runtime:
//! - Surfaces, offscreen buffers and frame lifecycle
//! - Transform/clip and paint stacks
//! - Path building, shape and image drawing
//! - Font loading, text drawing and metrics
//! - Image loading and encoding
//! - Pseudo-terminal allocation
//!
//! Resources, fonts and images are opaque `u64` handles; 0 is never a
//! valid handle and signals failure. Text arguments are a byte pointer and
//! length, decoded as UTF-8 with invalid sequences replaced. Nothing here
//! panics across the boundary: errors are logged and mapped to 0 handles,
//! `false` or nonzero status codes.

use std::sync::{Arc, LazyLock, OnceLock};

use pigment_render::{FontCatalog, RenderConfig, catalog_for};
use tracing_subscriber::EnvFilter;

mod args;
mod registry;

pub mod draw;
pub mod image;
pub mod path;
pub mod pty;
pub mod state;
pub mod surface;
pub mod text;

/// Configuration and font catalog shared by every object created through
/// the C ABI
pub(crate) struct Context {
    pub(crate) config: Arc<RenderConfig>,
    pub(crate) fonts: Arc<FontCatalog>,
}

static CONTEXT: LazyLock<Context> = LazyLock::new(|| {
    let config = Arc::new(RenderConfig::default());
    let fonts = catalog_for(&config);
    Context { config, fonts }
});

static LOGGING: OnceLock<()> = OnceLock::new();

pub(crate) fn context() -> &'static Context {
    &CONTEXT
}

/// Install logging and load system fonts. Safe to call more than once;
/// other entry points work without it but log nothing.
///
/// The log filter is read from `RUST_LOG` and defaults to `warn`.
#[unsafe(no_mangle)]
pub extern "C" fn pigment_init() {
    LOGGING.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        // The host may already have installed a subscriber
        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
    });
    let context = context();
    tracing::debug!(
        "Pigment initialized: {} font faces, {} families",
        context.fonts.len(),
        context.fonts.family_count()
    );
}
