//! vmbridge - native dispatch into a hosted scripting VM
//!
//! The embedding application runs a managed scripting VM behind an internal,
//! version-specific binary interface. This crate is the native side of that
//! boundary: it marshals native argument lists into the host's tagged value
//! representation, resolves the dispatch entry points the running build
//! actually has, issues call requests with the matching ABI shape, and
//! re-broadcasts native events to every script that subscribed to them.

pub mod config;
pub mod dispatch;
pub mod host;
pub mod logging;

// Re-export the surface most embedders need
pub use config::BridgeConfig;
pub use dispatch::{
    pack_args, ArgList, DispatchStats, Dispatcher, EventBroadcaster, IntoVariable, StagedArgs,
};
pub use host::{
    AddressResolver, CallbackHandle, EventRegistry, FixedString, HostVariant, ObjectHandle, RawVm,
    ScrapArray, Subscriber, Variable, VmContext,
};
pub use logging::{init_logging, LogConfig};

use tracing::{info, warn};

/// Bridge initialization: install logging and apply a variant override.
///
/// Build detection itself happens outside this crate; record its result with
/// [`host::init_variant`] when the configuration leaves the variant on auto.
pub fn init(config: &BridgeConfig) {
    logging::init_logging(&config.log_config());

    if let Some(forced) = config.variant.forced() {
        match host::init_variant(forced) {
            Ok(()) => {
                info!(target: "vmbridge", variant = %forced, "host variant forced by configuration");
            }
            Err(err) => {
                warn!(target: "vmbridge", %err, "ignoring configured variant override");
            }
        }
    }
}
