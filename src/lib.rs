pub mod agent_engine;
pub mod config;
pub mod errors;
pub mod executor;
pub mod extraction;
pub mod perception;
pub mod tasks;

#[cfg(test)]
mod testing;

pub use agent_engine::align::TargetSelector;
pub use agent_engine::session::AgentSession;
pub use config::AppConfig;
pub use errors::{EfClawError, EfClawResult};

use crate::executor::enigo_input::EnigoInput;
use crate::executor::input::WindowHandle;
use crate::perception::traits::Perception;

/// Installs the fmt subscriber; `RUST_LOG` overrides the `info` default.
pub fn init_tracing() {
    // Load .env file if present (ignore error if not found)
    let _ = dotenvy::dotenv();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();
}

/// Session driving the real desktop pointer and keyboard against `window`,
/// with configuration resolved by [`config::load_config`].
pub fn desktop_session<P: Perception>(
    perception: P,
    window: WindowHandle,
) -> EfClawResult<AgentSession<P, EnigoInput>> {
    let config = config::load_config()?;
    let input = EnigoInput::new()?;
    tracing::info!(window = window.0, "desktop session ready");
    Ok(AgentSession::new(perception, input, window, config))
}
