//! Process-wide configuration context
//!
//! An opt-in accessor for programs that want a single shared configuration.
//! The context sits behind a mutex, so callers on any thread see the same
//! cached tree until [`reload`] is called.

use crate::context::{Config, ConfigContext, ConfigSource};
use crate::error::Result;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

static CONTEXT: OnceLock<Mutex<ConfigContext>> = OnceLock::new();

fn lock() -> MutexGuard<'static, ConfigContext> {
    CONTEXT
        .get_or_init(|| Mutex::new(ConfigContext::new(ConfigSource::from_env())))
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

/// Install `context` as the process-wide context.
///
/// Returns `false` if a context was already in place; the existing one is
/// kept.
pub fn install(context: ConfigContext) -> bool {
    CONTEXT.set(Mutex::new(context)).is_ok()
}

/// Run `f` against the shared configuration, loading it on first use.
pub fn with_config<R>(f: impl FnOnce(&Config) -> R) -> Result<R> {
    let mut context = lock();
    Ok(f(context.get()?))
}

/// Run `f` against the shared configuration mutably.
pub fn with_config_mut<R>(f: impl FnOnce(&mut Config) -> R) -> Result<R> {
    let mut context = lock();
    Ok(f(context.get_mut()?))
}

/// Discard the shared configuration and load it again.
pub fn reload() -> Result<()> {
    lock().reload()?;
    Ok(())
}
