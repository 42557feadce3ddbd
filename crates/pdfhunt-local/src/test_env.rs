//! Process-global state helpers shared by tests that touch env vars or the working directory.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

// Env vars and cwd are process-global; serialize tests that mutate them.
static ENV_LOCK: Mutex<()> = Mutex::new(());

pub(crate) fn lock() -> MutexGuard<'static, ()> {
    ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner())
}

pub(crate) struct EnvGuard {
    k: &'static str,
    prev: Option<String>,
}

impl EnvGuard {
    pub(crate) fn set(k: &'static str, v: &str) -> Self {
        let prev = std::env::var(k).ok();
        std::env::set_var(k, v);
        Self { k, prev }
    }

    pub(crate) fn unset(k: &'static str) -> Self {
        let prev = std::env::var(k).ok();
        std::env::remove_var(k);
        Self { k, prev }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        if let Some(v) = self.prev.take() {
            std::env::set_var(self.k, v);
        } else {
            std::env::remove_var(self.k);
        }
    }
}

pub(crate) struct CwdGuard {
    prev: PathBuf,
}

impl CwdGuard {
    pub(crate) fn enter(dir: &Path) -> Self {
        let prev = std::env::current_dir().unwrap();
        std::env::set_current_dir(dir).unwrap();
        Self { prev }
    }
}

impl Drop for CwdGuard {
    fn drop(&mut self) {
        let _ = std::env::set_current_dir(&self.prev);
    }
}
