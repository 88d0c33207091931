//! Per-target session setup
//!
//! Some targets need their launch prepared: extra environment, a scratch
//! directory, a lock. A [`SessionSetup`] is entered right before the session
//! process starts and exited once the launch attempt is over, whether or not
//! it succeeded. Targets without a registered setup get [`NoopSetup`].

use crate::error::Result;
use crate::session::Launch;
use indexmap::IndexMap;

/// Scoped preparation around a session launch
pub trait SessionSetup: Send + Sync {
    /// Identifier for logs
    fn name(&self) -> &'static str;

    /// Adjust the launch before the process is spawned
    ///
    /// # Errors
    /// Returns `KernelError::Setup` if the session cannot be prepared
    fn enter(&self, launch: &mut Launch) -> Result<()>;

    /// Undo whatever `enter` arranged outside the launch itself
    fn exit(&self, _launch: &Launch) {}
}

/// Setup that does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSetup;

impl SessionSetup for NoopSetup {
    fn name(&self) -> &'static str {
        "noop"
    }

    fn enter(&self, _launch: &mut Launch) -> Result<()> {
        Ok(())
    }
}

/// Setup for python sessions
///
/// Disables the debugger's frozen-module validation warning, which
/// otherwise lands on stderr at every start.
#[derive(Debug, Clone, Copy, Default)]
pub struct PythonSetup;

impl PythonSetup {
    /// Variable set for the session
    pub const FILE_VALIDATION_VAR: &'static str = "PYDEVD_DISABLE_FILE_VALIDATION";
}

impl SessionSetup for PythonSetup {
    fn name(&self) -> &'static str {
        "python3"
    }

    fn enter(&self, launch: &mut Launch) -> Result<()> {
        launch
            .env
            .insert(Self::FILE_VALIDATION_VAR.to_string(), "1".to_string());
        Ok(())
    }
}

static NOOP: NoopSetup = NoopSetup;

/// Mapping from target identifier to its setup
pub struct SetupRegistry {
    setups: IndexMap<String, Box<dyn SessionSetup>>,
}

impl Default for SetupRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl std::fmt::Debug for SetupRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SetupRegistry")
            .field("targets", &self.names())
            .finish()
    }
}

impl SetupRegistry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            setups: IndexMap::new(),
        }
    }

    /// Registry with the built-in python setup under `python3` and `py`
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("python3", PythonSetup);
        registry.register("py", PythonSetup);
        registry
    }

    /// Register setup for `target`, replacing any previous one
    pub fn register<S: SessionSetup + 'static>(&mut self, target: impl Into<String>, setup: S) {
        self.setups.insert(target.into(), Box::new(setup));
    }

    /// Setup for `target`, the no-op setup when none is registered
    #[must_use]
    pub fn get(&self, target: &str) -> &dyn SessionSetup {
        match self.setups.get(target) {
            Some(setup) => setup.as_ref(),
            None => &NOOP,
        }
    }

    /// Targets with a registered setup
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.setups.keys().map(String::as_str).collect()
    }

    /// Enter the setup for `launch.target`
    ///
    /// The returned guard exits the setup when dropped.
    ///
    /// # Errors
    /// Propagates the setup's `enter` failure; `exit` is not called then.
    pub fn enter<'a>(&'a self, launch: &mut Launch) -> Result<SetupScope<'a>> {
        let setup = self.get(&launch.target);
        tracing::trace!(setup = setup.name(), target = %launch.target, "entering setup");
        setup.enter(launch)?;
        Ok(SetupScope {
            setup,
            launch: launch.clone(),
        })
    }
}

/// Entered setup; exits on drop
pub struct SetupScope<'a> {
    setup: &'a dyn SessionSetup,
    launch: Launch,
}

impl std::fmt::Debug for SetupScope<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SetupScope")
            .field("setup", &self.setup.name())
            .field("target", &self.launch.target)
            .finish()
    }
}

impl Drop for SetupScope<'_> {
    fn drop(&mut self) {
        tracing::trace!(setup = self.setup.name(), target = %self.launch.target, "exiting setup");
        self.setup.exit(&self.launch);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TargetConfig;
    use crate::error::KernelError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct Counting {
        entered: Arc<AtomicUsize>,
        exited: Arc<AtomicUsize>,
        refuse: bool,
    }

    impl SessionSetup for Counting {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn enter(&self, launch: &mut Launch) -> Result<()> {
            self.entered.fetch_add(1, Ordering::SeqCst);
            if self.refuse {
                return Err(KernelError::Setup {
                    target: launch.target.clone(),
                    message: "refused".into(),
                });
            }
            Ok(())
        }

        fn exit(&self, _launch: &Launch) {
            self.exited.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn launch(target: &str) -> Launch {
        Launch::new(target, &TargetConfig::new(["true"])).unwrap()
    }

    #[test]
    fn unregistered_target_gets_noop() {
        let registry = SetupRegistry::new();
        assert_eq!(registry.get("ruby").name(), "noop");

        let mut launch = launch("ruby");
        let before = launch.clone();
        drop(registry.enter(&mut launch).unwrap());
        assert_eq!(launch, before);
    }

    #[test]
    fn python_setup_sets_variable() {
        let registry = SetupRegistry::with_defaults();
        for target in ["python3", "py"] {
            let mut launch = launch(target);
            let _scope = registry.enter(&mut launch).unwrap();
            assert_eq!(
                launch.env.get(PythonSetup::FILE_VALIDATION_VAR).map(String::as_str),
                Some("1")
            );
        }
    }

    #[test]
    fn scope_exits_on_drop() {
        let entered = Arc::new(AtomicUsize::new(0));
        let exited = Arc::new(AtomicUsize::new(0));
        let mut registry = SetupRegistry::new();
        registry.register(
            "x",
            Counting {
                entered: entered.clone(),
                exited: exited.clone(),
                refuse: false,
            },
        );

        let mut launch = launch("x");
        let scope = registry.enter(&mut launch).unwrap();
        assert_eq!(entered.load(Ordering::SeqCst), 1);
        assert_eq!(exited.load(Ordering::SeqCst), 0);
        drop(scope);
        assert_eq!(exited.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failed_enter_does_not_exit() {
        let exited = Arc::new(AtomicUsize::new(0));
        let mut registry = SetupRegistry::new();
        registry.register(
            "x",
            Counting {
                exited: exited.clone(),
                refuse: true,
                ..Counting::default()
            },
        );

        let mut launch = launch("x");
        assert!(matches!(
            registry.enter(&mut launch),
            Err(KernelError::Setup { .. })
        ));
        assert_eq!(exited.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn debug_lists_targets() {
        let rendered = format!("{:?}", SetupRegistry::with_defaults());
        assert!(rendered.contains("python3"));
        assert!(rendered.contains("py"));
    }
}
