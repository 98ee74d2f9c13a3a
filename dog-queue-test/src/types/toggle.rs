use std::sync::atomic::{AtomicBool, Ordering};

/// Process-wide interception switches.
///
/// `inline` makes enqueues run the job instead of storing a record;
/// `disable_ext` makes the adapter call through to the real backend.
#[derive(Debug, Default)]
pub struct InterceptionToggle {
    inline: AtomicBool,
    disable_ext: AtomicBool,
}

/// Which switch a scope guard restores
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flag {
    Inline,
    DisableExt,
}

impl InterceptionToggle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inline(&self) -> bool {
        self.inline.load(Ordering::SeqCst)
    }

    pub fn set_inline(&self, value: bool) {
        self.inline.store(value, Ordering::SeqCst);
    }

    pub fn extension_disabled(&self) -> bool {
        self.disable_ext.load(Ordering::SeqCst)
    }

    pub fn set_extension_disabled(&self, value: bool) {
        self.disable_ext.store(value, Ordering::SeqCst);
    }

    /// Back to `{ inline: false, disable_ext: false }`
    pub fn reset(&self) {
        self.set_inline(false);
        self.set_extension_disabled(false);
    }

    /// Set `inline` until the returned guard is dropped
    pub fn inline_scope(&self, value: bool) -> ToggleScope<'_> {
        ToggleScope::enter(self, Flag::Inline, value)
    }

    /// Set `disable_ext` until the returned guard is dropped
    pub fn extension_scope(&self, value: bool) -> ToggleScope<'_> {
        ToggleScope::enter(self, Flag::DisableExt, value)
    }

    /// Run `f` with `inline` on, restoring the previous value afterwards
    pub fn with_inline<T>(&self, f: impl FnOnce() -> T) -> T {
        let _scope = self.inline_scope(true);
        f()
    }

    /// Run `f` with the extension disabled, restoring the previous value afterwards
    pub fn with_extension_disabled<T>(&self, f: impl FnOnce() -> T) -> T {
        let _scope = self.extension_scope(true);
        f()
    }

    fn swap(&self, flag: Flag, value: bool) -> bool {
        match flag {
            Flag::Inline => self.inline.swap(value, Ordering::SeqCst),
            Flag::DisableExt => self.disable_ext.swap(value, Ordering::SeqCst),
        }
    }
}

/// Restores a toggle flag when dropped, including during unwinding
#[must_use = "the previous value is restored as soon as the scope is dropped"]
#[derive(Debug)]
pub struct ToggleScope<'a> {
    toggle: &'a InterceptionToggle,
    flag: Flag,
    previous: bool,
}

impl<'a> ToggleScope<'a> {
    fn enter(toggle: &'a InterceptionToggle, flag: Flag, value: bool) -> Self {
        let previous = toggle.swap(flag, value);
        Self {
            toggle,
            flag,
            previous,
        }
    }

    /// Value the flag had before this scope
    pub fn previous(&self) -> bool {
        self.previous
    }
}

impl Drop for ToggleScope<'_> {
    fn drop(&mut self) {
        self.toggle.swap(self.flag, self.previous);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{self, AssertUnwindSafe};

    #[test]
    fn test_defaults_are_off() {
        let toggle = InterceptionToggle::new();
        assert!(!toggle.inline());
        assert!(!toggle.extension_disabled());
    }

    #[test]
    fn test_with_inline_restores_previous_value() {
        let toggle = InterceptionToggle::new();
        let seen = toggle.with_inline(|| toggle.inline());
        assert!(seen);
        assert!(!toggle.inline());

        toggle.set_inline(true);
        toggle.with_inline(|| ());
        assert!(toggle.inline());
    }

    #[test]
    fn test_scopes_nest() {
        let toggle = InterceptionToggle::new();
        {
            let outer = toggle.inline_scope(true);
            assert!(!outer.previous());
            {
                let inner = toggle.inline_scope(false);
                assert!(inner.previous());
                assert!(!toggle.inline());
            }
            assert!(toggle.inline());
        }
        assert!(!toggle.inline());
    }

    #[test]
    fn test_restores_after_panic() {
        let toggle = InterceptionToggle::new();
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            toggle.with_extension_disabled(|| panic!("job blew up"))
        }));
        assert!(result.is_err());
        assert!(!toggle.extension_disabled());
    }

    #[test]
    fn test_reset_turns_everything_off() {
        let toggle = InterceptionToggle::new();
        toggle.set_inline(true);
        toggle.set_extension_disabled(true);
        toggle.reset();
        assert!(!toggle.inline());
        assert!(!toggle.extension_disabled());
    }
}
