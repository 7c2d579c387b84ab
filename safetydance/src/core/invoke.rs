//! Safe invocation of fallible closures.
//!
//! A closure returning `Result<T, E>` is run; on `Ok` its value is handed back,
//! on `Err` a caller-supplied fallback is returned instead and the error is kept
//! in a last-error slot for later inspection.
//!
//! Two slot scopes are available:
//!
//! - [`SafeInvoker`] owns its slot; useful when the caller wants explicit scoping.
//! - The free functions ([`call`], [`call_or`], [`last_error`], ...) share one
//!   slot per thread. Read it right after the call that may have set it: the
//!   next invocation on the same thread clears it.
//!
//! [`capture`] is the stateless form and returns the error alongside the value.

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Error;
use tracing::debug;

thread_local! {
    static LAST_ERROR: RefCell<Option<Rc<Error>>> = const { RefCell::new(None) };
}

/// Run `f` and return its value, or `fallback` paired with the error it produced.
pub fn capture<T, E, F>(f: F, fallback: T) -> (T, Option<Error>)
where
    F: FnOnce() -> Result<T, E>,
    E: Into<Error>,
{
    match f() {
        Ok(value) => (value, None),
        Err(err) => {
            let err = err.into();
            debug!(err = %err, "captured error, returning fallback");
            (fallback, Some(err))
        }
    }
}

/// An invoker with its own last-error slot.
#[derive(Debug, Default)]
pub struct SafeInvoker {
    last_error: Option<Error>,
}

impl SafeInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f`, returning `fallback` if it fails.
    ///
    /// The slot is cleared before `f` runs and holds the error afterwards iff
    /// `f` returned `Err`.
    pub fn call_or<T, E, F>(&mut self, f: F, fallback: T) -> T
    where
        F: FnOnce() -> Result<T, E>,
        E: Into<Error>,
    {
        self.last_error = None;
        let (value, err) = capture(f, fallback);
        self.last_error = err;
        value
    }

    /// Run `f`, returning `None` if it fails.
    pub fn call<T, E, F>(&mut self, f: F) -> Option<T>
    where
        F: FnOnce() -> Result<T, E>,
        E: Into<Error>,
    {
        self.call_or(|| f().map(Some), None)
    }

    /// Error captured by the most recent invocation, if it failed.
    pub fn error(&self) -> Option<&Error> {
        self.last_error.as_ref()
    }

    pub fn has_error(&self) -> bool {
        self.last_error.is_some()
    }

    pub fn take_error(&mut self) -> Option<Error> {
        self.last_error.take()
    }

    pub fn clear(&mut self) {
        self.last_error = None;
    }
}

/// Run `f` on this thread's shared slot, returning `fallback` if it fails.
///
/// Closures may themselves call into the safe wrappers; the outermost
/// invocation's outcome is what remains in the slot.
pub fn call_or<T, E, F>(f: F, fallback: T) -> T
where
    F: FnOnce() -> Result<T, E>,
    E: Into<Error>,
{
    LAST_ERROR.with_borrow_mut(|slot| *slot = None);
    let (value, err) = capture(f, fallback);
    LAST_ERROR.with_borrow_mut(|slot| *slot = err.map(Rc::new));
    value
}

/// Run `f` on this thread's shared slot, returning `None` if it fails.
pub fn call<T, E, F>(f: F) -> Option<T>
where
    F: FnOnce() -> Result<T, E>,
    E: Into<Error>,
{
    call_or(|| f().map(Some), None)
}

/// Error captured by the most recent invocation on this thread.
pub fn last_error() -> Option<Rc<Error>> {
    LAST_ERROR.with_borrow(|slot| slot.clone())
}

/// The last error rendered with its context chain (`{:#}`).
pub fn last_error_message() -> Option<String> {
    LAST_ERROR.with_borrow(|slot| slot.as_ref().map(|err| format!("{err:#}")))
}

pub fn has_error() -> bool {
    LAST_ERROR.with_borrow(Option::is_some)
}

/// Remove and return the last error, leaving the slot empty.
pub fn take_last_error() -> Option<Rc<Error>> {
    LAST_ERROR.with_borrow_mut(Option::take)
}

pub fn clear_last_error() {
    LAST_ERROR.with_borrow_mut(|slot| *slot = None);
}
