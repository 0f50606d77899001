//! Closure-to-C callback bridge
//!
//! The contract callback is a bare `void (*)(int)` with no user-data
//! pointer, so a Rust closure cannot be handed over directly. Instead the
//! closure is registered in a per-thread slot for the duration of exactly
//! one foreign call, and the native side is given [`dispatch`], a single
//! `extern "C"` trampoline that forwards every invocation to whatever
//! closure is registered.
//!
//! Guarantees for a registered handler:
//! - it is only invoked on the thread that registered it, synchronously,
//!   while the foreign call that it was registered for is running
//! - it is never invoked after [`with_handler`] returns
//! - it cannot be replaced while in flight: a nested registration on the
//!   same thread fails with [`BoundaryError::Reentrant`]
//! - it is never re-entered: a [`dispatch`] reaching it while it is still
//!   running is dropped
//! - a panic inside it is caught before it reaches the native frames; the
//!   remaining invocations of that call are skipped and the panic resumes
//!   once the foreign call has returned

use crate::error::{BoundaryError, Result};
use std::any::Any;
use std::cell::{Cell, RefCell};
use std::marker::PhantomData;
use std::mem;
use std::os::raw::c_int;
use std::panic::{self, AssertUnwindSafe};
use std::ptr::NonNull;

type ErasedHandler = NonNull<dyn FnMut(i32) + 'static>;

thread_local! {
    static ACTIVE: Cell<Option<ErasedHandler>> = const { Cell::new(None) };
    static PANIC: RefCell<Option<Box<dyn Any + Send>>> = const { RefCell::new(None) };
    static DISPATCHING: Cell<bool> = const { Cell::new(false) };
}

/// Trampoline given to the native side as the descriptor callback
pub extern "C" fn dispatch(value: c_int) {
    let Some(handler) = ACTIVE.try_with(Cell::get).ok().flatten() else {
        log::warn!("Callback with value {} arrived with no handler registered", value);
        return;
    };

    if PANIC.with(|slot| slot.borrow().is_some()) {
        log::trace!("Skipping callback with value {} after handler panic", value);
        return;
    }

    if DISPATCHING.with(|flag| flag.replace(true)) {
        log::warn!("Callback with value {} arrived while the handler is running", value);
        return;
    }

    // SAFETY: the pointer was registered by a live HandlerGuard on this
    // thread, which keeps the closure mutably borrowed until it is dropped.
    // DISPATCHING makes this the only live reborrow of it.
    let result = panic::catch_unwind(AssertUnwindSafe(|| unsafe {
        (*handler.as_ptr())(value)
    }));
    DISPATCHING.with(|flag| flag.set(false));

    if let Err(payload) = result {
        log::error!("Callback handler panicked; skipping remaining invocations");
        PANIC.with(|slot| *slot.borrow_mut() = Some(payload));
    }
}

/// Keeps a handler registered until dropped
struct HandlerGuard<'a> {
    _handler: PhantomData<&'a mut dyn FnMut(i32)>,
}

impl<'a> HandlerGuard<'a> {
    fn install(handler: &'a mut (dyn FnMut(i32) + 'a)) -> Result<Self> {
        if ACTIVE.with(Cell::get).is_some() {
            return Err(BoundaryError::Reentrant);
        }

        // SAFETY: only the lifetime is erased. The guard holds the mutable
        // borrow for 'a and clears the slot on drop, so the pointer is never
        // dereferenced after the closure goes away.
        let erased: ErasedHandler = unsafe {
            mem::transmute::<NonNull<dyn FnMut(i32) + 'a>, ErasedHandler>(NonNull::from(handler))
        };
        ACTIVE.with(|slot| slot.set(Some(erased)));
        // A payload left behind by a call that unwound on its own is stale
        PANIC.with(|slot| slot.borrow_mut().take());

        Ok(Self {
            _handler: PhantomData,
        })
    }
}

impl Drop for HandlerGuard<'_> {
    fn drop(&mut self) {
        ACTIVE.with(|slot| slot.set(None));
    }
}

/// Whether a handler is currently registered on this thread
#[cfg(test)]
fn handler_active() -> bool {
    ACTIVE.with(Cell::get).is_some()
}

/// Register `handler` for the duration of `call`
///
/// `call` is expected to perform one foreign call whose descriptor carries
/// [`dispatch`] as its callback.
pub fn with_handler<H, C, R>(mut handler: H, call: C) -> Result<R>
where
    H: FnMut(i32),
    C: FnOnce() -> R,
{
    let guard = HandlerGuard::install(&mut handler)?;
    let result = call();
    drop(guard);

    if let Some(payload) = PANIC.with(|slot| slot.borrow_mut().take()) {
        panic::resume_unwind(payload);
    }

    Ok(result)
}
