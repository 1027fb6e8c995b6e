//! Stack traces taken while a panic is still in flight.
//!
//! `catch_unwind` only returns once the panicking frames are gone, so a
//! backtrace captured by the catcher shows the catcher. While [`catch`] is
//! running on a thread, a panic hook chained in front of the previous one
//! captures the backtrace from inside the panicking call and parks it in a
//! thread-local for the catcher to pick up.

use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::{Cell, RefCell};
use std::panic::{self, UnwindSafe};
use std::sync::Once;
use std::thread;

static HOOK: Once = Once::new();

thread_local! {
    static DEPTH: Cell<usize> = const { Cell::new(0) };
    static CAPTURED: RefCell<Option<Backtrace>> = const { RefCell::new(None) };
}

fn install_hook() {
    // The hook cannot be replaced from a thread that is already unwinding
    if thread::panicking() {
        return;
    }
    HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if DEPTH.with(Cell::get) > 0 {
                let stack = Backtrace::force_capture();
                CAPTURED.with(|slot| *slot.borrow_mut() = Some(stack));
            }
            previous(info);
        }));
    });
}

/// Runs `f`, returning the payload and the stack of the panicking call if it
/// panics.
///
/// Falls back to a backtrace of the caller when the hook did not run, e.g.
/// because the application installed its own hook afterwards.
pub(crate) fn catch<F, R>(f: F) -> Result<R, (Box<dyn Any + Send>, Backtrace)>
where
    F: FnOnce() -> R + UnwindSafe,
{
    install_hook();
    CAPTURED.with(|slot| slot.borrow_mut().take());
    DEPTH.with(|depth| depth.set(depth.get() + 1));
    let result = panic::catch_unwind(f);
    DEPTH.with(|depth| depth.set(depth.get() - 1));

    result.map_err(|payload| {
        let stack = CAPTURED
            .with(|slot| slot.borrow_mut().take())
            .unwrap_or_else(Backtrace::force_capture);
        (payload, stack)
    })
}
