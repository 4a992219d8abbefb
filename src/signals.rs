//! Ctrl-C handling
//!
//! The handler only raises a flag. The dispatch loop polls it before
//! every step and unwinds with [`EngineError::Interrupted`], so a program
//! is never torn down halfway through a command.
//!
//! [`EngineError::Interrupted`]: crate::engine::EngineError::Interrupted

use std::sync::atomic::{AtomicBool, Ordering};

/// Flag indicating Ctrl-C was received (set by the handler)
pub static INTERRUPT_RECEIVED: AtomicBool = AtomicBool::new(false);

/// Install the Ctrl-C handler for the process
pub fn setup_interrupt_handler() -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(|| {
        eprintln!("Execution aborted by user....");
        INTERRUPT_RECEIVED.store(true, Ordering::SeqCst);
    })
}

/// Check whether Ctrl-C was received since the last reset
pub fn interrupted() -> bool {
    INTERRUPT_RECEIVED.load(Ordering::SeqCst)
}

/// Raise the flag by hand, as the handler would
pub fn request_interrupt() {
    INTERRUPT_RECEIVED.store(true, Ordering::SeqCst);
}

/// Clear the flag and report whether it was set
pub fn reset_interrupt() -> bool {
    INTERRUPT_RECEIVED.swap(false, Ordering::SeqCst)
}
