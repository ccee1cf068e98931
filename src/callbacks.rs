//! Flush and exit callbacks
//!
//! Engines at 4.038 and later keep ordered lists of `(callback, user data)`
//! pairs for flush and for exit. Older engines hold a single flush callback
//! without user data. Only the shape selected at build time is compiled.

#[cfg(verilated_callbacks = "list")]
pub use self::list::{Callback, CallbackList, VoidPCb};

#[cfg(verilated_callbacks = "slot")]
pub use self::slot::{FlushSlot, VoidCb};

#[cfg(verilated_callbacks = "list")]
mod list {
    use std::ffi::c_void;

    /// Callback taking the user data registered with it
    pub type VoidPCb = unsafe extern "C" fn(*mut c_void);

    /// A registered `(callback, user data)` pair
    ///
    /// Equality is identity of both the function pointer and the data pointer.
    #[derive(Debug, Clone, Copy)]
    pub struct Callback {
        func: VoidPCb,
        data: *mut c_void,
    }

    // User data is opaque to the runtime and only handed back to `func`.
    unsafe impl Send for Callback {}

    impl Callback {
        pub fn new(func: VoidPCb, data: *mut c_void) -> Self {
            Self { func, data }
        }

        /// # Safety
        /// `func` must be safe to call with `data` at this point.
        pub unsafe fn invoke(&self) {
            (self.func)(self.data)
        }
    }

    impl PartialEq for Callback {
        fn eq(&self, other: &Self) -> bool {
            self.func as usize == other.func as usize && self.data == other.data
        }
    }

    impl Eq for Callback {}

    /// Ordered callback list; a pair appears at most once
    #[derive(Debug, Default, Clone)]
    pub struct CallbackList {
        entries: Vec<Callback>,
    }

    impl CallbackList {
        pub fn new() -> Self {
            Self::default()
        }

        /// Register a pair; re-adding an existing pair moves it to the end
        pub fn add(&mut self, cb: Callback) {
            self.remove(cb);
            self.entries.push(cb);
        }

        /// Remove the exact pair; returns whether it was registered
        pub fn remove(&mut self, cb: Callback) -> bool {
            let before = self.entries.len();
            self.entries.retain(|e| *e != cb);
            self.entries.len() != before
        }

        pub fn len(&self) -> usize {
            self.entries.len()
        }

        pub fn is_empty(&self) -> bool {
            self.entries.is_empty()
        }

        /// Copy of the entries in registration order
        pub fn snapshot(&self) -> Vec<Callback> {
            self.entries.clone()
        }
    }
}

#[cfg(verilated_callbacks = "slot")]
mod slot {
    use crate::error::{Result, VerilatedError};

    /// Flush callback without user data
    pub type VoidCb = unsafe extern "C" fn();

    /// Single flush callback slot
    #[derive(Debug, Default, Clone, Copy)]
    pub struct FlushSlot {
        cb: Option<VoidCb>,
    }

    impl FlushSlot {
        pub fn new() -> Self {
            Self::default()
        }

        /// Set the callback; setting the same one again is a no-op
        pub fn set(&mut self, cb: VoidCb) -> Result<()> {
            match self.cb {
                None => {
                    self.cb = Some(cb);
                    Ok(())
                }
                Some(existing) if existing as usize == cb as usize => Ok(()),
                Some(_) => Err(VerilatedError::FlushCallbackConflict),
            }
        }

        pub fn get(&self) -> Option<VoidCb> {
            self.cb
        }
    }
}
