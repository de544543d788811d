use crate::aspect::Aspect;
use crate::context::MethodHandle;
use std::fmt;
use std::sync::OnceLock;

/// Memoized reflective handle for one call site
///
/// Emitted as a `static` next to the interceptor so the handle is built on
/// first use and shared by every later invocation.
pub struct MethodSlot {
    cell: OnceLock<MethodHandle>,
}

impl MethodSlot {
    pub const fn new() -> Self {
        Self {
            cell: OnceLock::new(),
        }
    }

    pub fn get_or_init(&self, init: impl FnOnce() -> MethodHandle) -> &MethodHandle {
        self.cell.get_or_init(init)
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl Default for MethodSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MethodSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MethodSlot").field(&self.cell.get()).finish()
    }
}

/// Memoized rehydrated configuration for one aspect at one call site.
pub struct AttributeSlot<A: Aspect> {
    cell: OnceLock<A>,
}

impl<A: Aspect> AttributeSlot<A> {
    pub const fn new() -> Self {
        Self {
            cell: OnceLock::new(),
        }
    }

    pub fn get_or_init(&self, init: impl FnOnce() -> A) -> &A {
        self.cell.get_or_init(init)
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl<A: Aspect> Default for AttributeSlot<A> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(crate::DeriveAspect, Debug, Default)]
    struct Tagged {
        label: String,
    }

    static METHOD: MethodSlot = MethodSlot::new();
    static ATTRIBUTE: AttributeSlot<Tagged> = AttributeSlot::new();

    #[test]
    fn test_method_slot_initializes_once() {
        let built = AtomicUsize::new(0);
        for _ in 0..3 {
            let handle = METHOD.get_or_init(|| {
                built.fetch_add(1, Ordering::SeqCst);
                MethodHandle::new("app::Orders", "place", &[], false)
            });
            assert_eq!(handle.name(), "place");
        }
        assert_eq!(built.load(Ordering::SeqCst), 1);
        assert!(METHOD.is_initialized());
    }

    #[test]
    fn test_attribute_slot_returns_the_same_instance() {
        let first = ATTRIBUTE.get_or_init(|| Tagged {
            label: "first".into(),
        });
        let second = ATTRIBUTE.get_or_init(|| Tagged {
            label: "second".into(),
        });
        assert!(std::ptr::eq(first, second));
        assert_eq!(second.label, "first");
    }
}
