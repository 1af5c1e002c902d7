// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Ambient call-context carrier
//!
//! A `Context` is an immutable chain of typed bindings. Deriving a child
//! context never mutates the parent, so a context handed to a callee can be
//! extended freely without the caller observing the change. Lookup walks from
//! the child toward the root and returns the nearest binding.
//!
//! Values are keyed by their type. One value of a given type is visible at a
//! time; binding the same type again shadows the outer binding for the
//! derived chain only. The transaction coordinator uses a private handle type
//! as its reserved slot, so user bindings cannot collide with it.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// Immutable chain of typed bindings attached to a call chain.
///
/// Cloning a `Context` is cheap: clones share the underlying chain.
#[derive(Clone, Default)]
pub struct Context {
    head: Option<Arc<Binding>>,
}

struct Binding {
    parent: Option<Arc<Binding>>,
    key: TypeId,
    value: Arc<dyn Any + Send + Sync>,
}

impl Context {
    /// Create an empty root context.
    pub fn new() -> Self {
        Self { head: None }
    }

    /// Derive a child context with `value` bound under its type.
    pub fn with_value<T: Send + Sync + 'static>(&self, value: T) -> Context {
        self.with_shared(Arc::new(value))
    }

    /// Derive a child context binding an already-shared value.
    ///
    /// The caller keeps its own `Arc`, which is how the coordinator retains
    /// the transaction handle for finalization while repositories reach the
    /// same handle through the context.
    pub fn with_shared<T: Send + Sync + 'static>(&self, value: Arc<T>) -> Context {
        Context {
            head: Some(Arc::new(Binding {
                parent: self.head.clone(),
                key: TypeId::of::<T>(),
                value,
            })),
        }
    }

    /// Look up the nearest binding of type `T`, walking toward the root.
    pub fn value<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        let mut current = self.head.as_deref();
        while let Some(binding) = current {
            if binding.key == TypeId::of::<T>() {
                return Arc::clone(&binding.value).downcast::<T>().ok();
            }
            current = binding.parent.as_deref();
        }
        None
    }

    /// Whether a binding of type `T` is reachable from this context.
    pub fn contains<T: Send + Sync + 'static>(&self) -> bool {
        let mut current = self.head.as_deref();
        while let Some(binding) = current {
            if binding.key == TypeId::of::<T>() {
                return true;
            }
            current = binding.parent.as_deref();
        }
        false
    }

    fn len(&self) -> usize {
        let mut count = 0;
        let mut current = self.head.as_deref();
        while let Some(binding) = current {
            count += 1;
            current = binding.parent.as_deref();
        }
        count
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("bindings", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct RequestId(u64);

    #[derive(Debug, PartialEq)]
    struct Tenant(&'static str);

    #[test]
    fn test_empty_context_has_no_bindings() {
        let ctx = Context::new();
        assert!(ctx.value::<RequestId>().is_none());
        assert!(!ctx.contains::<RequestId>());
    }

    #[test]
    fn test_lookup_returns_bound_value() {
        let ctx = Context::new().with_value(RequestId(7));
        assert_eq!(*ctx.value::<RequestId>().unwrap(), RequestId(7));
        assert!(ctx.contains::<RequestId>());
    }

    #[test]
    fn test_distinct_types_coexist() {
        let ctx = Context::new()
            .with_value(RequestId(1))
            .with_value(Tenant("acme"));
        assert_eq!(*ctx.value::<RequestId>().unwrap(), RequestId(1));
        assert_eq!(*ctx.value::<Tenant>().unwrap(), Tenant("acme"));
    }

    #[test]
    fn test_child_binding_shadows_outer() {
        let outer = Context::new().with_value(RequestId(1));
        let inner = outer.with_value(RequestId(2));
        assert_eq!(*inner.value::<RequestId>().unwrap(), RequestId(2));
        // the outer chain still sees its own binding
        assert_eq!(*outer.value::<RequestId>().unwrap(), RequestId(1));
    }

    #[test]
    fn test_parent_unaffected_by_child_binding() {
        let parent = Context::new();
        let _child = parent.with_value(RequestId(42));
        assert!(parent.value::<RequestId>().is_none());
    }

    #[test]
    fn test_sibling_chains_are_independent() {
        let root = Context::new().with_value(Tenant("acme"));
        let left = root.with_value(RequestId(1));
        let right = root.with_value(RequestId(2));
        assert_eq!(*left.value::<RequestId>().unwrap(), RequestId(1));
        assert_eq!(*right.value::<RequestId>().unwrap(), RequestId(2));
        assert_eq!(*left.value::<Tenant>().unwrap(), Tenant("acme"));
    }

    #[test]
    fn test_shared_binding_returns_same_allocation() {
        let value = Arc::new(RequestId(9));
        let ctx = Context::new().with_shared(Arc::clone(&value));
        let found = ctx.value::<RequestId>().unwrap();
        assert!(Arc::ptr_eq(&value, &found));
    }
}
