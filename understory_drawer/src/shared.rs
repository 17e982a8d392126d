// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Owning and non-owning references to a drawer controller.
//!
//! The presenting side owns the controller through [`SharedDrawer`]; the
//! controller in turn owns the presented content. Gesture recognizers and
//! animation callbacks living on the host hold a [`DrawerHandle`], which does not
//! keep the drawer alive. Once the owner drops the drawer, every handle quietly
//! stops delivering input.
//!
//! ```rust
//! use understory_drawer::{DrawerConfig, DrawerController, DrawerInput, DrawerLayout, SharedDrawer};
//!
//! let drawer = SharedDrawer::new(DrawerController::new(
//!     DrawerConfig::default(),
//!     DrawerLayout::new(800.0, 320.0),
//!     "content",
//! ));
//! let handle = drawer.handle();
//!
//! let effects = handle.dispatch(DrawerInput::Present).unwrap();
//! assert!(effects.started().is_some());
//!
//! drop(drawer);
//! assert!(!handle.is_alive());
//! assert!(handle.dispatch(DrawerInput::Dismiss).is_none());
//! ```

use alloc::rc::{Rc, Weak};
use core::cell::RefCell;

use crate::{DrawerController, DrawerInput, Effects};

/// Owning reference to a drawer controller.
#[derive(Debug)]
pub struct SharedDrawer<C> {
    inner: Rc<RefCell<DrawerController<C>>>,
}

impl<C> SharedDrawer<C> {
    /// Takes ownership of `controller`.
    #[must_use]
    pub fn new(controller: DrawerController<C>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(controller)),
        }
    }

    /// Creates a non-owning handle for the host.
    #[must_use]
    pub fn handle(&self) -> DrawerHandle<C> {
        DrawerHandle {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Handles one input.
    ///
    /// # Panics
    ///
    /// Panics if called from inside [`with`](Self::with) or [`with_mut`](Self::with_mut).
    pub fn dispatch(&self, input: DrawerInput) -> Effects<C> {
        self.inner.borrow_mut().handle(input)
    }

    /// Runs `f` with shared access to the controller.
    ///
    /// # Panics
    ///
    /// Panics if called from inside [`with_mut`](Self::with_mut).
    pub fn with<R>(&self, f: impl FnOnce(&DrawerController<C>) -> R) -> R {
        f(&self.inner.borrow())
    }

    /// Runs `f` with exclusive access to the controller.
    ///
    /// # Panics
    ///
    /// Panics if called from inside [`with`](Self::with) or [`with_mut`](Self::with_mut).
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut DrawerController<C>) -> R) -> R {
        f(&mut self.inner.borrow_mut())
    }

    /// Returns the controller, invalidating every handle.
    ///
    /// Returns `None` if a handle is using the controller at this moment.
    pub fn into_inner(self) -> Option<DrawerController<C>> {
        Rc::try_unwrap(self.inner).ok().map(RefCell::into_inner)
    }
}

/// Non-owning reference to a drawer controller.
///
/// Every method returns `None` once the owning [`SharedDrawer`] is gone, or
/// while the controller is already borrowed further up the stack.
#[derive(Debug)]
pub struct DrawerHandle<C> {
    inner: Weak<RefCell<DrawerController<C>>>,
}

impl<C> Clone for DrawerHandle<C> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<C> DrawerHandle<C> {
    /// Returns `true` while the owning [`SharedDrawer`] exists.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }

    /// Handles one input if the drawer is still alive.
    pub fn dispatch(&self, input: DrawerInput) -> Option<Effects<C>> {
        let inner = self.inner.upgrade()?;
        let mut controller = inner.try_borrow_mut().ok()?;
        Some(controller.handle(input))
    }

    /// Runs `f` with shared access to the controller if the drawer is still alive.
    pub fn with<R>(&self, f: impl FnOnce(&DrawerController<C>) -> R) -> Option<R> {
        let inner = self.inner.upgrade()?;
        let controller = inner.try_borrow().ok()?;
        Some(f(&controller))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DrawerConfig, DrawerLayout, DrawerState};

    fn shared() -> SharedDrawer<u32> {
        SharedDrawer::new(DrawerController::new(
            DrawerConfig::default(),
            DrawerLayout::new(800.0, 320.0),
            7,
        ))
    }

    #[test]
    fn handle_reaches_the_owned_controller() {
        let drawer = shared();
        let handle = drawer.handle();
        let effects = handle.dispatch(DrawerInput::Expand).unwrap();
        let id = effects.started().unwrap().id;
        drawer.dispatch(DrawerInput::AnimationFinished { id });
        assert_eq!(handle.with(|c| c.state()), Some(DrawerState::FullyExpanded));
        assert_eq!(drawer.with(|c| c.content().copied()), Some(7));
    }

    #[test]
    fn handle_does_not_keep_the_drawer_alive() {
        let drawer = shared();
        let handle = drawer.handle();
        let copy = handle.clone();
        assert!(copy.is_alive());
        drop(drawer);
        assert!(!handle.is_alive());
        assert!(copy.with(|c| c.state()).is_none());
    }

    #[test]
    fn reentrant_dispatch_through_a_handle_is_refused() {
        let drawer = shared();
        let handle = drawer.handle();
        let nested = drawer.with_mut(|_| handle.dispatch(DrawerInput::Present));
        assert!(nested.is_none());
        assert!(handle.dispatch(DrawerInput::Present).is_some());
    }

    #[test]
    fn into_inner_returns_the_controller() {
        let drawer = shared();
        let handle = drawer.handle();
        let controller = drawer.into_inner().unwrap();
        assert_eq!(controller.content(), Some(&7));
        assert!(!handle.is_alive());
    }
}
