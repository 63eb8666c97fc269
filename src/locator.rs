//! Scopes: binding registration, parent delegation, eager flush
//!
//! A [Locator] owns one registry of bindings and optionally chains to a
//! parent scope. Lookups walk the chain from the requesting scope upward, so
//! a child can shadow any ancestor binding without affecting the ancestor's
//! own resolutions. Children never contribute bindings back upward.

use std::cell::RefCell;
use std::rc::Rc;

use crate::binding::{Binder, BindingCell, EagerBind};
use crate::context::Context;
use crate::error::LocatorError;
use crate::module::Module;
use crate::registry::Registry;

/// One scope in the service-location hierarchy
pub struct Locator {
    registry: RefCell<Registry>,
    eager: RefCell<Vec<Rc<dyn EagerBind>>>,
    parent: Option<Rc<Locator>>,
}

impl Locator {
    /// Create a root scope.
    pub fn create() -> Rc<Self> {
        Rc::new(Self {
            registry: RefCell::new(Registry::new()),
            eager: RefCell::new(Vec::new()),
            parent: None,
        })
    }

    /// Create a child scope delegating to this one.
    ///
    /// The child starts with an empty registry: bindings registered in it
    /// shadow same-(capability, name) bindings of any ancestor for
    /// resolutions performed through the child.
    pub fn enter(self: &Rc<Self>) -> Rc<Self> {
        Rc::new(Self {
            registry: RefCell::new(Registry::new()),
            eager: RefCell::new(Vec::new()),
            parent: Some(Rc::clone(self)),
        })
    }

    /// Register the unnamed binding of a capability.
    pub fn bind<S: ?Sized + 'static>(self: &Rc<Self>) -> Result<Binder<S>, LocatorError> {
        self.bind_named("")
    }

    /// Register a named binding of a capability.
    ///
    /// Fails with [LocatorError::DuplicateBinding] if this scope already has
    /// the pair; ancestor bindings are shadowed, not checked.
    pub fn bind_named<S: ?Sized + 'static>(
        self: &Rc<Self>,
        name: &str,
    ) -> Result<Binder<S>, LocatorError> {
        let cell = self.registry.borrow_mut().register::<S>(name)?;
        log::debug!("bound <{}> named {:?}", std::any::type_name::<S>(), name);
        Ok(Binder::new(cell, Rc::clone(self)))
    }

    /// Run a module's setup against this scope.
    pub fn install(self: &Rc<Self>, module: &dyn Module) -> Result<(), LocatorError> {
        module.load(self)
    }

    /// Obtain a root resolution context for this scope.
    ///
    /// Pending eager bindings are flushed first, so every eager singleton is
    /// materialized by the time any caller holds a context, but not during
    /// the binding phase itself.
    pub fn context(self: &Rc<Self>) -> Result<Rc<Context>, LocatorError> {
        self.flush_eager()?;
        Ok(Context::new_root(Rc::clone(self)))
    }

    fn flush_eager(self: &Rc<Self>) -> Result<(), LocatorError> {
        if self.eager.borrow().is_empty() {
            return Ok(());
        }
        log::debug!("flushing {} eager binding(s)", self.eager.borrow().len());
        let pending: Vec<Rc<dyn EagerBind>> = self.eager.borrow().clone();
        let root = Context::new_root(Rc::clone(self));
        for entry in &pending {
            entry.eager_bind(&root)?;
        }
        root.drain_deferred()?;
        // Cleared only after a fully successful flush: a failure leaves the
        // queue intact so the next context() call retries, with already
        // materialized singletons served from their cache.
        self.eager.borrow_mut().clear();
        Ok(())
    }

    pub(crate) fn enqueue_eager(&self, binding: Rc<dyn EagerBind>) {
        self.eager.borrow_mut().push(binding);
    }

    pub(crate) fn parent_scope(&self) -> Option<Rc<Locator>> {
        self.parent.clone()
    }

    pub(crate) fn bindings_of<S: ?Sized + 'static>(&self) -> Vec<(String, Rc<BindingCell<S>>)> {
        self.registry.borrow().bindings_of::<S>()
    }

    /// Walk the scope chain for (S, name) and produce an instance.
    /// The context is not rebased: diagnostics reflect the true caller.
    pub(crate) fn resolve_chain<S: ?Sized + 'static>(
        &self,
        ctx: &Rc<Context>,
    ) -> Result<Rc<S>, LocatorError> {
        if let Some(cell) = self.lookup::<S>(ctx.name()) {
            return cell.get(ctx);
        }
        match &self.parent {
            Some(parent) => parent.resolve_chain::<S>(ctx),
            None => Err(LocatorError::UnableToResolve {
                capability: std::any::type_name::<S>(),
                path: ctx.resolve_path(),
            }),
        }
    }

    pub(crate) fn try_resolve_chain<S: ?Sized + 'static>(
        &self,
        ctx: &Rc<Context>,
    ) -> Result<Option<Rc<S>>, LocatorError> {
        if let Some(cell) = self.lookup::<S>(ctx.name()) {
            return cell.get(ctx).map(Some);
        }
        match &self.parent {
            Some(parent) => parent.try_resolve_chain::<S>(ctx),
            None => Ok(None),
        }
    }

    pub(crate) fn can_resolve_chain<S: ?Sized + 'static>(&self, name: &str) -> bool {
        if self.registry.borrow().contains::<S>(name) {
            return true;
        }
        match &self.parent {
            Some(parent) => parent.can_resolve_chain::<S>(name),
            None => false,
        }
    }

    fn lookup<S: ?Sized + 'static>(&self, name: &str) -> Option<Rc<BindingCell<S>>> {
        self.registry.borrow().lookup::<S>(name)
    }
}
