//! Resolution contexts: one node per in-flight request
//!
//! Every resolve call creates a fresh [Context] chained to the context of the
//! requesting caller. The chain is what makes the engine safe and debuggable:
//! walking it detects recursive construction before it starts, and rendering
//! it produces the resolution path reported by every failure.
//!
//! The root of a chain is a synthetic placeholder carrying no request of its
//! own; it is minted by [crate::Locator::context] and anchors the deferred
//! after-resolve queue used for two-phase (circular) injection.

use std::any::TypeId;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt::Write as _;
use std::rc::{Rc, Weak};

use once_cell::unsync::OnceCell;

use crate::error::LocatorError;
use crate::locator::Locator;

/// Identity of a capability or concrete type: a stable key plus a display name
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    pub(crate) fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub(crate) fn display(&self) -> &'static str {
        self.name
    }
}

/// The (capability, name) pair a context is resolving
struct Request {
    key: TypeKey,
    name: String,
}

type DeferredFn = Box<dyn FnOnce(Rc<Context>) -> Result<(), LocatorError>>;

/// One in-flight resolution request.
///
/// Obtained from [Locator::context] and handed to construction closures, a
/// context is the entry point for all resolution operations. Nested resolves
/// performed through it extend the chain, so a constructor asking for its own
/// dependencies keeps full cycle detection and path diagnostics.
pub struct Context {
    locator: Rc<Locator>,
    // Non-owning: a parent always outlives its children within one resolve
    // call, the link is only walked for cycle checks and path rendering.
    parent: Option<Weak<Context>>,
    request: Option<Request>,
    concrete: OnceCell<TypeKey>,
    // Drained on root contexts only; registrations route up the chain.
    deferred: RefCell<VecDeque<DeferredFn>>,
}

impl Context {
    pub(crate) fn new_root(locator: Rc<Locator>) -> Rc<Self> {
        Rc::new(Self {
            locator,
            parent: None,
            request: None,
            concrete: OnceCell::new(),
            deferred: RefCell::new(VecDeque::new()),
        })
    }

    pub(crate) fn child(self: &Rc<Self>, key: TypeKey, name: &str) -> Rc<Self> {
        Rc::new(Self {
            locator: Rc::clone(&self.locator),
            parent: Some(Rc::downgrade(self)),
            request: Some(Request {
                key,
                name: name.to_owned(),
            }),
            concrete: OnceCell::new(),
            deferred: RefCell::new(VecDeque::new()),
        })
    }

    /// The scope this context resolves through
    pub fn locator(&self) -> &Rc<Locator> {
        &self.locator
    }

    /// The binding name of the current request (empty for unnamed requests
    /// and for the synthetic root)
    pub fn name(&self) -> &str {
        self.request.as_ref().map_or("", |r| r.name.as_str())
    }

    /// Display name of the capability being resolved, if any
    pub fn capability(&self) -> Option<&'static str> {
        self.request.as_ref().map(|r| r.key.display())
    }

    /// The requesting context, absent on the root of the chain
    pub fn parent(&self) -> Option<Rc<Context>> {
        self.parent.as_ref().and_then(Weak::upgrade)
    }

    /// Resolve the unnamed binding of a capability.
    pub fn resolve<S: ?Sized + 'static>(self: &Rc<Self>) -> Result<Rc<S>, LocatorError> {
        self.resolve_named("")
    }

    /// Resolve a named binding of a capability.
    ///
    /// Fails with [LocatorError::RecursiveResolve] if this request revisits
    /// an ancestor, and with [LocatorError::UnableToResolve] if no scope in
    /// the chain has the binding.
    pub fn resolve_named<S: ?Sized + 'static>(
        self: &Rc<Self>,
        name: &str,
    ) -> Result<Rc<S>, LocatorError> {
        log::trace!("resolving <{}> named {:?}", std::any::type_name::<S>(), name);
        let ctx = self.child(TypeKey::of::<S>(), name);
        ctx.ensure_not_recursive()?;
        let instance = self.locator.resolve_chain::<S>(&ctx)?;
        self.drain_if_root()?;
        Ok(instance)
    }

    /// Resolve the unnamed binding, yielding `None` if nothing is bound.
    pub fn try_resolve<S: ?Sized + 'static>(
        self: &Rc<Self>,
    ) -> Result<Option<Rc<S>>, LocatorError> {
        self.try_resolve_named("")
    }

    /// Resolve a named binding, yielding `None` if nothing is bound.
    ///
    /// Only the miss is softened: a detected cycle is a configuration bug
    /// and still fails hard, as do construction failures.
    pub fn try_resolve_named<S: ?Sized + 'static>(
        self: &Rc<Self>,
        name: &str,
    ) -> Result<Option<Rc<S>>, LocatorError> {
        let ctx = self.child(TypeKey::of::<S>(), name);
        ctx.ensure_not_recursive()?;
        let instance = self.locator.try_resolve_chain::<S>(&ctx)?;
        self.drain_if_root()?;
        Ok(instance)
    }

    /// Whether any scope in the chain has the unnamed binding. Constructs nothing.
    pub fn can_resolve<S: ?Sized + 'static>(&self) -> bool {
        self.can_resolve_named::<S>("")
    }

    /// Whether any scope in the chain has the named binding. Constructs nothing.
    pub fn can_resolve_named<S: ?Sized + 'static>(&self, name: &str) -> bool {
        self.locator.can_resolve_chain::<S>(name)
    }

    /// Resolve every binding of a capability across the whole scope chain.
    ///
    /// Closest scope first, each scope's bindings in registration order. Each
    /// binding is resolved under its own child context carrying its registered
    /// name, so cycle detection applies per binding. An unbound capability
    /// yields an empty vector.
    pub fn resolve_all<S: ?Sized + 'static>(self: &Rc<Self>) -> Result<Vec<Rc<S>>, LocatorError> {
        let mut all = Vec::new();
        let mut scope = Rc::clone(&self.locator);
        loop {
            for (name, cell) in scope.bindings_of::<S>() {
                let ctx = self.child(TypeKey::of::<S>(), &name);
                ctx.ensure_not_recursive()?;
                all.push(cell.get(&ctx)?);
            }
            let Some(parent) = scope.parent_scope() else {
                break;
            };
            scope = parent;
        }
        self.drain_if_root()?;
        Ok(all)
    }

    /// A factory resolving a capability by name from a fresh root, detached
    /// from this context's chain. The closure keeps the locator alive and may
    /// outlive the context that minted it.
    pub fn provider<S: ?Sized + 'static>(
        &self,
    ) -> impl Fn(&str) -> Result<Rc<S>, LocatorError> {
        let locator = Rc::clone(&self.locator);
        move |name: &str| Context::new_root(Rc::clone(&locator)).resolve_named::<S>(name)
    }

    /// Soft-miss variant of [Context::provider].
    pub fn try_provider<S: ?Sized + 'static>(
        &self,
    ) -> impl Fn(&str) -> Result<Option<Rc<S>>, LocatorError> {
        let locator = Rc::clone(&self.locator);
        move |name: &str| Context::new_root(Rc::clone(&locator)).try_resolve_named::<S>(name)
    }

    /// Schedule a callback to run after the outermost resolve call returns.
    ///
    /// The callback receives a freshly minted root context and is the hook for
    /// property-style injection: two mutually dependent singletons can each be
    /// constructed as a shell and wired to the other once both exist.
    pub fn after_resolve(
        self: &Rc<Self>,
        callback: impl FnOnce(Rc<Context>) -> Result<(), LocatorError> + 'static,
    ) {
        self.root()
            .deferred
            .borrow_mut()
            .push_back(Box::new(callback));
    }

    /// Render the chain of requests leading to this context, outermost first.
    pub fn resolve_path(&self) -> String {
        let mut frames: Vec<String> = Vec::new();
        if let Some(frame) = self.render_frame() {
            frames.push(frame);
        }
        let mut cur = self.parent();
        while let Some(ctx) = cur {
            if let Some(frame) = ctx.render_frame() {
                frames.push(frame);
            }
            cur = ctx.parent();
        }
        frames.reverse();
        frames.join(" -> ")
    }

    /// Record the concrete type chosen for this request. One-shot.
    pub(crate) fn set_concrete(&self, key: TypeKey) -> Result<(), LocatorError> {
        self.concrete
            .set(key)
            .map_err(|_| LocatorError::BindingIssue("concrete type on context already set".into()))
    }

    /// Reject a request whose (capability, name) is already in flight on an
    /// ancestor. Re-entry under a different name is legitimate and allowed.
    fn ensure_not_recursive(&self) -> Result<(), LocatorError> {
        let Some(request) = &self.request else {
            return Ok(());
        };
        let mut cur = self.parent();
        while let Some(ancestor) = cur {
            if let Some(above) = &ancestor.request {
                if above.key == request.key && above.name == request.name {
                    return Err(LocatorError::RecursiveResolve {
                        path: self.resolve_path(),
                    });
                }
            }
            cur = ancestor.parent();
        }
        Ok(())
    }

    fn render_frame(&self) -> Option<String> {
        let request = self.request.as_ref()?;
        let mut out = String::new();
        let _ = write!(out, "resolve<{}>({:?})", request.key.display(), request.name);
        if let Some(concrete) = self.concrete.get() {
            let _ = write!(out, ".to<{}>", concrete.display());
        }
        Some(out)
    }

    fn drain_if_root(self: &Rc<Self>) -> Result<(), LocatorError> {
        if self.parent.is_none() {
            self.drain_deferred()?;
        }
        Ok(())
    }

    /// Run queued after-resolve callbacks to exhaustion. Each callback gets a
    /// fresh root context; callbacks queued during the drain, directly or via
    /// nested resolves, also run before control returns.
    pub(crate) fn drain_deferred(self: &Rc<Self>) -> Result<(), LocatorError> {
        loop {
            let next = self.deferred.borrow_mut().pop_front();
            let Some(callback) = next else {
                return Ok(());
            };
            log::trace!("running after-resolve callback");
            let fresh = Context::new_root(Rc::clone(&self.locator));
            callback(Rc::clone(&fresh))?;
            fresh.drain_deferred()?;
        }
    }

    fn root(self: &Rc<Self>) -> Rc<Context> {
        let mut cur = Rc::clone(self);
        while let Some(parent) = cur.parent() {
            cur = parent;
        }
        cur
    }
}
