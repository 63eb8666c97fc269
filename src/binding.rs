//! Bindings: one registered recipe per (capability, name)
//!
//! A binding pairs a construction closure with a lifecycle policy. The policy
//! is chosen exactly once through the fluent [Binder] chain returned by
//! [crate::Locator::bind]; afterwards the binding is immutable for the life of
//! its owning scope:
//!
//! * *transient*: every get constructs a new instance
//! * *singleton*: the first successful get constructs and caches, later gets
//!   share the cached instance
//! * *instance*: every get returns a pre-supplied object
//! * *alias*: get forwards to another (capability, name) through the calling
//!   context

use std::cell::RefCell;
use std::rc::Rc;

use crate::context::{Context, TypeKey};
use crate::error::LocatorError;
use crate::locator::Locator;

pub(crate) type CreateFn<S> = Rc<dyn Fn(Rc<Context>) -> Result<Rc<S>, LocatorError>>;

/// Construct a value from a resolution context.
///
/// The conventional constructor shape for types that resolve their own
/// dependencies; [Binder::to_self] binds such a type as its own capability.
pub trait FromContext: Sized {
    fn from_context(ctx: Rc<Context>) -> Result<Self, LocatorError>;
}

enum Policy<S: ?Sized> {
    Unconfigured,
    Transient(CreateFn<S>),
    Singleton {
        create: CreateFn<S>,
        cached: Option<Rc<S>>,
    },
    Instance(Rc<S>),
    Alias(CreateFn<S>),
}

/// One registered recipe: lifecycle policy plus construction closure
pub(crate) struct BindingCell<S: ?Sized + 'static> {
    capability: TypeKey,
    name: String,
    policy: RefCell<Policy<S>>,
}

impl<S: ?Sized + 'static> BindingCell<S> {
    pub(crate) fn new(capability: TypeKey, name: &str) -> Self {
        Self {
            capability,
            name: name.to_owned(),
            policy: RefCell::new(Policy::Unconfigured),
        }
    }

    /// Produce an instance according to the configured policy.
    ///
    /// A singleton whose construction fails stays uninitialized, so a later
    /// get retries instead of serving a cached failure.
    pub(crate) fn get(&self, ctx: &Rc<Context>) -> Result<Rc<S>, LocatorError> {
        let (create, is_singleton) = {
            let policy = self.policy.borrow();
            match &*policy {
                Policy::Unconfigured => {
                    return Err(LocatorError::BindingIssue(format!(
                        "binding for <{}> named {:?} has no construction strategy",
                        self.capability.display(),
                        self.name
                    )))
                }
                Policy::Instance(instance) => return Ok(Rc::clone(instance)),
                Policy::Singleton {
                    cached: Some(instance),
                    ..
                } => return Ok(Rc::clone(instance)),
                Policy::Singleton { create, .. } => (Rc::clone(create), true),
                Policy::Transient(create) | Policy::Alias(create) => (Rc::clone(create), false),
            }
        };
        let instance = create(Rc::clone(ctx))?;
        if is_singleton {
            log::debug!(
                "materialized singleton <{}> named {:?}",
                self.capability.display(),
                self.name
            );
            if let Policy::Singleton { cached, .. } = &mut *self.policy.borrow_mut() {
                *cached = Some(Rc::clone(&instance));
            }
        }
        Ok(instance)
    }

    fn configure(&self, policy: Policy<S>) -> Result<(), LocatorError> {
        let mut slot = self.policy.borrow_mut();
        if !matches!(*slot, Policy::Unconfigured) {
            return Err(LocatorError::BindingIssue(format!(
                "binding for <{}> named {:?} already has a lifecycle",
                self.capability.display(),
                self.name
            )));
        }
        *slot = policy;
        Ok(())
    }
}

/// Type-erased hook letting the eager queue hold bindings of any capability
pub(crate) trait EagerBind {
    fn eager_bind(&self, root: &Rc<Context>) -> Result<(), LocatorError>;
}

impl<S: ?Sized + 'static> EagerBind for BindingCell<S> {
    fn eager_bind(&self, root: &Rc<Context>) -> Result<(), LocatorError> {
        log::trace!(
            "eagerly binding <{}> named {:?}",
            self.capability.display(),
            self.name
        );
        let ctx = root.child(TypeKey::of::<S>(), &self.name);
        self.get(&ctx)?;
        Ok(())
    }
}

/// Configuration handle returned by [Locator::bind]: pick a construction strategy
#[must_use = "a binding without a construction strategy cannot resolve"]
pub struct Binder<S: ?Sized + 'static> {
    cell: Rc<BindingCell<S>>,
    locator: Rc<Locator>,
}

impl<S: ?Sized + 'static> Binder<S> {
    pub(crate) fn new(cell: Rc<BindingCell<S>>, locator: Rc<Locator>) -> Self {
        Self { cell, locator }
    }

    /// Construct with a closure, recording `C` as the chosen concrete type.
    ///
    /// The closure performs any unsizing itself, e.g.
    /// `|ctx| Ok(Rc::new(Monkey::from_context(ctx)?))` for a `dyn Animal`
    /// capability. Lifecycle defaults to transient unless a clause follows.
    pub fn to<C: 'static>(
        self,
        ctor: impl Fn(Rc<Context>) -> Result<Rc<S>, LocatorError> + 'static,
    ) -> Lifecycle<S> {
        let create: CreateFn<S> = Rc::new(move |ctx: Rc<Context>| {
            ctx.set_concrete(TypeKey::of::<C>())?;
            ctor(ctx)
        });
        Lifecycle {
            cell: self.cell,
            locator: self.locator,
            create: Some(create),
        }
    }

    /// Bind a concrete capability to its own [FromContext] constructor.
    pub fn to_self(self) -> Lifecycle<S>
    where
        S: FromContext + Sized,
    {
        self.to::<S>(|ctx| Ok(Rc::new(S::from_context(ctx)?)))
    }

    /// Bind a concrete capability with no dependencies of its own.
    pub fn to_self_default(self) -> Lifecycle<S>
    where
        S: Default + Sized,
    {
        self.to::<S>(|_| Ok(Rc::new(S::default())))
    }

    /// Always return the supplied instance.
    ///
    /// The engine only ever holds one shared reference: objects owned
    /// elsewhere stay alive after every engine-held reference is dropped.
    pub fn to_instance(self, instance: Rc<S>) -> Result<(), LocatorError> {
        self.cell.configure(Policy::Instance(instance))
    }

    /// Forward to another name under the same capability.
    pub fn alias_named(self, name: impl Into<String>) -> Result<(), LocatorError> {
        let name = name.into();
        let create: CreateFn<S> = Rc::new(move |ctx: Rc<Context>| ctx.resolve_named::<S>(&name));
        self.cell.configure(Policy::Alias(create))
    }

    /// Forward to another capability, keeping the requested name.
    ///
    /// `convert` adapts the target's instance to this capability, typically
    /// by wrapping or by an explicit unsizing cast.
    pub fn alias_to<A, F>(self, convert: F) -> Result<(), LocatorError>
    where
        A: ?Sized + 'static,
        F: Fn(Rc<A>) -> Rc<S> + 'static,
    {
        let create: CreateFn<S> = Rc::new(move |ctx: Rc<Context>| {
            let name = ctx.name().to_owned();
            Ok(convert(ctx.resolve_named::<A>(&name)?))
        });
        self.cell.configure(Policy::Alias(create))
    }

    /// Forward to another capability under an explicit name.
    pub fn alias_to_named<A, F>(self, name: impl Into<String>, convert: F) -> Result<(), LocatorError>
    where
        A: ?Sized + 'static,
        F: Fn(Rc<A>) -> Rc<S> + 'static,
    {
        let name = name.into();
        let create: CreateFn<S> =
            Rc::new(move |ctx: Rc<Context>| Ok(convert(ctx.resolve_named::<A>(&name)?)));
        self.cell.configure(Policy::Alias(create))
    }
}

/// Lifecycle clause: transient (the default) or singleton
pub struct Lifecycle<S: ?Sized + 'static> {
    cell: Rc<BindingCell<S>>,
    locator: Rc<Locator>,
    create: Option<CreateFn<S>>,
}

impl<S: ?Sized + 'static> Lifecycle<S> {
    /// Every get constructs a fresh instance. This is also what a dropped
    /// clause commits to, mirroring the unadorned binding default.
    pub fn as_transient(mut self) -> Result<(), LocatorError> {
        let Some(create) = self.create.take() else {
            return Err(LocatorError::BindingIssue(
                "lifecycle clause already consumed".into(),
            ));
        };
        self.cell.configure(Policy::Transient(create))
    }

    /// The first successful get constructs and caches; later gets share it.
    pub fn as_singleton(mut self) -> Result<Eager<S>, LocatorError> {
        let Some(create) = self.create.take() else {
            return Err(LocatorError::BindingIssue(
                "lifecycle clause already consumed".into(),
            ));
        };
        self.cell.configure(Policy::Singleton {
            create,
            cached: None,
        })?;
        Ok(Eager {
            cell: Rc::clone(&self.cell),
            locator: Rc::clone(&self.locator),
        })
    }
}

impl<S: ?Sized + 'static> Drop for Lifecycle<S> {
    fn drop(&mut self) {
        // Chains that stop after the construction clause stay transient.
        // The cell is still unconfigured at this point, so this cannot fail.
        if let Some(create) = self.create.take() {
            let _ = self.cell.configure(Policy::Transient(create));
        }
    }
}

/// Eager clause on a singleton binding
pub struct Eager<S: ?Sized + 'static> {
    cell: Rc<BindingCell<S>>,
    locator: Rc<Locator>,
}

impl<S: ?Sized + 'static> Eager<S> {
    /// Materialize this singleton when the scope's context is first obtained,
    /// instead of on first use.
    pub fn eagerly(self) {
        log::debug!(
            "queued eager binding for <{}> named {:?}",
            self.cell.capability.display(),
            self.cell.name
        );
        self.locator.enqueue_eager(self.cell);
    }
}
