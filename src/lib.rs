//! Hierarchical service location with scoped lifetimes and two-phase injection.
//!
//! A [Locator] is a scope holding named bindings from capabilities (usually
//! trait object types) to construction recipes. Resolution walks a chain of
//! nested scopes, tracks every in-flight request in a [Context] chain for
//! cycle detection and path diagnostics, and supports four lifecycles:
//! transient, singleton, fixed instance, and alias.
//!
//! # Simple use case
//!
//! ```
//! use std::rc::Rc;
//! use ikebana::{Locator, LocatorError};
//!
//! // Define a capability and an implementor
//! trait Greeter {
//!     fn greet(&self) -> String;
//! }
//!
//! struct English;
//!
//! impl Greeter for English {
//!     fn greet(&self) -> String {
//!         "hello".into()
//!     }
//! }
//!
//! # fn main() -> Result<(), LocatorError> {
//! // Bind the capability in a scope, then resolve through its context
//! let sl = Locator::create();
//! sl.bind::<dyn Greeter>()?
//!     .to::<English>(|_| Ok(Rc::new(English)))
//!     .as_singleton()?;
//!
//! let ctx = sl.context()?;
//! let greeter = ctx.resolve::<dyn Greeter>()?;
//! assert_eq!(greeter.greet(), "hello");
//! # Ok(())
//! # }
//! ```
//!
//! # Mechanism
//!
//! Capabilities are identified by their [std::any::TypeId]; each scope stores
//! heterogeneous bindings behind one type-erased slot per capability and
//! recovers the typed view through the identity that selected it. A child
//! scope created with [Locator::enter] shadows ancestor bindings without
//! affecting the ancestors themselves.
//!
//! Every resolve call runs under a fresh [Context] chained to its caller's:
//! revisiting the same (capability, name) as an ancestor fails fast with the
//! reconstructed resolution path, while re-entry under a different name stays
//! legal. Constructors may schedule [Context::after_resolve] callbacks, which
//! run once the outermost resolve returns: the hook that lets two mutually
//! dependent singletons wire references to each other. Singleton bindings
//! flagged [eagerly](Eager::eagerly) are materialized when their scope's
//! context is first obtained.
//!
//! The engine is single-threaded by contract: instances are handed out as
//! [Rc](std::rc::Rc) and a locator chain cannot be shared across threads.

mod binding;
mod context;
mod error;
mod locator;
mod module;
mod registry;

pub use binding::{Binder, Eager, FromContext, Lifecycle};
pub use context::Context;
pub use error::LocatorError;
pub use locator::Locator;
pub use module::Module;
