//! Grouping of setup code into reusable units

use std::rc::Rc;

use crate::error::LocatorError;
use crate::locator::Locator;

/// A unit of binding setup, installed with [Locator::install].
///
/// Modules only organize calls to [Locator::bind] and run during the setup
/// phase, before any context is obtained; binding conflicts surface as the
/// ordinary duplicate error.
///
/// ```
/// use std::rc::Rc;
/// use ikebana::{Locator, LocatorError, Module};
///
/// trait Clock { fn now(&self) -> u64; }
/// struct FixedClock;
/// impl Clock for FixedClock { fn now(&self) -> u64 { 42 } }
///
/// struct ClockModule;
/// impl Module for ClockModule {
///     fn load(&self, locator: &Rc<Locator>) -> Result<(), LocatorError> {
///         locator
///             .bind::<dyn Clock>()?
///             .to::<FixedClock>(|_| Ok(Rc::new(FixedClock)))
///             .as_singleton()?;
///         Ok(())
///     }
/// }
///
/// # fn main() -> Result<(), LocatorError> {
/// let sl = Locator::create();
/// sl.install(&ClockModule)?;
/// assert_eq!(sl.context()?.resolve::<dyn Clock>()?.now(), 42);
/// # Ok(())
/// # }
/// ```
pub trait Module {
    fn load(&self, locator: &Rc<Locator>) -> Result<(), LocatorError>;
}
