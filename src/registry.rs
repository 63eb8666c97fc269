//! Type-erased storage of bindings, one slot per capability
//!
//! Heterogeneous bindings live in a single map keyed by the capability's
//! [TypeId]; the typed view is recovered by downcasting through the same key
//! that selected it, so no cast across unrelated capabilities can succeed.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::rc::Rc;

use crate::binding::BindingCell;
use crate::context::TypeKey;
use crate::error::LocatorError;

/// Named bindings of a single capability, in registration order
struct Slot<S: ?Sized + 'static> {
    entries: Vec<(String, Rc<BindingCell<S>>)>,
}

/// All bindings registered in one scope
pub(crate) struct Registry {
    slots: HashMap<TypeId, Box<dyn Any>>,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self {
            slots: HashMap::new(),
        }
    }

    /// Register a fresh, unconfigured binding for (capability, name).
    ///
    /// Only this registry is checked for duplicates: ancestor scopes are
    /// shadowed, not consulted.
    pub(crate) fn register<S: ?Sized + 'static>(
        &mut self,
        name: &str,
    ) -> Result<Rc<BindingCell<S>>, LocatorError> {
        let slot = self
            .slots
            .entry(TypeId::of::<S>())
            .or_insert_with(|| Box::new(Slot::<S> { entries: Vec::new() }));
        let Some(slot) = slot.downcast_mut::<Slot<S>>() else {
            return Err(LocatorError::BindingIssue(format!(
                "capability slot mismatch for <{}>",
                std::any::type_name::<S>()
            )));
        };
        if slot.entries.iter().any(|(n, _)| n == name) {
            return Err(LocatorError::DuplicateBinding {
                capability: std::any::type_name::<S>(),
                name: name.to_owned(),
            });
        }
        let cell = Rc::new(BindingCell::new(TypeKey::of::<S>(), name));
        slot.entries.push((name.to_owned(), Rc::clone(&cell)));
        Ok(cell)
    }

    pub(crate) fn lookup<S: ?Sized + 'static>(&self, name: &str) -> Option<Rc<BindingCell<S>>> {
        self.slot::<S>()?
            .entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, cell)| Rc::clone(cell))
    }

    pub(crate) fn contains<S: ?Sized + 'static>(&self, name: &str) -> bool {
        self.slot::<S>()
            .is_some_and(|slot| slot.entries.iter().any(|(n, _)| n == name))
    }

    /// Clones of every binding of the capability, in registration order
    pub(crate) fn bindings_of<S: ?Sized + 'static>(&self) -> Vec<(String, Rc<BindingCell<S>>)> {
        self.slot::<S>()
            .map(|slot| slot.entries.clone())
            .unwrap_or_default()
    }

    fn slot<S: ?Sized + 'static>(&self) -> Option<&Slot<S>> {
        self.slots.get(&TypeId::of::<S>())?.downcast_ref::<Slot<S>>()
    }
}
