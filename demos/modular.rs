//! Module-based setup: bindings grouped in reusable units, an eager singleton
//! logbook, and enumeration of every animal in the zoo.

use std::rc::Rc;

use ikebana::{Context, FromContext, Locator, LocatorError, Module};

trait Logbook {
    fn record(&self, line: &str);
}

struct ConsoleLogbook;

impl Logbook for ConsoleLogbook {
    fn record(&self, line: &str) {
        println!("[logbook] {line}");
    }
}

trait Food {
    fn name(&self) -> &'static str;
}

struct Banana;

impl Food for Banana {
    fn name(&self) -> &'static str {
        "Banana"
    }
}

struct Pizza;

impl Food for Pizza {
    fn name(&self) -> &'static str {
        "Pizza"
    }
}

trait Animal {
    fn eat_favourite_food(&self);
}

struct Monkey {
    food: Rc<dyn Food>,
    logbook: Rc<dyn Logbook>,
}

impl FromContext for Monkey {
    fn from_context(ctx: Rc<Context>) -> Result<Self, LocatorError> {
        Ok(Self {
            food: ctx.resolve_named::<dyn Food>("monkey")?,
            logbook: ctx.resolve::<dyn Logbook>()?,
        })
    }
}

impl Animal for Monkey {
    fn eat_favourite_food(&self) {
        self.logbook.record(&format!("Monkey eats {}", self.food.name()));
    }
}

struct Human {
    food: Rc<dyn Food>,
    logbook: Rc<dyn Logbook>,
}

impl FromContext for Human {
    fn from_context(ctx: Rc<Context>) -> Result<Self, LocatorError> {
        Ok(Self {
            food: ctx.resolve_named::<dyn Food>("human")?,
            logbook: ctx.resolve::<dyn Logbook>()?,
        })
    }
}

impl Animal for Human {
    fn eat_favourite_food(&self) {
        self.logbook.record(&format!("Human eats {}", self.food.name()));
    }
}

/// The logbook opens as soon as the zoo's context is first obtained.
struct HouseModule;

impl Module for HouseModule {
    fn load(&self, locator: &Rc<Locator>) -> Result<(), LocatorError> {
        locator
            .bind::<dyn Logbook>()?
            .to::<ConsoleLogbook>(|_| {
                println!("[logbook] opened");
                Ok(Rc::new(ConsoleLogbook))
            })
            .as_singleton()?
            .eagerly();
        Ok(())
    }
}

struct FoodModule;

impl Module for FoodModule {
    fn load(&self, locator: &Rc<Locator>) -> Result<(), LocatorError> {
        locator
            .bind_named::<dyn Food>("monkey")?
            .to::<Banana>(|_| Ok(Rc::new(Banana)))
            .as_transient()?;
        locator
            .bind_named::<dyn Food>("human")?
            .to::<Pizza>(|_| Ok(Rc::new(Pizza)))
            .as_transient()?;
        Ok(())
    }
}

struct AnimalModule;

impl Module for AnimalModule {
    fn load(&self, locator: &Rc<Locator>) -> Result<(), LocatorError> {
        locator
            .bind_named::<dyn Animal>("monkey")?
            .to::<Monkey>(|ctx| Ok(Rc::new(Monkey::from_context(ctx)?)))
            .as_singleton()?;
        locator
            .bind_named::<dyn Animal>("human")?
            .to::<Human>(|ctx| Ok(Rc::new(Human::from_context(ctx)?)))
            .as_singleton()?;
        Ok(())
    }
}

fn main() -> Result<(), LocatorError> {
    env_logger::init();

    let sl = Locator::create();
    sl.install(&HouseModule)?;
    sl.install(&FoodModule)?;
    sl.install(&AnimalModule)?;

    let ctx = sl.context()?;
    for animal in ctx.resolve_all::<dyn Animal>()? {
        animal.eat_favourite_food();
    }

    Ok(())
}
