//! Named bindings and constructor injection: each animal resolves the food
//! bound under its own name.

use std::rc::Rc;

use ikebana::{Context, FromContext, Locator, LocatorError};

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
}

impl FromContext for Monkey {
    fn from_context(ctx: Rc<Context>) -> Result<Self, LocatorError> {
        Ok(Self {
            food: ctx.resolve_named::<dyn Food>("monkey")?,
        })
    }
}

impl Animal for Monkey {
    fn eat_favourite_food(&self) {
        println!("Monkey eats {}", self.food.name());
    }
}

struct Human {
    food: Rc<dyn Food>,
}

impl FromContext for Human {
    fn from_context(ctx: Rc<Context>) -> Result<Self, LocatorError> {
        Ok(Self {
            food: ctx.resolve_named::<dyn Food>("human")?,
        })
    }
}

impl Animal for Human {
    fn eat_favourite_food(&self) {
        println!("Human eats {}", self.food.name());
    }
}

fn main() -> Result<(), LocatorError> {
    env_logger::init();

    let sl = Locator::create();
    sl.bind_named::<dyn Animal>("monkey")?
        .to::<Monkey>(|ctx| Ok(Rc::new(Monkey::from_context(ctx)?)))
        .as_transient()?;
    sl.bind_named::<dyn Animal>("human")?
        .to::<Human>(|ctx| Ok(Rc::new(Human::from_context(ctx)?)))
        .as_transient()?;
    sl.bind_named::<dyn Food>("monkey")?
        .to::<Banana>(|_| Ok(Rc::new(Banana)))
        .as_transient()?;
    sl.bind_named::<dyn Food>("human")?
        .to::<Pizza>(|_| Ok(Rc::new(Pizza)))
        .as_transient()?;

    let ctx = sl.context()?;
    ctx.resolve_named::<dyn Animal>("monkey")?.eat_favourite_food();
    ctx.resolve_named::<dyn Animal>("human")?.eat_favourite_food();

    Ok(())
}
