use crate::factory::{ProcessResultFactory, RevalidatingResultFactory, ResultFactory};
use crate::session::RevalidationQuery;

/// Services the judging pipeline pulls its collaborators from.
pub struct Container {
    result_factory: Box<dyn ResultFactory>,
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl Container {
    pub fn new() -> Self {
        Self {
            result_factory: Box::new(ProcessResultFactory::new()),
        }
    }

    pub fn with_result_factory(result_factory: Box<dyn ResultFactory>) -> Self {
        Self { result_factory }
    }

    pub fn result_factory(&mut self) -> &mut dyn ResultFactory {
        self.result_factory.as_mut()
    }

    /// Rebind the result factory, handing the previous one to `wrap`.
    pub fn replace_result_factory<F>(self, wrap: F) -> Self
    where
        F: FnOnce(Box<dyn ResultFactory>) -> Box<dyn ResultFactory>,
    {
        Self {
            result_factory: wrap(self.result_factory),
        }
    }
}

/// Route every result through static analysis. Called once at startup.
pub fn bootstrap<Q>(container: Container, query: Q) -> Container
where
    Q: RevalidationQuery + 'static,
{
    container.replace_result_factory(|next| Box::new(RevalidatingResultFactory::new(next, query)))
}
