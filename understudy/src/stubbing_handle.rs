use std::fmt;

use crate::{MockController, Stub};

/// Registration surface handed to a stubbing front-end.
///
/// Obtained from [`MockController::stubbing_handle`]. A fluent DSL builds
/// [`Stub`] values and passes each finished one to [`register`](Self::register).
pub struct StubbingHandle<'a> {
    controller: &'a MockController,
}

impl<'a> StubbingHandle<'a> {
    pub(crate) fn new(controller: &'a MockController) -> Self {
        Self { controller }
    }

    /// Adds `stub` in front of the stubs of its method.
    pub fn register<IN, OUT, ERR>(&self, stub: Stub<IN, OUT, ERR>)
    where
        IN: 'static,
        OUT: 'static,
        ERR: 'static,
    {
        self.controller.register(stub);
    }
}

impl fmt::Debug for StubbingHandle<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StubbingHandle")
            .field("mock_id", &self.controller.id())
            .finish()
    }
}
