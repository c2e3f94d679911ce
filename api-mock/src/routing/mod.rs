pub mod handler;
pub mod pattern;
pub mod registry;

pub use handler::{Handler, HandlerFn};
pub use pattern::PathPattern;
pub use registry::{MockHttpClient, RecordedInteraction};
