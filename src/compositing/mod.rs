//! Reconciles world objects against a presentation sink

pub mod pipeline;
pub mod sink;

pub use pipeline::{classify, CompositeOp, CompositeSummary, CompositingPipeline};
pub use sink::{PresentationHandle, PresentationSink, RecordingSink, SinkCall, SinkOp};
