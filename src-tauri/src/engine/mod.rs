pub mod charts;
pub mod metrics;
pub mod pipeline;
pub mod selector;
