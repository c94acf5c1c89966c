//! Controller layer: backend events and command orchestration between the UI and the worker.

pub mod events;
pub mod orchestration;
