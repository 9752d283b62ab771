//! The pointer sweep: move → capture → recognize → parse, step by step.

pub mod controller;
pub mod outcome;

pub use controller::PointerSweepController;
