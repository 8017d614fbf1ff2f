//! Markup-to-model extraction.
//!
//! [`dom`] flattens documents into walkable block runs, [`sections`] runs
//! the layered section heuristics, [`changes`] normalizes amendment
//! timelines. Everything here is synchronous and deterministic: same markup
//! in, same entities out.

pub mod changes;
pub mod dom;
pub mod sections;
