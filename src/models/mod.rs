//! Domain models for plotline.
//!
//! # Core Concepts
//!
//! - [`Project`]: the whole document. Owns everything below and is the unit of
//!   persistence, undo/redo and AI context.
//! - [`OutlineNode`]: a section of the manuscript outline. Sections nest
//!   arbitrarily deep and reference characters by id only.
//! - [`Character`]: a roster entry with a fixed set of optional profile fields.
//! - [`Note`]: free-form text.
//! - [`TaskList`]: a named checklist of [`Task`]s.
//! - [`ItemRef`]: which item is open in the editor, by kind and id.

mod character;
mod note;
mod outline;
mod project;
mod selection;
mod task;

pub use character::*;
pub use note::*;
pub use outline::*;
pub use project::*;
pub use selection::*;
pub use task::*;
