//! Core data types for components, bundles, hints and unit descriptions.
//!
//! This module contains the records a [`ResultSet`](crate::ResultSet) stores
//! and mutates:
//!
//! - [`Component`] - A software component discovered inside a unit
//! - [`Bundle`] - The package/container a component was found in
//! - [`Hint`] - A diagnostic raised while processing a unit
//! - [`UnitInput`] - A unit as handed to the compose pipeline
//!
//! # Example
//!
//! ```
//! use compose_result::model::{Component, ComponentKind};
//!
//! let cpt = Component::new("org.example.App", ComponentKind::DesktopApp).into_ref();
//! assert_eq!(cpt.read().id(), "org.example.App");
//! ```

mod component;
mod hint;
mod unit;

pub use component::*;
pub use hint::*;
pub use unit::*;
