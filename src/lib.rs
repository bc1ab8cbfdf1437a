pub mod config;
pub mod error;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod result;

pub use config::Config;
pub use error::ComposeError;
pub use model::{Bundle, BundleKind, Component, ComponentKind, ComponentRef, Hint, MergeKind, UnitBundle};
pub use result::ResultSet;
