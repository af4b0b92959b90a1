//! Domain layer: the bookmark forest and the pure rules applied to it.

pub mod model;
pub mod sort;
pub mod traits;
