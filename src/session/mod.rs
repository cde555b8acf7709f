//! Session registry
//!
//! Keeps each encode's tree, codes and payload so later decode, visualize and
//! export requests use the exact tree built at encode time.

pub mod model;
pub mod store;

pub use model::Session;
pub use store::SessionStore;
