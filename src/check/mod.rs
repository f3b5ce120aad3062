//! Model-versus-reference validation.
//!
//! Responsibilities:
//!
//! - define the tolerance and which component(s) are compared (`criteria`)
//! - locate the first out-of-tolerance sample (`scan`)
//! - summarize discrepancies per component (`summary`)

pub mod criteria;
pub mod scan;
pub mod summary;

pub use criteria::Tolerance;
pub use scan::*;
pub use summary::*;
