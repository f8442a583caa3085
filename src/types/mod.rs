//! Shared data structures for the grants lookup pipeline
//!
//! - [`GrantRecord`]: one OpenFEMA project-worksheet row
//! - [`UtilitySummary`]: per-applicant aggregation
//! - [`SearchParams`]: upstream filters plus keyword lists
//! - [`Money`]: exact currency amounts

mod grant;
pub mod lenient;
mod money;
mod search;
mod summary;

pub use grant::*;
pub use money::*;
pub use search::*;
pub use summary::*;
