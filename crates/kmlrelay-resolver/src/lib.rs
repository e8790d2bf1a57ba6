//! Locates the "areas of interest" coverage file referenced by a proposal or
//! radio record and dispatches it to the external KML processing pipeline.

pub mod model;
pub mod resolver;

pub use model::{find_area_file_url, FileReference, FileUrl, Proposal, Radio};
pub use resolver::{resolve_for_proposal, resolve_for_radio, CoverageHooks, CoverageState, Outcome};
