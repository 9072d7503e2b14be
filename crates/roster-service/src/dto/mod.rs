//! Data transfer objects for the read API and command replies

mod responses;

pub use responses::{
    BindOutcome, BindingProgress, RosterResponse, SearchHit, SponsorEntry, SyncReport,
    UnbindReport,
};
