// src/checker/mod.rs
// =============================================================================
// This module contains all link liveness checking logic.
//
// Submodules:
// - http: one probe = one browser-like GET, turned into a status code
// - pool: runs probes in the background with a concurrency cap, a shared
//         deadline, and a way to wait for all of them
//
// The pool knows nothing about HTTP, and a probe knows nothing about how
// many of its siblings are running.
// =============================================================================

mod http;
mod pool;

pub use http::{
    build_client, check_link, probe_url, ProbeVerdict, NO_RESPONSE_STATUS, UNBUILDABLE_STATUS,
};
pub use pool::{ProbeContext, ProbePool, WaitOutcome};
