//! # Process Query Test Suite
//!
//! Cross-subsystem flows: engine batches published on the shared bus and
//! consumed by the query projection (pq-01) and audit log (pq-02).
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/      # End-to-end flows over shared-bus
//!     └── flows.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p pq-tests integration::
//! ```

#![allow(unused_variables)]
#![allow(unused_imports)]
#![allow(dead_code)]

pub mod integration;
