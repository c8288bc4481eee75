//! Integration flows

pub mod flows;
