//! Configuration and path management

pub mod paths;
