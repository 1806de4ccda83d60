//! dxcompare command line: configuration, logging setup and the end-to-end
//! pipeline behind the `dxcompare` binary.
pub mod config;
pub mod logging;
pub mod pipeline;
