//! CLI subcommands that talk to a running Homeport server over HTTP.

pub mod sections;
pub mod status;
