// Library root
// ------------
// The `pikarama` binary is a thin shell over this library so every part of
// the CLI can be driven from tests.
//
// Module responsibilities:
// - `api`: HTTP transport (bearer auth, query building, error capture).
// - `normalize`, `models`: turning loosely shaped API payloads into types.
// - `endpoints`: one typed call per REST operation.
// - `config`: where the API token lives between runs.
// - `ui`: prompts, notices and spinners behind the `Console` trait.
// - `flows`, `nav`: the interactive menu and the actions it offers.
// - `output`, `cli`, `commands`: the scriptable command-line surface.
pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod flows;
pub mod models;
pub mod nav;
pub mod normalize;
pub mod output;
pub mod ui;

#[cfg(test)]
mod testing;

pub use error::{Error, Result};
