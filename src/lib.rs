// Library root
// ------------
// `github-release` is a thin binary over this crate.
//
// Module responsibilities:
// - `api`: blocking client for the GitHub releases REST API (repository
//   lookup, release get/create/delete, asset upload).
// - `commands`: runs one CLI subcommand end to end against the client.
// - `cli`: clap argument model.
// - `token`: token lookup (flag, environment, token file).
// - `logging`: stderr tracing subscriber.
// - `error`: error enums shared by the above.
pub mod api;
pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod token;
