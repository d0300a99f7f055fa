// Library root
// -----------
// The binary (`main.rs`) parses flags and hands over to one of two entry
// modes built from these modules.
//
// Module responsibilities:
// - `api`: blocking HTTP client for the file store endpoints, plus the
//   JSON records it returns.
// - `upload`: folder upload with operation polling, shared by both modes.
// - `actions`: one-shot `--action=...` commands.
// - `ui`: the interactive numbered menu.
// - `cli`: command-line flags and the settings derived from them.
// - `display`: text rendering of stores and documents.
// - `error`: typed errors for the client and for bad invocations.
pub mod actions;
pub mod api;
pub mod cli;
pub mod display;
pub mod error;
pub mod ui;
pub mod upload;
