// Library root
// -----------
// This crate exposes the pieces of the CarbonLens terminal client. The
// binary (`main.rs`) wires them into the interactive loop.
//
// Module responsibilities:
// - `api`: HTTP interaction with the receipt analysis service.
// - `session`: the upload session as an explicit set of phases.
// - `image`: reading the selected receipt photo and its preview.
// - `model`: the analysis result returned by the service.
// - `typewriter`: character-by-character reveal of the comparison text.
// - `view`: turns a session into the screen the user sees.
// - `worker`: runs one analysis off the UI thread and settles the session.
// - `currency`, `credits`, `config`, `error`: small supporting pieces.
// - `ui`: the terminal flow built on `dialoguer`, `indicatif` and
//   `crossterm`.
//
// Everything except `ui` is free of terminal I/O so it can be tested
// without a TTY.
pub mod api;
pub mod config;
pub mod credits;
pub mod currency;
pub mod error;
pub mod image;
pub mod model;
pub mod session;
pub mod typewriter;
pub mod ui;
pub mod view;
pub mod worker;
