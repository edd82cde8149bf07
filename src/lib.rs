//! Primary flight display for a homebuilt EFIS: serial link, frame decoder,
//! instrument renderer and an egui front end.

pub mod clock;
pub mod config;
pub mod error;
pub mod link;
pub mod logging;
pub mod protocol;
pub mod render;
pub mod settings;
pub mod state;
pub mod ui;
pub mod units;
