//! Zoom Photo Studio: place a photo inside a decorative frame, adjust it, lock
//! the view and export a 2x PNG. The desktop window lives in [`app`], the
//! headless compositor in [`cli`]; both drive the same [`studio::Studio`].

#[macro_use]
pub mod logger;
pub mod app;
pub mod cli;
pub mod io;
pub mod settings;
pub mod studio;
pub mod theme;
