//! A timeline viewer and editor for the terminal.
//!
//! The core is UI-toolkit agnostic: [`db`] holds the data, [`scene`] lays it
//! out in pixel space, [`drawer`] paints through a [`drawer::Canvas`] trait
//! and [`interaction`] turns pointer input into db mutations. The remaining
//! modules host that core in a ratatui terminal app.

pub mod app;
pub mod calendar;
pub mod cli;
pub mod color;
pub mod config;
pub mod db;
pub mod drawer;
pub mod error;
pub mod event;
pub mod interaction;
pub mod model;
pub mod scene;
pub mod time;
pub mod timer;
pub mod tui;
pub mod tutorial;
pub mod ui;
pub mod view;
pub mod xml;
