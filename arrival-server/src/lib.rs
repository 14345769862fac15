//! Bus arrival delay server.
//!
//! Loads an operator's timetable once, polls live vehicle positions in the
//! background, and answers: "how late is this trip at this stop?"

pub mod config;
pub mod domain;
pub mod evaluator;
pub mod feed;
pub mod live;
pub mod schedule;
pub mod web;
