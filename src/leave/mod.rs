pub mod calendar;
pub mod duration;
pub mod service;
pub mod status;
