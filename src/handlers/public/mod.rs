// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Everything the public site reads, plus the booking form, login and the
// legacy spreadsheet export (which checks its own token).
//
// Security Level: None at the router; `/api` is rate limited per client.

pub mod auth;
pub mod bookings;
pub mod config;
pub mod content;
pub mod gallery;
pub mod health;
pub mod shifts;
pub mod team;
