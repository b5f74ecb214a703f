// handlers/mod.rs - Two-tier handler architecture
//
// Public (no auth) → Protected (JWT auth + per-route role allow-list)
//
// Role guards are attached in routes.rs; handlers in `protected` may assume
// an `AuthUser` extension is present.
pub mod public; // Tier 1: site content, booking form, login
pub mod protected; // Tier 2: admin surface

pub mod present;
pub mod validate;
