// handlers/public/auth/mod.rs - Public authentication handlers
//
// Token acquisition for the admin panel. Mounted at POST /api/auth/login
// and at the legacy POST /auth/login.

pub mod login; // POST /auth/login - throttle, captcha, credentials, JWT

pub use login::login_post;
