// Public intake forms: waitlist signups and design-partner applications.

pub mod handlers;
pub mod store;
pub mod validation;
