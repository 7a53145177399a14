// Two security tiers: public token acquisition under /auth, everything
// else behind the JWT guard under /api.

pub mod protected;
pub mod public;
