pub mod avatar;

pub use avatar::gravatar_url;
