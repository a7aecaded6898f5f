pub mod cors;
pub mod locale;

pub use cors::cors_middleware;
pub use locale::locale_middleware;
