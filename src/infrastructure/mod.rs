pub mod audio;
pub mod http;
pub mod model;
pub mod observability;
