pub mod executor;
pub mod logger;
pub mod sicap;
pub mod tools;
