pub mod export;
pub mod health;
pub mod stats;
pub mod subscribe;
pub mod unsubscribe;

pub use export::export;
pub use health::health;
pub use stats::stats;
pub use subscribe::subscribe;
pub use unsubscribe::unsubscribe;
