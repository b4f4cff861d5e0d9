// HTTP routes
pub mod analytics;
pub mod extract;
pub mod feedback;
pub mod health;
pub mod library;
pub mod search;
pub mod seed;

pub use analytics::*;
pub use extract::*;
pub use feedback::*;
pub use health::*;
pub use library::*;
pub use search::*;
pub use seed::*;
