pub mod errors;
pub mod models;
pub mod session;
pub mod utils;

pub use errors::KikitoriError;
pub use models::{
    ChineseVariant,
    Entry,
    Language,
};
pub use session::ActiveSubtitle;
