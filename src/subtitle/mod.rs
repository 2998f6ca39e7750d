pub mod container;
pub mod enrichment;
pub mod line;
pub mod session;

pub use container::{
    detect_language,
    IngestOptions,
    Progress,
    ScriptConverter,
    SharedSubtitle,
    SubtitleContainer,
};
pub use enrichment::Enricher;
pub use line::{
    Line,
    LineContent,
};
pub use session::SubtitleSession;
