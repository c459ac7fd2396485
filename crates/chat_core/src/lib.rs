//! Chat client core: model catalog, character budgets, attachment staging
//! and reply decomposition, tied together by [`ChatSession`].

pub mod attachment;
pub mod budget;
pub mod catalog;
pub mod error;
pub mod reply;
pub mod session;
pub mod source;
pub mod text;

pub use attachment::{Attachment, AttachmentPreparer, Preview, ReadCompletion, TextRead};
pub use budget::CharBudgetEstimator;
pub use catalog::{CatalogState, ModelCatalog};
pub use error::{CoreError, RejectReason};
pub use reply::{decompose, ParsedReply};
pub use session::{ChatSession, Exchange};
pub use source::{FileSource, MemoryFile, SharedFile};
