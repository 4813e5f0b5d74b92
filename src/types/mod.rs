pub mod response;

pub use response::{ActionResult, Message, PageMeta};
