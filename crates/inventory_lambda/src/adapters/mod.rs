pub mod error;
pub mod object_store;
pub mod table;
pub mod topics;

pub use error::ServiceError;
pub use object_store::ObjectDownloader;
pub use table::InventoryTable;
pub use topics::TopicService;
