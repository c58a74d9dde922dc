use inventory_core::InventoryRecord;

use crate::adapters::ServiceError;

pub trait InventoryTable {
    /// Writes one record keyed by store and item, replacing any existing one.
    fn put_record(&self, record: &InventoryRecord) -> Result<(), ServiceError>;
}
