use std::path::Path;

use inventory_core::ObjectLocation;

use crate::adapters::ServiceError;

pub trait ObjectDownloader {
    /// Copies the object at `location` into the local file `destination`,
    /// replacing any previous contents.
    fn download_to(&self, location: &ObjectLocation, destination: &Path)
        -> Result<(), ServiceError>;
}
