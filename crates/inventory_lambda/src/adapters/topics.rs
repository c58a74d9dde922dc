use inventory_core::{AlertMessage, TopicRef};

use crate::adapters::ServiceError;

pub trait TopicService {
    fn list_topics(&self) -> Result<Vec<TopicRef>, ServiceError>;

    fn publish(&self, topic: &TopicRef, alert: &AlertMessage) -> Result<(), ServiceError>;
}
