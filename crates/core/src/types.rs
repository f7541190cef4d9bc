/// Item primary keys are PostgreSQL UUIDs.
pub type ItemId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
