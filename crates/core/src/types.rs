/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Identifier of a gift-exchange event.
pub type EventId = DbId;

/// Identifier of a user. A participant is identified by the user id of the
/// member within one event.
pub type UserId = DbId;
