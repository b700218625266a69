use async_trait::async_trait;
use repsrv_types::Resource;

use crate::error::ServerResult;

/// Which box an activity arrived through.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Outbox,
    Inbox,
}

/// Application side effects for accepted activities.
///
/// Called after an activity has been given its final identifier and before
/// it is stored. Returning an error rejects the activity.
#[async_trait]
pub trait Callbacker: Send + Sync {
    async fn on_activity(&self, direction: Direction, activity: &Resource) -> ServerResult<()>;
}

pub struct NothingCallbacker;

#[async_trait]
impl Callbacker for NothingCallbacker {
    async fn on_activity(&self, _direction: Direction, _activity: &Resource) -> ServerResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn nothing_callbacker_accepts() {
        let activity = Resource::from_value(json!({"type": "Follow"})).unwrap();
        for direction in [Direction::Inbox, Direction::Outbox] {
            NothingCallbacker.on_activity(direction, &activity).await.unwrap();
        }
    }
}
