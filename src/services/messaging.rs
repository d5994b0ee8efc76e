use std::collections::HashMap;

use sqlx::SqlitePool;
use tokio::sync::broadcast;
use tracing::debug;

use crate::db::messages::{self, MessageFilter};
use crate::db::users::{self, UserFilter};
use crate::error::AppError;
use crate::models::{ConversationSummary, Message, NewMessageRequest, User};

const HUB_CAPACITY: usize = 256;

/// Fan-out of newly stored messages to live listeners. Nothing is buffered
/// for listeners that are not connected.
#[derive(Clone)]
pub struct MessageHub {
    tx: broadcast::Sender<Message>,
}

impl MessageHub {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(HUB_CAPACITY);
        Self { tx }
    }

    pub fn publish(&self, message: Message) {
        // Err only means nobody is listening
        if let Ok(listeners) = self.tx.send(message) {
            debug!("message delivered to {} listener(s)", listeners);
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Message> {
        self.tx.subscribe()
    }
}

impl Default for MessageHub {
    fn default() -> Self {
        Self::new()
    }
}

pub async fn send_message(
    db: &SqlitePool,
    hub: &MessageHub,
    req: NewMessageRequest,
) -> Result<Message, AppError> {
    if req.content.trim().is_empty() {
        return Err(AppError::BadRequest("Message content is required".to_string()));
    }

    let message = messages::insert_message(db, req).await?;
    hub.publish(message.clone());
    Ok(message)
}

pub async fn conversations_for_user(
    db: &SqlitePool,
    user_id: i64,
    query: Option<&str>,
) -> Result<Vec<ConversationSummary>, AppError> {
    let people = users::fetch_users(db, &UserFilter::default()).await?;
    let mine = messages::fetch_messages(
        db,
        &MessageFilter {
            user_id: Some(user_id),
            peer_id: None,
        },
    )
    .await?;

    Ok(summarize(user_id, &people, &mine, query))
}

/// One summary per other user. Most recent conversation first; users never
/// messaged keep their id order at the end.
pub fn summarize(
    user_id: i64,
    people: &[User],
    messages: &[Message],
    query: Option<&str>,
) -> Vec<ConversationSummary> {
    let mut last: HashMap<i64, &Message> = HashMap::new();
    let mut unread: HashMap<i64, i64> = HashMap::new();

    for message in messages.iter().filter(|m| m.involves(user_id)) {
        let peer = if message.sender_id == user_id {
            message.receiver_id
        } else {
            message.sender_id
        };
        // messages arrive in insertion order, so the last write wins
        last.insert(peer, message);
        if message.receiver_id == user_id && !message.read {
            *unread.entry(peer).or_insert(0) += 1;
        }
    }

    let needle = query
        .map(|q| q.trim().to_lowercase())
        .filter(|q| !q.is_empty());

    let mut summaries: Vec<(Option<i64>, ConversationSummary)> = people
        .iter()
        .filter(|p| p.id != user_id)
        .map(|p| {
            let latest = last.get(&p.id);
            (
                latest.map(|m| m.id),
                ConversationSummary {
                    peer_id: p.id,
                    peer_name: p.name.clone(),
                    avatar: p.avatar.clone(),
                    last_message: latest.map(|m| m.content.clone()),
                    last_message_time: latest.map(|m| m.timestamp.clone()),
                    unread_count: unread.get(&p.id).copied().unwrap_or(0),
                },
            )
        })
        .filter(|(_, s)| match &needle {
            Some(needle) => {
                s.peer_name.to_lowercase().contains(needle)
                    || s.last_message
                        .as_deref()
                        .is_some_and(|m| m.to_lowercase().contains(needle))
            }
            None => true,
        })
        .collect();

    // newest message id first, then people without messages
    summaries.sort_by(|(a, _), (b, _)| b.cmp(a));
    summaries.into_iter().map(|(_, s)| s).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserRole;
    use sqlx::types::Json;

    fn person(id: i64, name: &str) -> User {
        User {
            id,
            username: name.to_lowercase(),
            email: format!("{}@example.com", id),
            password_hash: String::new(),
            name: name.to_string(),
            role: UserRole::Student,
            avatar: None,
            bio: String::new(),
            expertise: Json(Vec::new()),
            subjects: Json(Vec::new()),
            rating: None,
            hourly_rate: None,
            xp: 0,
            target_xp: 0,
            streak_days: 0,
            created_at: String::new(),
            last_login: None,
        }
    }

    fn message(id: i64, from: i64, to: i64, content: &str, read: bool) -> Message {
        Message {
            id,
            sender_id: from,
            receiver_id: to,
            content: content.to_string(),
            timestamp: format!("2026-01-01T00:00:{:02}Z", id),
            read,
            message_type: None,
        }
    }

    #[test]
    fn test_summaries_order_and_unread() {
        let people = vec![person(1, "Me"), person(2, "Ana"), person(3, "Ben"), person(4, "Cy")];
        let messages = vec![
            message(1, 2, 1, "hey", false),
            message(2, 3, 1, "question about the lab", false),
            message(3, 2, 1, "you there?", false),
            message(4, 1, 3, "sure", false),
        ];

        let summaries = summarize(1, &people, &messages, None);
        let order: Vec<_> = summaries.iter().map(|s| s.peer_id).collect();
        assert_eq!(order, vec![3, 2, 4]);

        assert_eq!(summaries[0].last_message.as_deref(), Some("sure"));
        assert_eq!(summaries[0].unread_count, 1);
        assert_eq!(summaries[1].unread_count, 2);
        assert_eq!(summaries[2].last_message, None);
    }

    #[test]
    fn test_search_matches_name_or_last_message() {
        let people = vec![person(1, "Me"), person(2, "Ana"), person(3, "Ben")];
        let messages = vec![message(1, 3, 1, "Lab tomorrow?", true)];

        let by_name = summarize(1, &people, &messages, Some("an"));
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].peer_id, 2);

        let by_message = summarize(1, &people, &messages, Some("LAB"));
        assert_eq!(by_message.len(), 1);
        assert_eq!(by_message[0].peer_id, 3);
        assert_eq!(by_message[0].unread_count, 0);
    }

    #[tokio::test]
    async fn test_hub_delivers_to_subscribers() {
        let hub = MessageHub::new();
        // publishing without listeners is fine
        hub.publish(message(1, 1, 2, "nobody hears this", false));

        let mut rx = hub.subscribe();
        hub.publish(message(2, 1, 2, "hello", false));

        let received = rx.recv().await.expect("Failed to receive");
        assert_eq!(received.content, "hello");
    }
}
