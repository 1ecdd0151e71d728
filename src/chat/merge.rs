//! Reconciliation primitives for a single chat's message list.
//!
//! Three sources feed one list: optimistic local sends, realtime pushes, and
//! paginated history fetches. The canonical order is ascending `created_at`;
//! uniqueness is by id with the last write winning. Pending (temp-id) entries
//! are matched to their realtime echo by `client_ref`, falling back to a
//! sender + content + timestamp heuristic for transports that drop the ref.

use std::collections::HashMap;
use std::mem;

use crate::models::message::{Message, MessageId};

/// Widest clock gap allowed when matching a pending send to its echo by
/// heuristic. Two identical sends inside this window would be conflated,
/// which is why `client_ref` matching is tried first.
pub const ECHO_TOLERANCE_SECS: i64 = 5;

/// What `apply_event` did with an incoming message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    /// An entry with the same durable id existed and was updated in place.
    Updated,
    /// The event confirmed a pending optimistic entry, replacing it.
    Confirmed,
    /// No collision; the event was appended as a new entry.
    Appended,
}

/// Stable sort ascending by `created_at`. Stability keeps the relative order
/// of entries with equal timestamps, so ties resolve to insertion order.
pub fn sort_chronological(messages: &mut [Message]) {
    messages.sort_by(|a, b| a.created_at.cmp(&b.created_at));
}

/// Collapse duplicate ids, keeping the latest write for each id at the
/// position of its first occurrence.
pub fn dedup_last_write(messages: Vec<Message>) -> Vec<Message> {
    let mut slots: HashMap<MessageId, usize> = HashMap::with_capacity(messages.len());
    let mut out: Vec<Message> = Vec::with_capacity(messages.len());

    for message in messages {
        match slots.get(&message.id) {
            Some(&index) => out[index] = message,
            None => {
                slots.insert(message.id.clone(), out.len());
                out.push(message);
            }
        }
    }

    out
}

/// Dedup then restore canonical order.
pub fn reconcile(messages: Vec<Message>) -> Vec<Message> {
    let mut out = dedup_last_write(messages);
    sort_chronological(&mut out);
    out
}

/// Merge a fetched history page into the current list. Fetched rows win on
/// id collisions; realtime arrivals and pending entries unique to the
/// current list survive.
pub fn merge_history(current: Vec<Message>, fetched: Vec<Message>) -> Vec<Message> {
    let mut combined = current;
    combined.extend(fetched);
    reconcile(combined)
}

/// True when `incoming` is the durable confirmation of the pending local
/// entry `pending`.
pub fn matches_pending_echo(pending: &Message, incoming: &Message) -> bool {
    if !pending.id.is_local() || incoming.id.is_local() {
        return false;
    }
    if let (Some(a), Some(b)) = (&pending.client_ref, &incoming.client_ref) {
        return a == b;
    }
    pending.sender_id == incoming.sender_id
        && pending.content == incoming.content
        && (incoming.created_at - pending.created_at)
            .num_seconds()
            .abs()
            <= ECHO_TOLERANCE_SECS
}

/// Apply one realtime event to the list:
/// 1. same durable id present: update in place, never insert a duplicate;
/// 2. a pending entry matches: the event is its confirmation, replace it;
/// 3. otherwise append;
/// then dedup (last write per id wins) and re-sort the whole list.
pub fn apply_event(messages: &mut Vec<Message>, incoming: Message) -> EventOutcome {
    let outcome = if let Some(existing) = messages.iter_mut().find(|m| m.id == incoming.id) {
        update_in_place(existing, &incoming);
        EventOutcome::Updated
    } else if let Some(position) = messages
        .iter()
        .position(|m| matches_pending_echo(m, &incoming))
    {
        messages[position] = incoming;
        EventOutcome::Confirmed
    } else {
        messages.push(incoming);
        EventOutcome::Appended
    };

    *messages = reconcile(mem::take(messages));
    outcome
}

/// Apply an event's mutable fields onto the existing entry. `created_at`
/// stays put so the entry keeps its sort position.
pub fn update_in_place(existing: &mut Message, incoming: &Message) {
    existing.content = incoming.content.clone();
    existing.reactions = incoming.reactions.clone();
    existing.reply_to_id = incoming.reply_to_id.clone();
    existing.edited_at = incoming.edited_at;
    existing.deleted_at = incoming.deleted_at;
    existing.is_read = incoming.is_read;
    existing.updated_at = incoming.updated_at;
}

/// Replace the entry with `updated.id` in place, preserving list order.
/// Returns false when no such entry exists.
pub fn splice_by_id(messages: &mut [Message], updated: Message) -> bool {
    match messages.iter_mut().find(|m| m.id == updated.id) {
        Some(slot) => {
            *slot = updated;
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use std::collections::HashMap;
    use uuid::Uuid;

    use crate::models::message::MessageKind;

    fn base_time() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 10, 9, 0, 0).unwrap()
    }

    fn msg(id: &str, sender: Uuid, content: &str, offset_secs: i64) -> Message {
        let at = base_time() + Duration::seconds(offset_secs);
        Message {
            id: MessageId::from(id),
            chat_id: Uuid::nil(),
            sender_id: sender,
            content: content.into(),
            kind: MessageKind::Text,
            file_url: None,
            is_read: false,
            created_at: at,
            updated_at: at,
            reactions: None,
            reply_to_id: None,
            edited_at: None,
            deleted_at: None,
            client_ref: None,
        }
    }

    fn pending(sender: Uuid, content: &str, offset_secs: i64, client_ref: Option<&str>) -> Message {
        let mut m = msg("ignored", sender, content, offset_secs);
        m.id = MessageId::local();
        m.client_ref = client_ref.map(str::to_string);
        m
    }

    #[test]
    fn test_dedup_keeps_last_write_per_id() {
        let sender = Uuid::new_v4();
        let mut newer = msg("m1", sender, "edited", 0);
        newer.edited_at = Some(base_time());

        let out = dedup_last_write(vec![msg("m1", sender, "original", 0), newer]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].content, "edited");
    }

    #[test]
    fn test_reconcile_sorts_non_decreasing() {
        let sender = Uuid::new_v4();
        let out = reconcile(vec![
            msg("m3", sender, "c", 20),
            msg("m1", sender, "a", 0),
            msg("m2", sender, "b", 10),
        ]);
        let times: Vec<_> = out.iter().map(|m| m.created_at).collect();
        assert!(times.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(out[0].content, "a");
    }

    #[test]
    fn test_equal_timestamps_keep_insertion_order() {
        let sender = Uuid::new_v4();
        let out = reconcile(vec![
            msg("m1", sender, "first", 0),
            msg("m2", sender, "second", 0),
        ]);
        assert_eq!(out[0].content, "first");
        assert_eq!(out[1].content, "second");
    }

    #[test]
    fn test_echo_match_by_client_ref() {
        let sender = Uuid::new_v4();
        let local = pending(sender, "hello", 0, Some("ref-1"));
        // Content differs (server may normalize); the ref still binds them.
        let mut echo = msg("m1", sender, "hello ", 1);
        echo.client_ref = Some("ref-1".into());

        assert!(matches_pending_echo(&local, &echo));
    }

    #[test]
    fn test_echo_ref_mismatch_rejected() {
        let sender = Uuid::new_v4();
        let local = pending(sender, "hello", 0, Some("ref-1"));
        let mut echo = msg("m1", sender, "hello", 0);
        echo.client_ref = Some("ref-2".into());

        assert!(!matches_pending_echo(&local, &echo));
    }

    #[test]
    fn test_echo_heuristic_within_tolerance() {
        let sender = Uuid::new_v4();
        let local = pending(sender, "hello", 0, None);

        let near = msg("m1", sender, "hello", ECHO_TOLERANCE_SECS);
        assert!(matches_pending_echo(&local, &near));

        let far = msg("m1", sender, "hello", ECHO_TOLERANCE_SECS + 1);
        assert!(!matches_pending_echo(&local, &far));

        let other_sender = msg("m1", Uuid::new_v4(), "hello", 0);
        assert!(!matches_pending_echo(&local, &other_sender));
    }

    #[test]
    fn test_durable_entries_never_match_as_pending() {
        let sender = Uuid::new_v4();
        let durable = msg("m1", sender, "hello", 0);
        let echo = msg("m2", sender, "hello", 0);
        assert!(!matches_pending_echo(&durable, &echo));
    }

    #[test]
    fn test_apply_event_confirms_pending_exactly_once() {
        let sender = Uuid::new_v4();
        let mut list = vec![pending(sender, "hi", 0, Some("ref-1"))];

        let mut echo = msg("m1", sender, "hi", 1);
        echo.client_ref = Some("ref-1".into());

        assert_eq!(apply_event(&mut list, echo.clone()), EventOutcome::Confirmed);
        assert_eq!(list.len(), 1);
        assert!(!list[0].id.is_local());

        // Redelivery of the same event is an update, not a duplicate.
        assert_eq!(apply_event(&mut list, echo), EventOutcome::Updated);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_apply_event_updates_in_place_at_original_position() {
        let sender = Uuid::new_v4();
        let mut list = vec![
            msg("m1", sender, "a", 0),
            msg("m2", sender, "b", 10),
            msg("m3", sender, "c", 20),
        ];

        let mut update = msg("m2", sender, "b", 10);
        update.reactions = Some(HashMap::from([(
            "like".to_string(),
            vec![Uuid::new_v4()],
        )]));

        assert_eq!(apply_event(&mut list, update), EventOutcome::Updated);
        assert_eq!(list.len(), 3);
        assert_eq!(list[1].id, MessageId::from("m2"));
        assert!(list[1].reactions.is_some());
    }

    #[test]
    fn test_apply_event_appends_and_resorts() {
        let sender = Uuid::new_v4();
        let mut list = vec![msg("m2", sender, "b", 10)];

        assert_eq!(
            apply_event(&mut list, msg("m1", sender, "a", 0)),
            EventOutcome::Appended
        );
        assert_eq!(list[0].id, MessageId::from("m1"));
        assert_eq!(list[1].id, MessageId::from("m2"));
    }

    #[test]
    fn test_merge_history_keeps_realtime_and_pending_entries() {
        let sender = Uuid::new_v4();
        let current = vec![
            msg("m2", sender, "stale copy", 10),
            msg("m9", sender, "realtime arrival", 90),
            pending(sender, "unsent", 95, Some("ref-9")),
        ];
        let fetched = vec![
            msg("m1", sender, "a", 0),
            msg("m2", sender, "fresh copy", 10),
        ];

        let out = merge_history(current, fetched);
        assert_eq!(out.len(), 4);
        assert_eq!(out[1].content, "fresh copy");
        assert!(out.iter().any(|m| m.id.is_local()));
        assert!(out.iter().any(|m| m.id == MessageId::from("m9")));
    }

    #[test]
    fn test_splice_preserves_order() {
        let sender = Uuid::new_v4();
        let mut list = vec![
            msg("m1", sender, "a", 0),
            msg("m2", sender, "b", 10),
        ];
        let mut edited = msg("m2", sender, "b (edited)", 10);
        edited.edited_at = Some(base_time());

        assert!(splice_by_id(&mut list, edited));
        assert_eq!(list[1].content, "b (edited)");
        assert!(!splice_by_id(&mut list, msg("m7", sender, "x", 0)));
    }
}
