//! `ConversationStore` over process-local maps.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::ports::{ConversationStore, ConversationStoreError, HistoryPage};
use crate::domain::vet::{ConversationRecord, Feedback};

/// Conversation history per session plus received feedback. Unbounded.
#[derive(Debug, Default)]
pub struct InMemoryConversationStore {
    sessions: RwLock<HashMap<Uuid, Vec<ConversationRecord>>>,
    feedback: RwLock<Vec<Feedback>>,
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn save(&self, record: ConversationRecord) -> Result<(), ConversationStoreError> {
        self.sessions
            .write()
            .await
            .entry(record.session_id)
            .or_default()
            .push(record);
        Ok(())
    }

    async fn history(
        &self,
        session_id: Uuid,
        offset: usize,
        limit: Option<usize>,
    ) -> Result<HistoryPage, ConversationStoreError> {
        let sessions = self.sessions.read().await;
        let Some(records) = sessions.get(&session_id) else {
            return Ok(HistoryPage {
                records: Vec::new(),
                total: 0,
            });
        };
        let total = records.len();
        let window = records.iter().skip(offset);
        let records = match limit {
            Some(limit) => window.take(limit).cloned().collect(),
            None => window.cloned().collect(),
        };
        Ok(HistoryPage { records, total })
    }

    async fn clear(&self, session_id: Uuid) -> Result<(), ConversationStoreError> {
        self.sessions.write().await.remove(&session_id);
        Ok(())
    }

    async fn session_count(&self) -> Result<usize, ConversationStoreError> {
        Ok(self.sessions.read().await.len())
    }

    async fn save_feedback(&self, feedback: Feedback) -> Result<(), ConversationStoreError> {
        self.feedback.write().await.push(feedback);
        Ok(())
    }

    async fn feedback_count(&self) -> Result<usize, ConversationStoreError> {
        Ok(self.feedback.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::vet::PetContext;
    use crate::domain::{Language, Species, Urgency};
    use chrono::Utc;
    use rstest::{fixture, rstest};

    fn record(session_id: Uuid, n: usize) -> ConversationRecord {
        ConversationRecord {
            id: Uuid::new_v4(),
            session_id,
            query: format!("question {n}"),
            response: format!("answer {n}"),
            species: Species::Cat,
            language: Language::English,
            confidence: 0.8,
            sources: Vec::new(),
            urgency: Urgency::Low,
            timestamp: Utc::now(),
            processing_time_ms: 5,
            user_context: PetContext::default(),
        }
    }

    #[fixture]
    fn session() -> Uuid {
        Uuid::new_v4()
    }

    async fn filled(session: Uuid, count: usize) -> InMemoryConversationStore {
        let store = InMemoryConversationStore::default();
        for n in 0..count {
            store.save(record(session, n)).await.expect("save");
        }
        store
    }

    #[rstest]
    #[case(0, Some(2), vec!["question 0", "question 1"])]
    #[case(3, Some(10), vec!["question 3", "question 4"])]
    #[case(1, None, vec!["question 1", "question 2", "question 3", "question 4"])]
    #[case(7, Some(2), vec![])]
    #[tokio::test]
    async fn history_slices_by_offset_and_limit(
        session: Uuid,
        #[case] offset: usize,
        #[case] limit: Option<usize>,
        #[case] expected: Vec<&str>,
    ) {
        let store = filled(session, 5).await;
        let page = store.history(session, offset, limit).await.expect("history");
        let queries: Vec<_> = page.records.iter().map(|r| r.query.as_str()).collect();
        assert_eq!(queries, expected);
        assert_eq!(page.total, 5);
    }

    #[rstest]
    #[tokio::test]
    async fn clear_forgets_session(session: Uuid) {
        let store = filled(session, 2).await;
        assert_eq!(store.session_count().await.expect("count"), 1);
        store.clear(session).await.expect("clear");
        let page = store.history(session, 0, None).await.expect("history");
        assert!(page.records.is_empty());
        assert_eq!(store.session_count().await.expect("count"), 0);
    }

    #[rstest]
    #[tokio::test]
    async fn total_counts_only_the_requested_session(session: Uuid) {
        let store = filled(session, 3).await;
        let other = Uuid::new_v4();
        store.save(record(other, 0)).await.expect("save");
        let page = store.history(session, 2, Some(1)).await.expect("history");
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.total, 3);
        let empty = store.history(Uuid::new_v4(), 0, None).await.expect("history");
        assert_eq!(empty.total, 0);
    }
}
