use std::sync::Arc;

use crate::case::{CaseReference, JurisdictionShard};
use crate::ports::case_search::{CaseSearchError, CaseSearchQuery, CaseSearchStore};

/// Runs one structured query per shard in the fixed
/// [`JurisdictionShard::SEARCH_ORDER`] and stops at the first shard with a
/// hit. Transport failures propagate unretried; the caller owns retry policy
/// for the whole two-shard sequence.
#[derive(Clone)]
pub struct ShardedCaseSearch {
    store: Arc<dyn CaseSearchStore>,
}

impl ShardedCaseSearch {
    pub fn new(store: Arc<dyn CaseSearchStore>) -> Self {
        Self { store }
    }

    /// First case of the first non-empty shard result. Criteria are expected
    /// to be selective enough that one match is normal; extra matches are not
    /// an error and the first is authoritative.
    pub async fn find_case(
        &self,
        user_token: &str,
        query: &CaseSearchQuery,
    ) -> Result<Option<CaseReference>, CaseSearchError> {
        for shard in JurisdictionShard::SEARCH_ORDER {
            let result = self.store.search(user_token, shard, query).await?;
            if let Some(case) = result.cases.into_iter().next() {
                return Ok(Some(case));
            }
        }
        Ok(None)
    }

    /// Union of both shards' matches, in shard order.
    pub async fn find_all(
        &self,
        user_token: &str,
        query: &CaseSearchQuery,
    ) -> Result<Vec<CaseReference>, CaseSearchError> {
        let mut merged = Vec::new();
        for shard in JurisdictionShard::SEARCH_ORDER {
            let result = self.store.search(user_token, shard, query).await?;
            merged.extend(result.cases);
        }
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::case_search::CaseSearchResult;
    use crate::ports::BoxFuture;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct ShardCountingStore {
        england_hits: Vec<CaseReference>,
        scotland_hits: Vec<CaseReference>,
        england_calls: AtomicUsize,
        scotland_calls: AtomicUsize,
    }

    impl CaseSearchStore for ShardCountingStore {
        fn search(
            &self,
            _user_token: &str,
            shard: JurisdictionShard,
            _query: &CaseSearchQuery,
        ) -> BoxFuture<'_, Result<CaseSearchResult, CaseSearchError>> {
            Box::pin(async move {
                let cases = match shard {
                    JurisdictionShard::EnglandWales => {
                        self.england_calls.fetch_add(1, Ordering::SeqCst);
                        self.england_hits.clone()
                    }
                    JurisdictionShard::Scotland => {
                        self.scotland_calls.fetch_add(1, Ordering::SeqCst);
                        self.scotland_hits.clone()
                    }
                };
                Ok(CaseSearchResult {
                    total: cases.len() as u64,
                    cases,
                })
            })
        }
    }

    fn case(id: i64, shard: JurisdictionShard) -> CaseReference {
        CaseReference {
            id,
            shard,
            state: "Submitted".to_string(),
        }
    }

    fn query() -> CaseSearchQuery {
        CaseSearchQuery {
            submission_reference: Some("1234567890123456".to_string()),
            ..CaseSearchQuery::default()
        }
    }

    #[tokio::test]
    async fn england_wales_hit_skips_scotland() {
        let store = Arc::new(ShardCountingStore {
            england_hits: vec![case(11, JurisdictionShard::EnglandWales)],
            scotland_hits: vec![case(22, JurisdictionShard::Scotland)],
            ..ShardCountingStore::default()
        });
        let search = ShardedCaseSearch::new(store.clone());

        let found = search.find_case("token", &query()).await.expect("search");
        assert_eq!(found, Some(case(11, JurisdictionShard::EnglandWales)));
        assert_eq!(store.england_calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.scotland_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_england_wales_falls_back_to_scotland() {
        let store = Arc::new(ShardCountingStore {
            scotland_hits: vec![case(1_234_567_890_123_456, JurisdictionShard::Scotland)],
            ..ShardCountingStore::default()
        });
        let search = ShardedCaseSearch::new(store.clone());

        let found = search.find_case("token", &query()).await.expect("search");
        let found = found.expect("scotland match");
        assert_eq!(found.id, 1_234_567_890_123_456);
        assert_eq!(found.shard, JurisdictionShard::Scotland);
        assert_eq!(store.england_calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.scotland_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn both_shards_empty_is_not_found() {
        let store = Arc::new(ShardCountingStore::default());
        let search = ShardedCaseSearch::new(store);
        let found = search.find_case("token", &query()).await.expect("search");
        assert_eq!(found, None);
    }

    #[tokio::test]
    async fn find_all_merges_in_shard_order() {
        let store = Arc::new(ShardCountingStore {
            england_hits: vec![case(1, JurisdictionShard::EnglandWales)],
            scotland_hits: vec![case(2, JurisdictionShard::Scotland)],
            ..ShardCountingStore::default()
        });
        let search = ShardedCaseSearch::new(store);
        let all = search.find_all("token", &query()).await.expect("search");
        assert_eq!(
            all.iter().map(|c| c.id).collect::<Vec<_>>(),
            vec![1, 2]
        );
    }

    #[tokio::test]
    async fn shard_failure_propagates_unretried() {
        struct FailingStore;
        impl CaseSearchStore for FailingStore {
            fn search(
                &self,
                _user_token: &str,
                _shard: JurisdictionShard,
                _query: &CaseSearchQuery,
            ) -> BoxFuture<'_, Result<CaseSearchResult, CaseSearchError>> {
                Box::pin(async { Err(CaseSearchError::Transport("connection reset".into())) })
            }
        }
        let search = ShardedCaseSearch::new(Arc::new(FailingStore));
        let err = search.find_case("token", &query()).await.unwrap_err();
        assert!(matches!(err, CaseSearchError::Transport(_)));
    }
}
