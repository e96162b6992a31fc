// DANS : src/state/pool_cache.rs

use anyhow::Result;
use solana_sdk::pubkey::Pubkey;
use std::future::Future;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

#[derive(Debug)]
struct CacheEntry<T> {
    data: Arc<T>,
    address: Pubkey,
    inserted_at: Instant,
}

impl<T> CacheEntry<T> {
    fn is_valid(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.inserted_at) < ttl
    }
}

/// Emplacement de cache unique pour le descripteur de pool d'une venue.
///
/// Ce n'est pas un cache par clé : une venue = un pool. Une lecture dans la
/// fenêtre `ttl` renvoie l'entrée courante même si l'adresse demandée diffère
/// (on le signale seulement dans les logs). Le descripteur est remplacé en
/// bloc, jamais modifié en place.
///
/// Le temps est passé explicitement (`now`) pour que l'expiration soit testable.
pub struct PoolSlot<T> {
    venue: &'static str,
    ttl: Duration,
    entry: RwLock<Option<CacheEntry<T>>>,
}

impl<T> PoolSlot<T> {
    pub fn new(venue: &'static str, ttl: Duration) -> Self {
        Self { venue, ttl, entry: RwLock::new(None) }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Entrée courante si elle est encore fraîche à `now`.
    pub fn get(&self, address: &Pubkey, now: Instant) -> Option<Arc<T>> {
        let reader = self.entry.read().unwrap_or_else(|e| e.into_inner());
        let entry = reader.as_ref().filter(|entry| entry.is_valid(now, self.ttl))?;
        if entry.address != *address {
            warn!(
                venue = self.venue,
                requested = %address,
                cached = %entry.address,
                "[Cache] Adresse demandée différente du pool en cache ; l'entrée en cache est renvoyée."
            );
        }
        Some(entry.data.clone())
    }

    pub fn put(&self, address: Pubkey, value: T, now: Instant) -> Arc<T> {
        let data = Arc::new(value);
        let mut writer = self.entry.write().unwrap_or_else(|e| e.into_inner());
        *writer = Some(CacheEntry { data: data.clone(), address, inserted_at: now });
        data
    }

    /// Renvoie l'entrée fraîche, ou appelle `fetch` et stocke son résultat.
    /// Un échec de `fetch` laisse l'emplacement tel quel.
    pub async fn get_or_try_fetch<F, Fut>(&self, address: &Pubkey, now: Instant, fetch: F) -> Result<Arc<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(hit) = self.get(address, now) {
            debug!(venue = self.venue, "[Cache] HIT pool.");
            return Ok(hit);
        }
        debug!(venue = self.venue, pool = %address, "[Cache] MISS pool, fetch RPC...");
        let fresh = fetch().await?;
        Ok(self.put(*address, fresh, now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const TTL: Duration = Duration::from_millis(60_000);

    async fn fetch_counted(slot: &PoolSlot<String>, address: &Pubkey, now: Instant, calls: &AtomicUsize) -> Arc<String> {
        slot.get_or_try_fetch(address, now, || async {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("pool#{}", n))
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn entry_is_reused_until_ttl_then_refetched() {
        let slot = PoolSlot::new("test", TTL);
        let address = Pubkey::new_unique();
        let calls = AtomicUsize::new(0);
        let t0 = Instant::now();

        let first = fetch_counted(&slot, &address, t0, &calls).await;
        let just_before = fetch_counted(&slot, &address, t0 + TTL - Duration::from_millis(1), &calls).await;
        assert!(Arc::ptr_eq(&first, &just_before));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let after = fetch_counted(&slot, &address, t0 + TTL + Duration::from_millis(1), &calls).await;
        assert!(!Arc::ptr_eq(&first, &after));
        assert_eq!(*after, "pool#1");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn expiry_is_exclusive_at_exactly_ttl() {
        let slot = PoolSlot::new("test", TTL);
        let address = Pubkey::new_unique();
        let t0 = Instant::now();
        slot.put(address, "a".to_string(), t0);
        assert!(slot.get(&address, t0 + TTL).is_none());
    }

    #[test]
    fn hit_ignores_requested_address() {
        let slot = PoolSlot::new("test", TTL);
        let cached = Pubkey::new_unique();
        let t0 = Instant::now();
        slot.put(cached, "cached".to_string(), t0);
        let other = slot.get(&Pubkey::new_unique(), t0).unwrap();
        assert_eq!(*other, "cached");
    }

    #[tokio::test]
    async fn failed_fetch_keeps_slot_empty() {
        let slot: PoolSlot<String> = PoolSlot::new("test", TTL);
        let address = Pubkey::new_unique();
        let t0 = Instant::now();
        let err = slot
            .get_or_try_fetch(&address, t0, || async { Err(anyhow!("rpc down")) })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "rpc down");
        assert!(slot.get(&address, t0).is_none());
    }
}
