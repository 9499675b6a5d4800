use std::collections::HashMap;
use std::sync::RwLock;

use uuid::Uuid;

use crate::error::AppError;
use crate::models::fee::DeliveryFeeConfig;

/// Fee-config table. Unlike orders, activation touches every document
/// (deactivate others + write the new one), so the table sits behind one
/// `RwLock` and the whole activation runs inside a single write section.
/// Readers can never observe zero or two active configs.
pub struct FeeConfigStore {
    configs: RwLock<HashMap<Uuid, DeliveryFeeConfig>>,
}

impl FeeConfigStore {
    pub fn new() -> Self {
        Self {
            configs: RwLock::new(HashMap::new()),
        }
    }

    pub fn active(&self) -> Option<DeliveryFeeConfig> {
        let configs = self.configs.read().unwrap_or_else(|e| e.into_inner());
        configs.values().find(|cfg| cfg.is_active).cloned()
    }

    pub fn get(&self, id: Uuid) -> Option<DeliveryFeeConfig> {
        let configs = self.configs.read().unwrap_or_else(|e| e.into_inner());
        configs.get(&id).cloned()
    }

    /// All configs, newest first.
    pub fn history(&self) -> Vec<DeliveryFeeConfig> {
        let configs = self.configs.read().unwrap_or_else(|e| e.into_inner());
        let mut all: Vec<DeliveryFeeConfig> = configs.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        all
    }

    /// Inserts a config; if it is active, deactivates every other config in
    /// the same write section.
    pub fn insert(&self, config: DeliveryFeeConfig) {
        let mut configs = self.configs.write().unwrap_or_else(|e| e.into_inner());
        if config.is_active {
            for existing in configs.values_mut() {
                existing.is_active = false;
            }
        }
        configs.insert(config.id, config);
    }

    /// Replaces an existing config, preserving the single-active invariant.
    pub fn replace(&self, config: DeliveryFeeConfig) -> Result<DeliveryFeeConfig, AppError> {
        let mut configs = self.configs.write().unwrap_or_else(|e| e.into_inner());
        if !configs.contains_key(&config.id) {
            return Err(AppError::NotFound(format!(
                "delivery fee configuration {} not found",
                config.id
            )));
        }
        if config.is_active {
            for (id, existing) in configs.iter_mut() {
                if *id != config.id {
                    existing.is_active = false;
                }
            }
        }
        configs.insert(config.id, config.clone());
        Ok(config)
    }

    pub fn active_count(&self) -> usize {
        let configs = self.configs.read().unwrap_or_else(|e| e.into_inner());
        configs.values().filter(|cfg| cfg.is_active).count()
    }
}

impl Default for FeeConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::FeeConfigStore;
    use crate::models::fee::{DeliveryFeeConfig, FeeSlab};

    fn config(active: bool) -> DeliveryFeeConfig {
        DeliveryFeeConfig {
            id: Uuid::new_v4(),
            slabs: vec![FeeSlab {
                min_order_value: 0.0,
                max_order_value: None,
                base_fee: 20.0,
                percentage_fee: 0.05,
                description: "flat".to_string(),
            }],
            partner_earnings_percentage: 0.8,
            is_active: active,
            created_by: "admin".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn activating_a_new_config_deactivates_the_previous_one() {
        let store = FeeConfigStore::new();
        let first = config(true);
        store.insert(first.clone());

        let second = config(true);
        store.insert(second.clone());

        assert_eq!(store.active_count(), 1);
        assert_eq!(store.active().unwrap().id, second.id);
        assert!(!store.get(first.id).unwrap().is_active);
    }

    #[test]
    fn inactive_insert_leaves_active_config_alone() {
        let store = FeeConfigStore::new();
        let active = config(true);
        store.insert(active.clone());
        store.insert(config(false));

        assert_eq!(store.active().unwrap().id, active.id);
    }

    #[test]
    fn concurrent_activations_never_leave_two_active() {
        let store = std::sync::Arc::new(FeeConfigStore::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || store.insert(config(true)))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(store.active_count(), 1);
    }
}
