use dashmap::DashMap;
use uuid::Uuid;

use crate::models::directory::{Branch, Customer};

/// Read-mostly lookup tables for entities owned by other subsystems
/// (accounts, catalog). This service only resolves references against them.
pub struct Directory {
    customers: DashMap<Uuid, Customer>,
    branches: DashMap<Uuid, Branch>,
}

impl Directory {
    pub fn new() -> Self {
        Self {
            customers: DashMap::new(),
            branches: DashMap::new(),
        }
    }

    pub fn upsert_customer(&self, customer: Customer) {
        self.customers.insert(customer.id, customer);
    }

    pub fn upsert_branch(&self, branch: Branch) {
        self.branches.insert(branch.id, branch);
    }

    pub fn customer(&self, id: Uuid) -> Option<Customer> {
        self.customers.get(&id).map(|entry| entry.value().clone())
    }

    pub fn branch(&self, id: Uuid) -> Option<Branch> {
        self.branches.get(&id).map(|entry| entry.value().clone())
    }
}

impl Default for Directory {
    fn default() -> Self {
        Self::new()
    }
}
