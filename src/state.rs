use crate::observability::metrics::Metrics;
use crate::realtime::{EventBroadcaster, OrderEvent};
use crate::store::directory::Directory;
use crate::store::fees::FeeConfigStore;
use crate::store::orders::OrderStore;

pub struct AppState {
    pub orders: OrderStore,
    pub fee_configs: FeeConfigStore,
    pub directory: Directory,
    pub broadcaster: EventBroadcaster,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(room_buffer_size: usize) -> Self {
        Self {
            orders: OrderStore::new(),
            fee_configs: FeeConfigStore::new(),
            directory: Directory::new(),
            broadcaster: EventBroadcaster::new(room_buffer_size),
            metrics: Metrics::new(),
        }
    }

    /// Fire-and-forget fan-out with the emission counter bumped alongside.
    pub fn emit(&self, room: &str, event: OrderEvent) {
        self.metrics
            .events_emitted_total
            .with_label_values(&[event.name()])
            .inc();
        self.broadcaster.emit(room, event);
    }
}
