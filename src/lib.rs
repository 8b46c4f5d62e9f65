pub mod core {
    pub mod config;
    pub mod error;
    pub mod state;
    pub mod routes;
    pub mod startup;
    pub mod tracing_init;
}

pub mod models {
    pub mod admin;
    pub mod group;
    pub mod record;
    pub mod user;
}

pub mod stores {
    pub mod document_store;
    pub mod memory_store;
    pub mod snapshot_cache;
}

pub mod api {
    pub mod client;
}

pub mod sync {
    pub mod collection_sync;
}

pub mod moderation {
    pub mod confirm;
    pub mod controller;
    pub mod view;
}

pub mod handlers {
    pub mod fallback;
    pub mod groups;
    pub mod health;
    pub mod metrics;
    pub mod users;
    pub mod view;
}

pub mod metrics {
    pub mod collector;
}

pub mod utils {
    pub mod auth;
    pub mod time;
}

#[cfg(test)]
pub(crate) mod testing;
