// Crate entry point. Declares the modules so the binary and the tests can reach them.
//
// Responsibilities
// - Only declare and expose modules. No logic here.
//
// How it is used
// - `main.rs` composes an `InventoryClient` from `shell`.
// - Integration tests under `tests/` import the store, notifier and adapters from here.

pub mod config;

pub mod core {
    pub mod alert_event;
    pub mod credential;
    pub mod inventory_record;
    pub mod ports;
    pub mod threshold;
    pub mod transaction;
}

pub mod application {
    pub mod errors;
    pub mod item_store;
    pub mod notification_log;
    pub mod notification_settings;
    pub mod persisted;
    pub mod session;
    pub mod threshold_notifier;
}

pub mod adapters {
    pub mod file {
        pub mod json_file_store;
    }
    pub mod in_memory {
        pub mod in_memory_authenticator;
        pub mod in_memory_gateway;
        pub mod in_memory_key_value_store;
        pub mod in_memory_notification_center;
    }
    pub mod wire;
}

pub mod shell;
