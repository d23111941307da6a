mod persistent_defaults;

pub use persistent_defaults::PersistentDefaults;
