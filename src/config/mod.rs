mod lookup_config;

pub use lookup_config::{HighFrequencyPolicy, LookupConfig, LOOKUP_CONFIG_FILE};
