//! Configuration for loader invocations.

/// Tuning knobs shared by the loader strategies.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Capacity of the channel between a driver task and its consumer.
    ///
    /// A slow consumer applies backpressure to the driver once this many
    /// emissions are buffered; the one-shot strategies never need more
    /// than two slots.
    pub channel_capacity: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 8,
        }
    }
}

impl LoaderConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the driver channel capacity (clamped to at least one slot).
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = LoaderConfig::new().with_channel_capacity(2);
        assert_eq!(config.channel_capacity, 2);
    }

    #[test]
    fn test_capacity_is_clamped() {
        let config = LoaderConfig::new().with_channel_capacity(0);
        assert_eq!(config.channel_capacity, 1);
    }
}
