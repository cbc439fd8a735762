/// Configuration of one [`MockController`](crate::MockController).
///
/// Use the builder methods to customize, or [`Default`] for sensible defaults.
///
/// # Examples
///
/// ```rust
/// use understudy::MockConfig;
///
/// let config = MockConfig::default()
///     .with_name("payment-gateway")   // Shown in logs and failure messages
///     .with_ledger_capacity(256);     // Calls reserved up front
/// assert_eq!(config.name(), "payment-gateway");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MockConfig {
    /// Label of the mocked instance.
    /// Prefixed to reported failure messages and attached to log events.
    /// Default: "mock"
    name: String,

    /// Number of invocation records reserved when the ledger is created.
    /// The ledger grows past it as needed.
    /// Default: 32
    ledger_capacity: usize,
}

impl Default for MockConfig {
    fn default() -> Self {
        MockConfig {
            name: "mock".to_owned(),
            ledger_capacity: 32,
        }
    }
}

impl MockConfig {
    /// Set the label of the mocked instance.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Returns the label of the mocked instance.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the initial capacity of the call ledger.
    pub fn with_ledger_capacity(mut self, capacity: usize) -> Self {
        self.ledger_capacity = capacity;
        self
    }

    /// Returns the initial capacity of the call ledger.
    pub fn ledger_capacity(&self) -> usize {
        self.ledger_capacity
    }
}
