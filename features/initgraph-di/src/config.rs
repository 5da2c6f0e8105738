/// Order in which closeable values are torn down
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TeardownOrder {
    /// A value is closed only after everything depending on it has been closed,
    /// independent values are closed concurrently
    #[default]
    ReverseDependency,
    /// Every value is closed concurrently, without regard to dependencies
    Concurrent,
}

/// Options of a [`Container`](crate::Container)
#[derive(Debug, Clone, Default)]
pub struct ContainerConfig {
    pub teardown_order: TeardownOrder,
}
impl ContainerConfig {
    pub fn teardown_order(mut self, order: TeardownOrder) -> Self {
        self.teardown_order = order;
        self
    }
}
