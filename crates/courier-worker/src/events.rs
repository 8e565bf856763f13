#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerEvent {
    MessageSent { id: String, to: String, stored: bool },
    MessagesReceived { count: usize, total: usize },
    StoreFailed { error: String },
}
