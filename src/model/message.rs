#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    User(String),
    Narrator(String),
    System(String),
}
