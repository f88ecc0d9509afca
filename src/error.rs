//! Error types for ring buffer and channel operations.
//!
//! 环形缓冲区与通道操作的错误类型。
//!
//! Full and empty are routine outcomes on the hot path, so every error that rejects a
//! value hands it back to the caller instead of dropping it.

use thiserror::Error;

/// Ring buffer error for push operations
///
/// push 操作的环形缓冲区错误
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushError<T> {
    /// Every slot holds an unconsumed value
    ///
    /// 所有槽位都持有未消费的值
    #[error("ring buffer is full")]
    Full(T),
}

impl<T> PushError<T> {
    /// Recover the value that could not be pushed
    ///
    /// 取回未能推送的值
    #[inline]
    pub fn into_inner(self) -> T {
        match self {
            PushError::Full(value) => value,
        }
    }
}

/// Ring buffer error for pop operations
///
/// pop 操作的环形缓冲区错误
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopError {
    /// No slot holds a published value
    ///
    /// 没有槽位持有已发布的值
    #[error("ring buffer is empty")]
    Empty,
}

/// Error returned by [`Sender`](crate::channel::Sender) operations
///
/// [`Sender`](crate::channel::Sender) 操作返回的错误
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendError<T> {
    /// The buffer is full (non-waiting send)
    #[error("sending on a full channel")]
    Full(T),

    /// No slot became free before the deadline
    #[error("timed out waiting on a full channel")]
    Timeout(T),

    /// Every receiver has been dropped
    #[error("sending on a disconnected channel")]
    Disconnected(T),
}

impl<T> SendError<T> {
    /// Recover the value that could not be sent
    ///
    /// 取回未能发送的值
    #[inline]
    pub fn into_inner(self) -> T {
        match self {
            SendError::Full(value) | SendError::Timeout(value) | SendError::Disconnected(value) => value,
        }
    }

    #[inline]
    pub fn is_disconnected(&self) -> bool {
        matches!(self, SendError::Disconnected(_))
    }
}

impl<T> From<PushError<T>> for SendError<T> {
    fn from(err: PushError<T>) -> Self {
        SendError::Full(err.into_inner())
    }
}

/// Error returned by [`Receiver`](crate::channel::Receiver) operations
///
/// [`Receiver`](crate::channel::Receiver) 操作返回的错误
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecvError {
    /// The buffer is empty (non-waiting receive)
    #[error("receiving on an empty channel")]
    Empty,

    /// Nothing was published before the deadline
    #[error("timed out waiting on an empty channel")]
    Timeout,

    /// The buffer is drained and every sender has been dropped
    #[error("receiving on an empty and disconnected channel")]
    Disconnected,
}

impl RecvError {
    #[inline]
    pub fn is_disconnected(&self) -> bool {
        matches!(self, RecvError::Disconnected)
    }
}

impl From<PopError> for RecvError {
    fn from(_: PopError) -> Self {
        RecvError::Empty
    }
}
