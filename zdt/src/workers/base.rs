use std::future::Future;

/// A trait for types that can be started as workers.
///
/// The generic parameter `H` is the handle returned once the worker runs in the background.
pub trait Worker<H>
where
    H: WorkerHandle,
{
    /// Spawns the worker and returns the handle controlling it.
    ///
    /// Must be called from within a tokio runtime.
    fn start(self) -> H;
}

/// A handle to a running worker.
pub trait WorkerHandle {
    /// The terminal outcome the worker publishes when it exits.
    type Output;

    /// Returns whether the worker task has already exited.
    fn is_finished(&self) -> bool;

    /// Returns a future that resolves once the worker task has terminated, yielding its
    /// terminal outcome.
    ///
    /// The outcome is only read after the task has been joined, so it always reflects the final
    /// state of the worker.
    fn wait(self) -> impl Future<Output = Self::Output> + Send;
}
