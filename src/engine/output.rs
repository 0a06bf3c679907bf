//! Eventual values of provider-managed resources.

use crate::error::DeployError;
use futures::future::{self, BoxFuture, FutureExt, Shared};
use std::future::Future;
use std::sync::Arc;

/// Errors are shared between every dependant of a failed value.
pub type SharedResult<T> = Result<T, Arc<DeployError>>;

/// Read-only handle to a value the provider resolves later.
///
/// Nothing runs until some handle is awaited; the underlying operation then
/// runs once and every clone and dependant sees the same result.
pub struct Output<T: Clone> {
    inner: Shared<BoxFuture<'static, SharedResult<T>>>,
}

impl<T: Clone> Clone for Output<T> {
    fn clone(&self) -> Self {
        Output {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Output<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new<F>(fut: F) -> Output<T>
    where
        F: Future<Output = Result<T, DeployError>> + Send + 'static,
    {
        Self::from_shared(fut.map(|res| res.map_err(Arc::new)))
    }

    fn from_shared<F>(fut: F) -> Output<T>
    where
        F: Future<Output = SharedResult<T>> + Send + 'static,
    {
        Output {
            inner: fut.boxed().shared(),
        }
    }

    /// Already-known value.
    pub fn ready(value: T) -> Output<T> {
        Self::from_shared(future::ready(Ok(value)))
    }

    /// Synchronous projection.
    pub fn map<U, F>(&self, f: F) -> Output<U>
    where
        U: Clone + Send + Sync + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        let upstream = self.inner.clone();
        Output::from_shared(async move { upstream.await.map(f) })
    }

    /// Asynchronous continuation, run once the value is available.
    pub fn apply<U, F, Fut>(&self, f: F) -> Output<U>
    where
        U: Clone + Send + Sync + 'static,
        F: FnOnce(T) -> Fut + Send + 'static,
        Fut: Future<Output = Result<U, DeployError>> + Send + 'static,
    {
        let upstream = self.inner.clone();
        Output::from_shared(async move {
            let value = upstream.await?;
            f(value).await.map_err(Arc::new)
        })
    }

    /// Both values, once both are available.
    pub fn zip<U>(&self, other: &Output<U>) -> Output<(T, U)>
    where
        U: Clone + Send + Sync + 'static,
    {
        let left = self.inner.clone();
        let right = other.inner.clone();
        Output::from_shared(async move {
            let (left, right) = future::join(left, right).await;
            Ok::<_, Arc<DeployError>>((left?, right?))
        })
    }

    /// Drive the value to completion.
    pub async fn resolve(&self) -> SharedResult<T> {
        self.inner.clone().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_apply_chain() {
        let name = Output::ready("test-ghes-pulumi".to_string());
        let upper = name.apply(|n| async move { Ok::<_, DeployError>(n.to_uppercase()) });
        let len = upper.map(|n| n.len());

        assert_eq!(upper.resolve().await.unwrap(), "TEST-GHES-PULUMI");
        assert_eq!(len.resolve().await.unwrap(), 16);
    }

    #[tokio::test]
    async fn test_runs_once_and_lazily() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let value = Output::new(async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok::<_, DeployError>(42u32)
        });
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let a = value.map(|v| v + 1);
        let b = value.map(|v| v * 2);
        assert_eq!(a.zip(&b).resolve().await.unwrap(), (43, 84));
        assert_eq!(value.resolve().await.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_error_propagates_and_skips_continuation() {
        let ran = Arc::new(AtomicUsize::new(0));
        let flag = ran.clone();
        let failed: Output<String> = Output::new(async {
            Err::<String, _>(DeployError::InvalidDeployment("boom".to_string()))
        });
        let dependant = failed.apply(move |v| async move {
            flag.fetch_add(1, Ordering::SeqCst);
            Ok::<_, DeployError>(v)
        });

        let err = dependant.resolve().await.unwrap_err();
        assert!(matches!(*err, DeployError::InvalidDeployment(_)));
        assert_eq!(ran.load(Ordering::SeqCst), 0);

        let zipped = Output::ready(1u8).zip(&failed);
        assert!(zipped.resolve().await.is_err());
    }
}
