//! Adapter from completion-callback operations to futures.

use tokio::sync::oneshot;

use super::error::ApiError;

/// One-shot completion handle handed to a callback-style operation.
///
/// `resolve` consumes the handle, so an operation can report at most one outcome.
#[derive(Debug)]
pub struct Resolver<T> {
    tx: oneshot::Sender<T>,
}

impl<T> Resolver<T> {
    pub fn resolve(self, value: T) {
        // The awaiting side may have been dropped; there is nobody left to tell.
        let _ = self.tx.send(value);
    }
}

/// Run `operation`, handing it a [`Resolver`], and wait for the outcome it reports.
///
/// Resolves to [`ApiError::Abandoned`] if the resolver is dropped without being used.
pub async fn await_completion<T, Op>(operation: Op) -> Result<T, ApiError>
where
    Op: FnOnce(Resolver<Result<T, ApiError>>),
{
    let (tx, rx) = oneshot::channel();
    operation(Resolver { tx });

    rx.await.unwrap_or(Err(ApiError::Abandoned))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolves_with_reported_value() {
        let outcome = await_completion(|resolver| resolver.resolve(Ok(7))).await;
        assert_eq!(outcome.unwrap(), 7);
    }

    #[tokio::test]
    async fn resolves_from_another_task() {
        let outcome: Result<&str, ApiError> = await_completion(|resolver| {
            tokio::spawn(async move {
                tokio::task::yield_now().await;
                resolver.resolve(Ok("done"));
            });
        })
        .await;

        assert_eq!(outcome.unwrap(), "done");
    }

    #[tokio::test]
    async fn propagates_reported_failure() {
        let outcome: Result<(), ApiError> =
            await_completion(|resolver| resolver.resolve(Err(ApiError::EmptyBody))).await;
        assert!(matches!(outcome, Err(ApiError::EmptyBody)));
    }

    #[tokio::test]
    async fn dropped_resolver_is_abandoned() {
        let outcome: Result<u8, ApiError> = await_completion(drop).await;
        assert!(matches!(outcome, Err(ApiError::Abandoned)));
    }
}
