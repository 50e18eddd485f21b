use super::DbPool;
use crate::errors::StorageError;
use diesel::SqliteConnection;
use pennybook_core::errors::{Error, Result};
use std::any::Any;
use tokio::sync::{mpsc, oneshot};

// A job executed on the writer's dedicated connection. Jobs return core
// Results so repository closures can surface domain errors directly.
type Job<T> = Box<dyn FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static>;

/// Handle for sending jobs to the writer actor.
///
/// Every balance-affecting mutation in the application funnels through this
/// handle, which serializes writes on a single connection and wraps each job
/// in an immediate transaction. A job that errors is rolled back whole.
#[derive(Clone)]
pub struct WriteHandle {
    #[allow(clippy::type_complexity)]
    tx: mpsc::Sender<(
        Job<Box<dyn Any + Send + 'static>>,
        oneshot::Sender<Result<Box<dyn Any + Send + 'static>>>,
    )>,
}

impl WriteHandle {
    /// Executes a database job on the writer actor's dedicated connection.
    pub async fn exec<F, T>(&self, job: F) -> Result<T>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
        T: Send + 'static + Any,
    {
        let (ret_tx, ret_rx) = oneshot::channel();

        // Type-erase the return value so one channel serves every job shape.
        self.tx
            .send((
                Box::new(move |c| job(c).map(|v| Box::new(v) as Box<dyn Any + Send>)),
                ret_tx,
            ))
            .await
            .expect("Writer actor's receiving channel was closed, indicating the actor stopped.");

        ret_rx
            .await
            .expect("Writer actor dropped the reply sender without sending a result.")
            .map(|boxed: Box<dyn Any + Send + 'static>| {
                *boxed
                    .downcast::<T>()
                    .unwrap_or_else(|_| panic!("Failed to downcast writer actor result."))
            })
    }
}

/// Spawns a background Tokio task that acts as the single writer to the
/// database. The actor owns one connection from the pool and processes write
/// jobs serially, which is what makes transfer legs and balance updates
/// atomic without per-wallet locks.
pub fn spawn_writer(pool: DbPool) -> WriteHandle {
    let (tx, mut rx) = mpsc::channel::<(
        Job<Box<dyn Any + Send + 'static>>,
        oneshot::Sender<Result<Box<dyn Any + Send + 'static>>>,
    )>(1024);

    tokio::spawn(async move {
        let mut conn = pool
            .get()
            .expect("Failed to get a connection from the DB pool for the writer actor.");

        while let Some((job, reply_tx)) = rx.recv().await {
            // BEGIN IMMEDIATE takes the write lock up front; the job either
            // commits in full or rolls back in full.
            let result: Result<Box<dyn Any + Send + 'static>> = conn
                .immediate_transaction::<_, JobError, _>(|c| job(c).map_err(JobError::Core))
                .map_err(JobError::into_core);

            // Ignore error if the receiver has dropped (request cancelled).
            let _ = reply_tx.send(result);
        }
    });

    WriteHandle { tx }
}

/// Error carrier for the actor's transaction wrapper. Keeps the job's core
/// error intact across the rollback instead of flattening it to a string, so
/// typed failures (replay conflicts, consistency violations) survive the
/// round trip.
enum JobError {
    Storage(StorageError),
    Core(Error),
}

impl From<diesel::result::Error> for JobError {
    fn from(err: diesel::result::Error) -> Self {
        JobError::Storage(StorageError::QueryFailed(err))
    }
}

impl JobError {
    fn into_core(self) -> Error {
        match self {
            JobError::Storage(e) => e.into(),
            JobError::Core(e) => e,
        }
    }
}
