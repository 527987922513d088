use thiserror::Error;

/// Result alias for MongoDB-backed storage operations.
pub type MongoResult<T> = Result<T, MongoDaoError>;

/// Errors raised by the MongoDB result store.
#[derive(Debug, Error)]
pub enum MongoDaoError {
    /// The connection string could not be parsed.
    #[error("invalid MongoDB connection string `{uri}`")]
    InvalidUri {
        /// The offending connection string.
        uri: String,
        /// Driver-level parse error.
        #[source]
        source: mongodb::error::Error,
    },
    /// The driver client could not be built from the parsed options.
    #[error("failed to construct MongoDB client")]
    ClientConstruction {
        /// Driver-level construction error.
        #[source]
        source: mongodb::error::Error,
    },
    /// The database never answered the initial connectivity ping.
    #[error("MongoDB did not answer the initial ping after {attempts} attempts")]
    InitialPing {
        /// Number of ping attempts made before giving up.
        attempts: u32,
        /// Last ping error.
        #[source]
        source: mongodb::error::Error,
    },
    /// A routine health ping failed.
    #[error("MongoDB health ping failed")]
    HealthPing {
        /// Driver-level ping error.
        #[source]
        source: mongodb::error::Error,
    },
    /// Index creation failed during startup.
    #[error("failed to ensure index `{index}` on collection `{collection}`")]
    EnsureIndex {
        /// Collection carrying the index.
        collection: &'static str,
        /// Name of the index.
        index: &'static str,
        /// Driver-level error.
        #[source]
        source: mongodb::error::Error,
    },
    /// Appending a result record failed.
    #[error("failed to insert result for session `{session_id}`")]
    InsertResult {
        /// Session whose outcome could not be appended.
        session_id: String,
        /// Driver-level error.
        #[source]
        source: mongodb::error::Error,
    },
    /// The full-scan query failed.
    #[error("failed to list result records")]
    ListResults {
        /// Driver-level error.
        #[source]
        source: mongodb::error::Error,
    },
    /// The leaderboard query failed.
    #[error("failed to query top completed results")]
    TopCompleted {
        /// Driver-level error.
        #[source]
        source: mongodb::error::Error,
    },
    /// The distinct-sessions query failed.
    #[error("failed to query distinct recent sessions")]
    SessionsSince {
        /// Driver-level error.
        #[source]
        source: mongodb::error::Error,
    },
    /// The recent-rows count failed.
    #[error("failed to count recent results")]
    CountSince {
        /// Driver-level error.
        #[source]
        source: mongodb::error::Error,
    },
}

impl MongoDaoError {
    /// Whether the failure is the server refusing a write, as opposed to the
    /// server being unreachable.
    pub fn is_write_rejection(&self) -> bool {
        match self {
            MongoDaoError::InsertResult { source, .. } => {
                matches!(*source.kind, mongodb::error::ErrorKind::Write(_))
            }
            _ => false,
        }
    }
}
