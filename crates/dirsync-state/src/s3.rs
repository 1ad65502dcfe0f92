//! S3 state repository.

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::debug;

use dirsync_core::{StateError, StateRepository};
use dirsync_model::State;

/// Stores the state document as a single S3 object.
pub struct S3StateRepository {
    client: Client,
    bucket: String,
    key: String,
}

impl S3StateRepository {
    pub fn new(client: Client, bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

#[async_trait]
impl StateRepository for S3StateRepository {
    async fn get_state(&self) -> Result<State, StateError> {
        let response = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&self.key)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                let missing = err
                    .as_service_error()
                    .is_some_and(|service| service.is_no_such_key());
                if missing {
                    return Err(StateError::NotFound);
                }
                return Err(StateError::storage_with_source(
                    format!("getting s3://{}/{}", self.bucket, self.key),
                    err,
                ));
            }
        };

        let data = response.body.collect().await.map_err(|err| {
            StateError::storage_with_source(
                format!("reading s3://{}/{}", self.bucket, self.key),
                err,
            )
        })?;

        let state = serde_json::from_slice(&data.into_bytes())?;
        debug!(bucket = %self.bucket, key = %self.key, "loaded state from s3");
        Ok(state)
    }

    async fn set_state(&self, state: &State) -> Result<(), StateError> {
        let payload = serde_json::to_vec_pretty(state)?;
        let bytes = payload.len();

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&self.key)
            .body(ByteStream::from(payload))
            .send()
            .await
            .map_err(|err| {
                StateError::storage_with_source(
                    format!("putting s3://{}/{}", self.bucket, self.key),
                    err,
                )
            })?;

        debug!(bucket = %self.bucket, key = %self.key, bytes, "stored state to s3");
        Ok(())
    }
}
