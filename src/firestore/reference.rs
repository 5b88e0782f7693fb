use super::models::{fields_from_serializable, Document, ListDocumentsResponse};
use super::snapshot::DocumentSnapshot;
use super::FirestoreError;
use crate::core::parse_error_response;
use reqwest::{header, StatusCode};
use reqwest_middleware::ClientWithMiddleware;
use serde::Serialize;
use url::Url;

const LIST_PAGE_SIZE: &str = "100";

fn last_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// A reference to a document location. The document may or may not exist.
#[derive(Clone, Debug)]
pub struct DocumentReference<'a> {
    pub(crate) client: &'a ClientWithMiddleware,
    pub(crate) path: String,
}

impl<'a> DocumentReference<'a> {
    /// The document's ID within its collection.
    pub fn id(&self) -> &str {
        last_segment(&self.path)
    }

    pub async fn get(&self) -> Result<DocumentSnapshot<'a>, FirestoreError> {
        let response = self.client.get(&self.path).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(DocumentSnapshot::new(self.clone(), None));
        }

        if !response.status().is_success() {
            return Err(FirestoreError::ApiError(parse_error_response(response, "Get document failed").await));
        }

        let document: Document = response.json().await?;
        Ok(DocumentSnapshot::new(self.clone(), Some(document)))
    }

    /// Writes the document, replacing any existing content.
    pub async fn set<T: Serialize>(&self, value: &T) -> Result<(), FirestoreError> {
        let url = Url::parse(&self.path)?;
        self.write(url, value, "Set document failed").await
    }

    /// Updates the fields named in `update_mask`, leaving the rest of the document intact.
    ///
    /// Without a mask this behaves like [`set`](Self::set).
    pub async fn update<T: Serialize>(
        &self,
        value: &T,
        update_mask: Option<&[&str]>,
    ) -> Result<(), FirestoreError> {
        let mut url = Url::parse(&self.path)?;
        if let Some(mask) = update_mask {
            let mut query = url.query_pairs_mut();
            for field in mask {
                query.append_pair("updateMask.fieldPaths", field);
            }
        }
        self.write(url, value, "Update document failed").await
    }

    async fn write<T: Serialize>(&self, url: Url, value: &T, failure: &str) -> Result<(), FirestoreError> {
        let fields = fields_from_serializable(value)?;
        let body = serde_json::to_vec(&serde_json::json!({ "fields": fields }))?;

        let response = self
            .client
            .patch(url)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FirestoreError::ApiError(parse_error_response(response, failure).await));
        }

        Ok(())
    }

    pub async fn delete(&self) -> Result<(), FirestoreError> {
        let response = self.client.delete(&self.path).send().await?;

        if !response.status().is_success() {
            return Err(FirestoreError::ApiError(parse_error_response(response, "Delete document failed").await));
        }

        Ok(())
    }
}

/// A reference to a collection of documents.
#[derive(Clone, Debug)]
pub struct CollectionReference<'a> {
    pub(crate) client: &'a ClientWithMiddleware,
    pub(crate) path: String,
}

impl<'a> CollectionReference<'a> {
    pub fn id(&self) -> &str {
        last_segment(&self.path)
    }

    pub fn doc(&self, document_id: &str) -> DocumentReference<'a> {
        DocumentReference {
            client: self.client,
            path: format!("{}/{}", self.path, document_id),
        }
    }

    /// Reads every document of the collection, following pagination.
    pub async fn list_documents(&self) -> Result<Vec<DocumentSnapshot<'a>>, FirestoreError> {
        let mut snapshots = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = Url::parse(&self.path)?;
            {
                let mut query = url.query_pairs_mut();
                query.append_pair("pageSize", LIST_PAGE_SIZE);
                if let Some(token) = &page_token {
                    query.append_pair("pageToken", token);
                }
            }

            let response = self.client.get(url).send().await?;

            if !response.status().is_success() {
                return Err(FirestoreError::ApiError(parse_error_response(response, "List documents failed").await));
            }

            let page: ListDocumentsResponse = response.json().await?;
            for document in page.documents {
                let reference = self.doc(last_segment(&document.name));
                snapshots.push(DocumentSnapshot::new(reference, Some(document)));
            }

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(snapshots)
    }

    /// Adds a document with a server-assigned ID and returns a reference to it.
    pub async fn add<T: Serialize>(&self, value: &T) -> Result<DocumentReference<'a>, FirestoreError> {
        let fields = fields_from_serializable(value)?;
        let body = serde_json::to_vec(&serde_json::json!({ "fields": fields }))?;

        let response = self
            .client
            .post(&self.path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FirestoreError::ApiError(parse_error_response(response, "Add document failed").await));
        }

        let document: Document = response.json().await?;
        Ok(self.doc(last_segment(&document.name)))
    }
}
