use super::models::{fields_into_json, Document, Value, ValueType};
use super::reference::DocumentReference;
use super::FirestoreError;
use serde::de::DeserializeOwned;

/// Data read from a document at one point in time.
#[derive(Debug, Clone)]
pub struct DocumentSnapshot<'a> {
    reference: DocumentReference<'a>,
    document: Option<Document>,
}

impl<'a> DocumentSnapshot<'a> {
    pub(crate) fn new(reference: DocumentReference<'a>, document: Option<Document>) -> Self {
        Self { reference, document }
    }

    pub fn id(&self) -> &str {
        self.reference.id()
    }

    pub fn reference(&self) -> &DocumentReference<'a> {
        &self.reference
    }

    pub fn exists(&self) -> bool {
        self.document.is_some()
    }

    pub fn create_time(&self) -> Option<&str> {
        self.document.as_ref().and_then(|d| d.create_time.as_deref())
    }

    pub fn update_time(&self) -> Option<&str> {
        self.document.as_ref().and_then(|d| d.update_time.as_deref())
    }

    /// Deserializes the whole document. `Ok(None)` if it does not exist.
    pub fn data<T: DeserializeOwned>(&self) -> Result<Option<T>, FirestoreError> {
        match &self.document {
            Some(doc) => {
                let json = fields_into_json(doc.fields.clone())?;
                Ok(Some(serde_json::from_value(json)?))
            }
            None => Ok(None),
        }
    }

    /// Reads one field by dotted path (e.g. `"address.city"`).
    ///
    /// `Ok(None)` if the document or any segment of the path is missing.
    pub fn get_field<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, FirestoreError> {
        let Some(doc) = &self.document else {
            return Ok(None);
        };

        let mut segments = path.split('.');
        let mut current: Option<&Value> = segments.next().and_then(|first| doc.fields.get(first));
        for segment in segments {
            current = match current.map(|v| &v.value_type) {
                Some(ValueType::MapValue(map)) => map.fields.get(segment),
                _ => None,
            };
        }

        match current {
            Some(value) => Ok(Some(serde_json::from_value(value.clone().into_json()?)?)),
            None => Ok(None),
        }
    }
}
