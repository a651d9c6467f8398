//! Attachment bridge: binary attachments keyed by entity identifier.
//!
//! A thin pass-through over the store's attachment primitives, layered
//! on the lifecycle's identity contract: uploads validate their fields
//! first, reads consult the attachment metadata captured at hydration.

use crate::entity::Entity;
use crate::error::ModelError;
use revdoc_store::{AttachmentUpload, DocumentStore, SaveOutcome};

impl<S: DocumentStore> Entity<S> {
    /// Write a named attachment onto this entity's document.
    ///
    /// `name`, `contentType`, and `body` are validated independently,
    /// in that fixed order; the first empty field wins. The entity must
    /// be persisted. The store bumps the document revision, but the
    /// entity's own revision token is not refreshed here.
    pub async fn save_attachment(
        &self,
        upload: &AttachmentUpload,
    ) -> Result<SaveOutcome, ModelError> {
        if upload.name.is_empty() {
            return Err(ModelError::AttachmentField("name"));
        }
        if upload.content_type.is_empty() {
            return Err(ModelError::AttachmentField("contentType"));
        }
        if upload.body.is_empty() {
            return Err(ModelError::AttachmentField("body"));
        }
        let id = self
            .state
            .id
            .as_deref()
            .ok_or_else(|| ModelError::NotPersisted(self.type_name().to_string()))?;
        Ok(self.directory.store().save_attachment(id, upload).await?)
    }

    /// Read a named attachment's body.
    ///
    /// Fails when the entity carries no attachment metadata, or when
    /// the name is absent from it. Metadata is populated only when the
    /// entity was hydrated from a stored document.
    pub async fn get_attachment(&self, name: &str) -> Result<Vec<u8>, ModelError> {
        if self.state.attachments.is_empty() {
            return Err(ModelError::NoAttachments);
        }
        if !self.state.attachments.contains_key(name) {
            return Err(ModelError::AttachmentMissing {
                name: name.to_string(),
            });
        }
        let id = self
            .state
            .id
            .as_deref()
            .ok_or_else(|| ModelError::NotPersisted(self.type_name().to_string()))?;
        Ok(self.directory.store().get_attachment(id, name).await?)
    }
}
