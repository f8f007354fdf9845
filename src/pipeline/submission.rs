// Submission: the named text fields and images of one entity write.
//
// The CRUD layer hands the gate plain strings: text as-is, images as
// base64. Builders cover the entity kinds the marketplace moderates.

use std::fmt;

/// Which entity a submission belongs to. Used for logging only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionKind {
    UserProfile,
    PetListing,
    ServiceListing,
    Other,
}

impl fmt::Display for SubmissionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SubmissionKind::UserProfile => "user_profile",
            SubmissionKind::PetListing => "pet_listing",
            SubmissionKind::ServiceListing => "service_listing",
            SubmissionKind::Other => "other",
        };
        f.write_str(s)
    }
}

/// A named value: a text field, or a base64 image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedField {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct Submission {
    kind: SubmissionKind,
    texts: Vec<NamedField>,
    images: Vec<NamedField>,
}

impl Default for Submission {
    fn default() -> Self {
        Self::new(SubmissionKind::Other)
    }
}

impl Submission {
    pub fn new(kind: SubmissionKind) -> Self {
        Self {
            kind,
            texts: Vec::new(),
            images: Vec::new(),
        }
    }

    pub fn with_text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.texts.push(NamedField {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Add a base64-encoded image. An empty payload means no image was
    /// supplied and is not sent for classification.
    pub fn with_image(mut self, name: impl Into<String>, image_base64: impl Into<String>) -> Self {
        let value = image_base64.into();
        if !value.is_empty() {
            self.images.push(NamedField {
                name: name.into(),
                value,
            });
        }
        self
    }

    /// User registration or profile update.
    pub fn user_profile(
        username: impl Into<String>,
        contacts: impl Into<String>,
        avatar: impl Into<String>,
        background_image: impl Into<String>,
    ) -> Self {
        Self::new(SubmissionKind::UserProfile)
            .with_text("username", username)
            .with_text("contacts", contacts)
            .with_image("avatar", avatar)
            .with_image("background image", background_image)
    }

    pub fn pet_listing(
        name: impl Into<String>,
        info: impl Into<String>,
        avatar: impl Into<String>,
    ) -> Self {
        Self::new(SubmissionKind::PetListing)
            .with_text("name", name)
            .with_text("info", info)
            .with_image("avatar", avatar)
    }

    pub fn service_listing(
        title: impl Into<String>,
        description: impl Into<String>,
        image: impl Into<String>,
    ) -> Self {
        Self::new(SubmissionKind::ServiceListing)
            .with_text("title", title)
            .with_text("description", description)
            .with_image("image", image)
    }

    pub fn kind(&self) -> SubmissionKind {
        self.kind
    }

    pub fn texts(&self) -> &[NamedField] {
        &self.texts
    }

    pub fn images(&self) -> &[NamedField] {
        &self.images
    }
}
