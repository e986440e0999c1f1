//! Wire form assembly
//!
//! Every submission mode shares one assembly routine: the option fields are laid
//! out in a fixed order, then the image is attached the way its [`ImageSource`]
//! requires, then the background (if any). The resulting [`RequestForm`] is plain
//! data so it can be inspected before it is turned into a multipart body.

use crate::{
    config::{Background, NormalizedOptions},
    error::{RemoveBgError, Result},
    source::ImageSource,
};
use reqwest::multipart::{Form, Part};
use std::path::Path;

/// Text field carrying the remote image URL
pub const FIELD_IMAGE_URL: &str = "image_url";
/// Text field carrying the base64 image
pub const FIELD_IMAGE_FILE_B64: &str = "image_file_b64";
/// Binary part carrying the uploaded image
pub const FIELD_IMAGE_FILE: &str = "image_file";
/// Binary part carrying the background image
pub const FIELD_BG_IMAGE_FILE: &str = "bg_image_file";
/// Text field carrying the background color
pub const FIELD_BG_COLOR: &str = "bg_color";
/// Text field carrying the background image URL
///
/// URL backgrounds go out under `bg_image_url`, never under `bg_color`.
pub const FIELD_BG_IMAGE_URL: &str = "bg_image_url";

/// Value of one wire field
#[derive(Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    File { file_name: String, bytes: Vec<u8> },
}

impl std::fmt::Debug for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::File { file_name, bytes } => f
                .debug_struct("File")
                .field("file_name", file_name)
                .field("len", &bytes.len())
                .finish(),
        }
    }
}

/// Ordered multipart form, before encoding
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestForm {
    fields: Vec<(&'static str, FieldValue)>,
}

impl RequestForm {
    /// Assemble the form for one submission
    ///
    /// Local files (image and background) are read here, so a missing file fails
    /// before anything is sent.
    ///
    /// # Errors
    /// - `Io` if the image file or background file cannot be read
    pub async fn build(options: &NormalizedOptions, source: &ImageSource) -> Result<Self> {
        let mut form = Self::default();

        form.push_text("size", options.size.as_str());
        form.push_text("type", options.foreground_type.as_str());
        form.push_text("type_level", options.type_level.as_str());
        form.push_text("format", options.format.as_str());
        form.push_text("roi", &options.roi);
        if options.crop_enabled() {
            form.push_text("crop", "true");
            form.push_text("crop_margin", &options.crop_margin);
        } else {
            form.push_text("crop", "false");
        }
        form.push_text("scale", &options.scale);
        form.push_text("position", &options.position);
        form.push_text("channels", options.channels.as_str());
        form.push_text("add_shadow", bool_field(options.add_shadow));
        form.push_text("semitransparency", bool_field(options.semitransparency));

        match source {
            ImageSource::Url(url) => form.push_text(FIELD_IMAGE_URL, url),
            ImageSource::Base64(payload) => form.push_text(FIELD_IMAGE_FILE_B64, payload),
            ImageSource::File(path) => {
                let part = read_file_part(path, "read image file").await?;
                form.fields.push((FIELD_IMAGE_FILE, part));
            },
        }

        match &options.background {
            Background::None => {},
            Background::Path(path) => {
                let part = read_file_part(path, "read background image").await?;
                form.fields.push((FIELD_BG_IMAGE_FILE, part));
            },
            Background::Color(color) => form.push_text(FIELD_BG_COLOR, color),
            Background::Url(url) => form.push_text(FIELD_BG_IMAGE_URL, url),
        }

        tracing::debug!(
            source = source.kind(),
            fields = form.fields.len(),
            "Assembled request form"
        );
        Ok(form)
    }

    fn push_text(&mut self, name: &'static str, value: &str) {
        self.fields.push((name, FieldValue::Text(value.to_string())));
    }

    /// All fields in wire order
    #[must_use]
    pub fn fields(&self) -> &[(&'static str, FieldValue)] {
        &self.fields
    }

    /// Look up a field by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value)
    }

    /// Look up a text field by name
    #[must_use]
    pub fn text(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            FieldValue::Text(text) => Some(text),
            FieldValue::File { .. } => None,
        }
    }

    /// Whether a field with this name is present
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Encode into a `multipart/form-data` body
    #[must_use]
    pub fn into_multipart(self) -> Form {
        self.fields
            .into_iter()
            .fold(Form::new(), |form, (name, value)| match value {
                FieldValue::Text(text) => form.text(name, text),
                FieldValue::File { file_name, bytes } => {
                    form.part(name, Part::bytes(bytes).file_name(file_name))
                },
            })
    }
}

fn bool_field(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

async fn read_file_part(path: &Path, operation: &str) -> Result<FieldValue> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| RemoveBgError::file_io_error(operation, path, &e))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(FieldValue::File { file_name, bytes })
}
