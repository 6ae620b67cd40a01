use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// The multipart fields that accept an image file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageField {
    ArtistImage,
    CarouselImage,
    BlogImage,
    EventImage,
    AboutImage1,
    AboutImage2,
}

impl ImageField {
    pub const ALL: [ImageField; 6] = [
        ImageField::ArtistImage,
        ImageField::CarouselImage,
        ImageField::BlogImage,
        ImageField::EventImage,
        ImageField::AboutImage1,
        ImageField::AboutImage2,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageField::ArtistImage => "artist_image",
            ImageField::CarouselImage => "carousel_image",
            ImageField::BlogImage => "blog_image",
            ImageField::EventImage => "event_image",
            ImageField::AboutImage1 => "about_image_1",
            ImageField::AboutImage2 => "about_image_2",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.as_str() == name)
    }
}

/// An upload as submitted, before the store assigns it an id.
///
/// Text fields that were not submitted stay `None` and are omitted from JSON.
/// Image fields hold the hosted URL, or an empty string when no file was sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct NewUpload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist_lyrics: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blog_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blog_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub about_description_1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub about_description_2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub about_description_3: Option<String>,

    #[serde(default)]
    pub artist_image: String,
    #[serde(default)]
    pub carousel_image: String,
    #[serde(default)]
    pub blog_image: String,
    #[serde(default)]
    pub event_image: String,
    #[serde(default)]
    pub about_image_1: String,
    #[serde(default)]
    pub about_image_2: String,
}

impl NewUpload {
    /// Store a text value under its form name. Returns false for names that
    /// are not text fields of an upload.
    pub fn set_text(&mut self, name: &str, value: String) -> bool {
        let slot = match name {
            "artist_name" => &mut self.artist_name,
            "artist_lyrics" => &mut self.artist_lyrics,
            "blog_title" => &mut self.blog_title,
            "blog_description" => &mut self.blog_description,
            "event_date" => &mut self.event_date,
            "about_description_1" => &mut self.about_description_1,
            "about_description_2" => &mut self.about_description_2,
            "about_description_3" => &mut self.about_description_3,
            _ => return false,
        };
        *slot = Some(value);
        true
    }

    pub fn set_image(&mut self, field: ImageField, url: String) {
        *self.image_mut(field) = url;
    }

    #[cfg(test)]
    pub fn image(&self, field: ImageField) -> &str {
        match field {
            ImageField::ArtistImage => &self.artist_image,
            ImageField::CarouselImage => &self.carousel_image,
            ImageField::BlogImage => &self.blog_image,
            ImageField::EventImage => &self.event_image,
            ImageField::AboutImage1 => &self.about_image_1,
            ImageField::AboutImage2 => &self.about_image_2,
        }
    }

    fn image_mut(&mut self, field: ImageField) -> &mut String {
        match field {
            ImageField::ArtistImage => &mut self.artist_image,
            ImageField::CarouselImage => &mut self.carousel_image,
            ImageField::BlogImage => &mut self.blog_image,
            ImageField::EventImage => &mut self.event_image,
            ImageField::AboutImage1 => &mut self.about_image_1,
            ImageField::AboutImage2 => &mut self.about_image_2,
        }
    }
}

/// A persisted upload. Serialized with the identifier under `_id`, matching
/// what existing clients of the `/data` endpoint read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct UploadRecord {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub upload: NewUpload,
}
