//! Post models mapped from CMS documents

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::richtext::RichText;
use crate::cms::{CmsError, Document};
use crate::helpers::parse_timestamp;

/// A post as shown on the listing page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// CMS uid, used as the routing key
    pub uid: String,

    /// First publication date, `None` when missing or unparseable
    pub first_publication_date: Option<DateTime<Utc>>,

    pub title: String,
    pub subtitle: String,
    pub author: String,
}

/// A fully resolved post for the detail page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostDetail {
    pub uid: String,
    pub first_publication_date: Option<DateTime<Utc>>,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub banner_url: String,
    pub content: Vec<ContentBlock>,
}

/// A section of a post: heading plus rich text body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock {
    #[serde(default, deserialize_with = "string_or_null")]
    pub heading: String,
    #[serde(default)]
    pub body: RichText,
}

/// The `data` object of a post document
#[derive(Debug, Default, Deserialize)]
struct PostFields {
    #[serde(default, deserialize_with = "string_or_null")]
    title: String,
    #[serde(default, deserialize_with = "string_or_null")]
    subtitle: String,
    #[serde(default, deserialize_with = "string_or_null")]
    author: String,
    #[serde(default)]
    banner: Option<Banner>,
    #[serde(default)]
    content: Option<Vec<ContentBlock>>,
}

#[derive(Debug, Default, Deserialize)]
struct Banner {
    #[serde(default)]
    url: Option<String>,
}

/// Empty CMS fields come back as `null`
fn string_or_null<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn uid_of(doc: &Document) -> Result<String, CmsError> {
    doc.uid
        .clone()
        .filter(|uid| !uid.is_empty())
        .ok_or_else(|| CmsError::malformed(format!("document {} has no uid", doc.id)))
}

fn fields_of(doc: &Document) -> Result<PostFields, CmsError> {
    if doc.data.is_null() {
        return Ok(PostFields::default());
    }
    PostFields::deserialize(&doc.data)
        .map_err(|e| CmsError::malformed(format!("document {}: {}", doc.id, e)))
}

fn publication_date(doc: &Document) -> Option<DateTime<Utc>> {
    let raw = doc.first_publication_date.as_deref()?;
    let parsed = parse_timestamp(raw);
    if parsed.is_none() {
        tracing::warn!("Unparseable publication date {:?} on {}", raw, doc.id);
    }
    parsed
}

impl TryFrom<&Document> for Post {
    type Error = CmsError;

    fn try_from(doc: &Document) -> Result<Self, Self::Error> {
        let fields = fields_of(doc)?;
        Ok(Self {
            uid: uid_of(doc)?,
            first_publication_date: publication_date(doc),
            title: fields.title,
            subtitle: fields.subtitle,
            author: fields.author,
        })
    }
}

impl TryFrom<&Document> for PostDetail {
    type Error = CmsError;

    fn try_from(doc: &Document) -> Result<Self, Self::Error> {
        let fields = fields_of(doc)?;
        Ok(Self {
            uid: uid_of(doc)?,
            first_publication_date: publication_date(doc),
            title: fields.title,
            subtitle: fields.subtitle,
            author: fields.author,
            banner_url: fields.banner.and_then(|b| b.url).unwrap_or_default(),
            content: fields.content.unwrap_or_default(),
        })
    }
}

impl PostDetail {
    pub fn read_time(&self) -> u32 {
        super::read_time::estimate(&self.content)
    }
}

/// Map a page of documents, failing on the first malformed one
pub fn posts_from_documents(docs: &[Document]) -> Result<Vec<Post>, CmsError> {
    docs.iter().map(Post::try_from).collect()
}
