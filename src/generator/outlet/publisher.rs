//! 发布网关

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

use super::AssembledDocument;
use crate::error::PersistenceFailure;

/// 已保存文章的标识
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(pub String);

impl std::fmt::Display for PostId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PostStatus {
    #[default]
    Drafted,
}

/// 发布请求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishRequest {
    pub document: AssembledDocument,
    pub category_id: String,
    pub destination_id: String,
    pub tags: Vec<String>,
    pub keywords: Vec<String>,
    pub slug: String,
    pub seo_slug: String,
    pub status: PostStatus,
}

impl PublishRequest {
    pub fn new(document: AssembledDocument, category_id: &str, destination_id: &str) -> Self {
        let metadata = &document.metadata;
        Self {
            category_id: category_id.trim().to_string(),
            destination_id: destination_id.trim().to_string(),
            tags: metadata.tags.clone(),
            keywords: metadata.keywords.clone(),
            slug: metadata.slug.clone(),
            seo_slug: metadata.seo_slug.clone(),
            status: PostStatus::Drafted,
            document,
        }
    }

    /// 网关共用的必填项检查
    pub fn validate(&self) -> Result<(), PersistenceFailure> {
        if self.category_id.is_empty() {
            return Err(PersistenceFailure::MissingCategory);
        }
        if self.destination_id.is_empty() {
            return Err(PersistenceFailure::MissingDestination);
        }
        Ok(())
    }
}

/// 接收最终文档并保存的外部服务
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    async fn publish(&self, request: &PublishRequest) -> Result<PostId, PersistenceFailure>;
}

/// 保存到磁盘的文章记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRecord {
    pub id: PostId,
    pub created_at: DateTime<Utc>,
    pub status: PostStatus,
    pub category_id: String,
    pub destination_id: String,
    pub title: String,
    pub description: String,
    pub slug: String,
    pub seo_slug: String,
    pub tags: Vec<String>,
    pub keywords: Vec<String>,
    pub html: String,
    pub faq_schema: Value,
}

/// 每篇文章保存为 `{output_dir}/{slug}.json`，slug 已存在时拒绝
#[derive(Debug, Clone)]
pub struct DiskPublisher {
    output_dir: PathBuf,
}

impl DiskPublisher {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn record_path(&self, slug: &str) -> PathBuf {
        self.output_dir.join(format!("{}.json", slug))
    }

    /// 读取已保存的文章
    pub async fn load(&self, slug: &str) -> anyhow::Result<Option<PostRecord>> {
        let path = self.record_path(slug);
        if !path.exists() {
            return Ok(None);
        }
        let content = tokio::fs::read_to_string(&path).await?;
        Ok(Some(serde_json::from_str(&content)?))
    }
}

fn storage_error(e: impl std::fmt::Display) -> PersistenceFailure {
    PersistenceFailure::Storage(e.to_string())
}

/// 先写入临时文件，再硬链接到目标路径；目标已存在时链接失败，不会覆盖。
/// 任何失败都不会在目标路径留下文件。
async fn write_exclusive(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let staging = path.with_file_name(format!(".{}.{}.tmp", file_name, uuid::Uuid::new_v4()));

    let written = async {
        let mut file = tokio::fs::File::create(&staging).await?;
        file.write_all(content).await?;
        file.sync_all().await?;
        tokio::fs::hard_link(&staging, path).await
    }
    .await;

    if let Err(e) = tokio::fs::remove_file(&staging).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(path = ?staging, error = %e, "临时文件清理失败");
        }
    }

    written
}

#[async_trait]
impl PersistenceGateway for DiskPublisher {
    async fn publish(&self, request: &PublishRequest) -> Result<PostId, PersistenceFailure> {
        request.validate()?;
        if request.slug.trim().is_empty() || request.slug.contains(['/', '\\']) {
            return Err(PersistenceFailure::Storage(format!(
                "非法的 slug: {:?}",
                request.slug
            )));
        }

        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(storage_error)?;

        let metadata = &request.document.metadata;
        let record = PostRecord {
            id: PostId(uuid::Uuid::new_v4().to_string()),
            created_at: Utc::now(),
            status: request.status,
            category_id: request.category_id.clone(),
            destination_id: request.destination_id.clone(),
            title: metadata.title.clone(),
            description: metadata.description.clone(),
            slug: request.slug.clone(),
            seo_slug: request.seo_slug.clone(),
            tags: request.tags.clone(),
            keywords: request.keywords.clone(),
            html: request.document.html.clone(),
            faq_schema: metadata.faq_schema.clone(),
        };
        let content = serde_json::to_string_pretty(&record).map_err(storage_error)?;

        let path = self.record_path(&request.slug);
        match write_exclusive(&path, content.as_bytes()).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(PersistenceFailure::DuplicateSlug(request.slug.clone()));
            }
            Err(e) => return Err(storage_error(e)),
        }

        tracing::info!(id = %record.id, path = ?path, "文章已保存");
        Ok(record.id)
    }
}
