//! 草稿状态存储
//!
//! 控制器每次修改草稿字段后都会调用 `save`，进程意外退出后 `load` 能恢复到退出前的草稿（包括当前阶段）。
//! 只考虑单用户单会话写入。

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::Draft;

pub trait DraftStore: Send + Sync {
    fn load(&self) -> Result<Option<Draft>>;

    fn save(&self, draft: &Draft) -> Result<()>;

    fn clear(&self) -> Result<()>;
}

/// 基于JSON文件的持久化存储
#[derive(Debug, Clone)]
pub struct FileDraftStore {
    path: PathBuf,
}

impl FileDraftStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "draft.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl DraftStore for FileDraftStore {
    fn load(&self) -> Result<Option<Draft>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read draft file: {:?}", self.path))?;
        if content.trim().is_empty() {
            return Ok(None);
        }

        let draft: Draft = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse draft file: {:?}", self.path))?;
        Ok(Some(draft))
    }

    fn save(&self, draft: &Draft) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        // 先写临时文件再rename，避免写到一半时被中断留下损坏的草稿
        let temp_path = self.temp_path();
        let content = serde_json::to_string_pretty(draft)?;
        std::fs::write(&temp_path, content)
            .with_context(|| format!("Failed to write draft file: {:?}", temp_path))?;
        std::fs::rename(&temp_path, &self.path)
            .with_context(|| format!("Failed to replace draft file: {:?}", self.path))?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)
                .with_context(|| format!("Failed to remove draft file: {:?}", self.path))?;
        }
        Ok(())
    }
}

/// 内存存储，测试替身
#[derive(Debug, Default)]
pub struct MemoryDraftStore {
    slot: Mutex<Option<Draft>>,
    saves: Mutex<usize>,
}

impl MemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_draft(draft: Draft) -> Self {
        Self {
            slot: Mutex::new(Some(draft)),
            saves: Mutex::new(0),
        }
    }

    /// 当前保存的草稿快照
    pub fn snapshot(&self) -> Option<Draft> {
        self.slot.lock().map(|slot| slot.clone()).unwrap_or(None)
    }

    pub fn save_count(&self) -> usize {
        self.saves.lock().map(|n| *n).unwrap_or(0)
    }
}

impl DraftStore for MemoryDraftStore {
    fn load(&self) -> Result<Option<Draft>> {
        let slot = self
            .slot
            .lock()
            .map_err(|_| anyhow::anyhow!("draft store lock poisoned"))?;
        Ok(slot.clone())
    }

    fn save(&self, draft: &Draft) -> Result<()> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| anyhow::anyhow!("draft store lock poisoned"))?;
        *slot = Some(draft.clone());
        if let Ok(mut saves) = self.saves.lock() {
            *saves += 1;
        }
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| anyhow::anyhow!("draft store lock poisoned"))?;
        *slot = None;
        Ok(())
    }
}
